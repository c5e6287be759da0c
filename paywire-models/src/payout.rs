//! Payout batches.
//!
//! A batch carries one or more instructions, each paying one recipient. The
//! server answers with the same shape plus fees, rates, and the crypto amounts
//! it computed; those figures are reported as `null` until known and read back
//! as zero.

use paywire::convert::{Timestamp, timestamp};
use paywire::policy::{FieldDescriptor, WireDefault, WireModel, encode};
use serde::Deserialize;
use serde_with::{DefaultOnNull, serde_as};

/// One payment inside a batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PayoutInstruction {
    /// Amount in the batch currency.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub amount: f64,
    /// Recipient e-mail.
    pub email: Option<String>,
    /// Recipient identifier.
    pub recipient_id: Option<String>,
    /// Shopper identifier.
    pub shopper_id: Option<String>,
    /// Free-form label.
    pub label: Option<String>,

    /// Server-assigned identifier.
    pub id: Option<String>,
    /// Instruction status.
    pub status: Option<String>,
    /// Crypto amount paid, zero until computed.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub btc: f64,
}

impl PayoutInstruction {
    /// Pays `amount` to the recipient with this e-mail address.
    #[must_use]
    pub fn to_email(amount: f64, email: impl Into<String>) -> Self {
        Self {
            amount,
            email: Some(email.into()),
            ..Default::default()
        }
    }

    /// Pays `amount` to a registered recipient.
    #[must_use]
    pub fn to_recipient(amount: f64, recipient_id: impl Into<String>) -> Self {
        Self {
            amount,
            recipient_id: Some(recipient_id.into()),
            ..Default::default()
        }
    }
}

impl WireModel for PayoutInstruction {
    const MODEL: &'static str = "PayoutInstruction";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::always("amount", |p: &Self| encode(&p.amount)),
        FieldDescriptor::if_non_default(
            "email",
            |p: &Self| p.email.is_wire_default(),
            |p: &Self| encode(&p.email),
        ),
        FieldDescriptor::if_non_default(
            "recipientId",
            |p: &Self| p.recipient_id.is_wire_default(),
            |p: &Self| encode(&p.recipient_id),
        ),
        FieldDescriptor::if_non_default(
            "shopperId",
            |p: &Self| p.shopper_id.is_wire_default(),
            |p: &Self| encode(&p.shopper_id),
        ),
        FieldDescriptor::if_non_default(
            "label",
            |p: &Self| p.label.is_wire_default(),
            |p: &Self| encode(&p.label),
        ),
        FieldDescriptor::response_only("id"),
        FieldDescriptor::response_only("status"),
        FieldDescriptor::response_only("btc"),
    ];
}

/// A batch of payouts.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PayoutBatch {
    /// Total amount of the batch.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub amount: f64,
    /// Batch currency code.
    pub currency: String,
    /// When the batch should execute.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub effective_date: Option<Timestamp>,
    /// Currency the batch is debited from.
    pub ledger_currency: Option<String>,
    /// Merchant reference.
    pub reference: Option<String>,
    /// Webhook URL.
    #[serde(rename = "notificationURL")]
    pub notification_url: Option<String>,
    /// Address notified on completion.
    pub notification_email: Option<String>,
    /// Redirect after approval.
    pub redirect_url: Option<String>,
    /// Rate selection method, e.g. `"vwap_24hr"`.
    pub pricing_method: Option<String>,
    /// Payments in the batch.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub instructions: Vec<PayoutInstruction>,
    /// Facade token the batch is created with.
    pub token: Option<String>,
    /// Idempotency key.
    pub guid: Option<String>,

    /// Server-assigned identifier.
    pub id: Option<String>,
    /// Merchant account.
    pub account: Option<String>,
    /// Support phone number.
    pub support_phone: Option<String>,
    /// Batch status.
    pub status: Option<String>,
    /// Percentage fee.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub percent_fee: f64,
    /// Flat fee.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub fee: f64,
    /// Amount deposited to fund the batch.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub deposit_total: f64,
    /// Exchange rate applied.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub rate: f64,
    /// Crypto total, zero until computed.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub btc: f64,
    /// When the batch was requested.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub request_date: Option<Timestamp>,
    /// When the batch was executed.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub date_executed: Option<Timestamp>,
}

impl PayoutBatch {
    /// Creates a batch whose amount is the sum of its instructions.
    #[must_use]
    pub fn new(currency: impl Into<String>, instructions: Vec<PayoutInstruction>) -> Self {
        Self {
            amount: instructions.iter().map(|i| i.amount).sum(),
            currency: currency.into(),
            instructions,
            ..Default::default()
        }
    }
}

impl WireModel for PayoutBatch {
    const MODEL: &'static str = "PayoutBatch";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::always("amount", |p: &Self| encode(&p.amount)),
        FieldDescriptor::always("currency", |p: &Self| encode(&p.currency)),
        FieldDescriptor::if_non_default(
            "effectiveDate",
            |p: &Self| p.effective_date.is_none(),
            |p: &Self| encode(&p.effective_date.as_ref().map(timestamp::format)),
        ),
        FieldDescriptor::if_non_default(
            "ledgerCurrency",
            |p: &Self| p.ledger_currency.is_wire_default(),
            |p: &Self| encode(&p.ledger_currency),
        ),
        FieldDescriptor::if_non_default(
            "reference",
            |p: &Self| p.reference.is_wire_default(),
            |p: &Self| encode(&p.reference),
        ),
        FieldDescriptor::if_non_default(
            "notificationURL",
            |p: &Self| p.notification_url.is_wire_default(),
            |p: &Self| encode(&p.notification_url),
        ),
        FieldDescriptor::if_non_default(
            "notificationEmail",
            |p: &Self| p.notification_email.is_wire_default(),
            |p: &Self| encode(&p.notification_email),
        ),
        FieldDescriptor::if_non_default(
            "redirectUrl",
            |p: &Self| p.redirect_url.is_wire_default(),
            |p: &Self| encode(&p.redirect_url),
        ),
        FieldDescriptor::if_non_default(
            "pricingMethod",
            |p: &Self| p.pricing_method.is_wire_default(),
            |p: &Self| encode(&p.pricing_method),
        ),
        FieldDescriptor::if_non_default(
            "instructions",
            |p: &Self| p.instructions.is_wire_default(),
            |p: &Self| encode(&p.instructions),
        ),
        FieldDescriptor::if_non_default(
            "token",
            |p: &Self| p.token.is_wire_default(),
            |p: &Self| encode(&p.token),
        ),
        FieldDescriptor::if_non_default(
            "guid",
            |p: &Self| p.guid.is_wire_default(),
            |p: &Self| encode(&p.guid),
        ),
        FieldDescriptor::response_only("id"),
        FieldDescriptor::response_only("account"),
        FieldDescriptor::response_only("supportPhone"),
        FieldDescriptor::response_only("status"),
        FieldDescriptor::response_only("percentFee"),
        FieldDescriptor::response_only("fee"),
        FieldDescriptor::response_only("depositTotal"),
        FieldDescriptor::response_only("rate"),
        FieldDescriptor::response_only("btc"),
        FieldDescriptor::response_only("requestDate"),
        FieldDescriptor::response_only("dateExecuted"),
    ];
}

outbound_serialize!(PayoutBatch, PayoutInstruction);

#[cfg(test)]
mod tests {
    use super::*;
    use paywire::config::{CodecConfig, Facade};
    use paywire::envelope::RawResponse;
    use paywire::policy::to_wire_string;
    use paywire::{ApiError, Codec};
    use serde_json::{Value, json};

    const CREATED: &str = r#"{
        "facade": "payout/payoutBatch",
        "data": {
            "id": "Dpe6rlYqtDgbdJfHxY9Lh7",
            "account": "SJcWZCFq344DL8QnXpdBNM",
            "reference": "payout_20210527",
            "supportPhone": "1-855-4-BITPAY",
            "status": "new",
            "amount": 10.0,
            "percentFee": 0,
            "fee": 2.5,
            "depositTotal": null,
            "rate": null,
            "btc": null,
            "currency": "USD",
            "requestDate": "2021-05-27T10:47:37.834Z",
            "effectiveDate": "2021-05-27T10:47:37.834Z",
            "dateExecuted": null,
            "instructions": [
                {
                    "id": "ZNJ6pn2bYfRvfMqVYhEjiw",
                    "amount": 10.0,
                    "email": "john@doe.com",
                    "status": "queued",
                    "btc": null
                }
            ],
            "token": "9pVLfvdjt59q1JiY2JEsf2hr5FsjimfY4qRLFi85tMiXSCkJ9mQ2oSQqYKVangKaro"
        }
    }"#;

    fn effective() -> Timestamp {
        timestamp::parse("2021-05-27T09:00:00.1234567+02:00").unwrap()
    }

    #[test]
    fn test_outbound_payload_with_seven_digit_date() {
        let mut batch = PayoutBatch::new(
            "USD",
            vec![PayoutInstruction::to_email(10.0, "john@doe.com")],
        );
        batch.effective_date = Some(effective());
        batch.ledger_currency = Some("GBP".into());

        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({
                "amount": 10.0,
                "currency": "USD",
                "effectiveDate": "2021-05-27T09:00:00.1234567+02:00",
                "instructions": [{"amount": 10.0, "email": "john@doe.com"}],
                "ledgerCurrency": "GBP"
            })
        );
    }

    #[test]
    fn test_hydrated_batch_reencodes_without_server_fields() {
        let batch: PayoutBatch = Codec::default()
            .decode_response(&RawResponse::ok(CREATED))
            .unwrap();
        assert_eq!(batch.status.as_deref(), Some("new"));
        assert_eq!(batch.fee, 2.5);
        assert_eq!(batch.btc, 0.0);
        assert_eq!(batch.deposit_total, 0.0);
        assert_eq!(batch.date_executed, None);
        assert_eq!(batch.instructions[0].status.as_deref(), Some("queued"));

        let payload: Value = serde_json::from_str(&to_wire_string(&batch).unwrap()).unwrap();
        for field in ["id", "account", "supportPhone", "status", "fee", "btc", "requestDate"] {
            assert!(payload.get(field).is_none(), "{field} was sent");
        }
        assert!(payload["instructions"][0].get("status").is_none());
        assert!(payload["instructions"][0].get("btc").is_none());
        assert_eq!(
            payload["effectiveDate"],
            json!("2021-05-27T10:47:37.8340000+00:00")
        );
    }

    #[test]
    fn test_encode_twice_is_identical() {
        let batch = PayoutBatch::new(
            "USD",
            vec![
                PayoutInstruction::to_recipient(5.0, "LDxRZCGq174SF8AnQpdBPB"),
                PayoutInstruction::to_email(7.5, "jane@doe.com"),
            ],
        );
        let codec = Codec::default();
        assert_eq!(codec.encode(&batch).unwrap(), codec.encode(&batch).unwrap());
    }

    #[test]
    fn test_encode_for_payout_facade() {
        let codec = Codec::new(CodecConfig::default().with_token(Facade::Payout, "payout-token"));
        let batch = PayoutBatch::new("USD", vec![PayoutInstruction::to_email(1.0, "a@b.c")]);
        let body: Value =
            serde_json::from_str(&codec.encode_for(Facade::Payout, &batch).unwrap()).unwrap();
        assert_eq!(body["token"], json!("payout-token"));
    }

    #[test]
    fn test_validation_failure_on_create() {
        let body = r#"{"errors":[
            {"error":"Missing required parameter.","param":"amount"},
            {"error":"Invalid value.","param":"currency"}
        ]}"#;
        let err = Codec::default()
            .decode_response::<PayoutBatch>(&RawResponse::new(400, body))
            .unwrap_err();
        match err {
            ApiError::Validation(validation) => assert_eq!(
                validation.message,
                "Missing required parameter amount. Invalid value currency."
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
