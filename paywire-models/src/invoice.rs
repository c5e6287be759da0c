//! Invoices.

use paywire::convert::{CurrencyMap, Timestamp};
use paywire::policy::{FieldDescriptor, WireDefault, WireModel, encode};
use serde::Deserialize;
use serde_json::Value;
use serde_with::{DefaultOnNull, serde_as};

/// Buyer details attached to an invoice. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvoiceBuyer {
    /// Buyer name.
    pub name: Option<String>,
    /// First address line.
    pub address1: Option<String>,
    /// Second address line.
    pub address2: Option<String>,
    /// City or locality.
    pub locality: Option<String>,
    /// State or region.
    pub region: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// E-mail address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Send the buyer payment notifications.
    pub notify: bool,
}

impl WireModel for InvoiceBuyer {
    const MODEL: &'static str = "InvoiceBuyer";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::if_non_default(
            "name",
            |b: &Self| b.name.is_wire_default(),
            |b: &Self| encode(&b.name),
        ),
        FieldDescriptor::if_non_default(
            "address1",
            |b: &Self| b.address1.is_wire_default(),
            |b: &Self| encode(&b.address1),
        ),
        FieldDescriptor::if_non_default(
            "address2",
            |b: &Self| b.address2.is_wire_default(),
            |b: &Self| encode(&b.address2),
        ),
        FieldDescriptor::if_non_default(
            "locality",
            |b: &Self| b.locality.is_wire_default(),
            |b: &Self| encode(&b.locality),
        ),
        FieldDescriptor::if_non_default(
            "region",
            |b: &Self| b.region.is_wire_default(),
            |b: &Self| encode(&b.region),
        ),
        FieldDescriptor::if_non_default(
            "postalCode",
            |b: &Self| b.postal_code.is_wire_default(),
            |b: &Self| encode(&b.postal_code),
        ),
        FieldDescriptor::if_non_default(
            "country",
            |b: &Self| b.country.is_wire_default(),
            |b: &Self| encode(&b.country),
        ),
        FieldDescriptor::if_non_default(
            "email",
            |b: &Self| b.email.is_wire_default(),
            |b: &Self| encode(&b.email),
        ),
        FieldDescriptor::if_non_default(
            "phone",
            |b: &Self| b.phone.is_wire_default(),
            |b: &Self| encode(&b.phone),
        ),
        FieldDescriptor::if_non_default(
            "notify",
            |b: &Self| !b.notify,
            |b: &Self| encode(&b.notify),
        ),
    ];
}

/// An invoice.
///
/// `supportedTransactionCurrencies` reads as a full [`CurrencyMap`] and is
/// written back as `code → enabled` booleans.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Invoice {
    /// Invoice price.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub price: f64,
    /// Price currency code.
    pub currency: String,
    /// Merchant order identifier.
    pub order_id: Option<String>,
    /// Item description.
    pub item_desc: Option<String>,
    /// Item code.
    pub item_code: Option<String>,
    /// Address notified on status changes.
    pub notification_email: Option<String>,
    /// Webhook URL.
    #[serde(rename = "notificationURL")]
    pub notification_url: Option<String>,
    /// Redirect after payment.
    #[serde(rename = "redirectURL")]
    pub redirect_url: Option<String>,
    /// Redirect when the buyer closes the invoice.
    #[serde(rename = "closeURL")]
    pub close_url: Option<String>,
    /// Opaque merchant data echoed in webhooks.
    pub pos_data: Option<String>,
    /// Confirmation speed, e.g. `"medium"`.
    pub transaction_speed: Option<String>,
    /// Currencies the buyer may pay with.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub payment_currencies: Vec<String>,
    /// Buyer details.
    pub buyer: Option<InvoiceBuyer>,
    /// Per-currency payment settings.
    pub supported_transaction_currencies: Option<CurrencyMap>,
    /// Milliseconds the buyer has to pay once a currency is chosen.
    pub acceptance_window: u64,
    /// Facade token the invoice is created with.
    pub token: Option<String>,
    /// Idempotency key.
    pub guid: Option<String>,
    /// Send a webhook for every status change.
    pub full_notifications: bool,
    /// Send extended webhooks.
    pub extended_notifications: bool,
    /// The order ships physical goods.
    pub physical: bool,
    /// Redirect automatically after payment.
    pub auto_redirect: bool,

    /// Server-assigned identifier.
    pub id: Option<String>,
    /// Hosted invoice URL.
    pub url: Option<String>,
    /// Invoice status.
    pub status: Option<String>,
    /// Exception status; the server sends `false` or a reason string.
    pub exception_status: Value,
    /// When the invoice was created.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub invoice_time: Option<Timestamp>,
    /// When the invoice expires.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub expiration_time: Option<Timestamp>,
    /// Server clock at response time.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub current_time: Option<Timestamp>,
    /// Amount paid so far.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub amount_paid: f64,
    /// Amount paid so far, formatted for display.
    pub display_amount_paid: Option<String>,
    /// The payment was sent with too low a fee.
    pub low_fee_detected: bool,
}

impl Invoice {
    /// Creates an invoice with the required fields.
    #[must_use]
    pub fn new(price: f64, currency: impl Into<String>) -> Self {
        Self {
            price,
            currency: currency.into(),
            ..Default::default()
        }
    }

    /// Returns `true` if the server reported an exception on this invoice.
    #[must_use]
    pub fn has_exception(&self) -> bool {
        match &self.exception_status {
            Value::Null | Value::Bool(false) => false,
            Value::String(reason) => !reason.is_empty(),
            _ => true,
        }
    }
}

impl WireModel for Invoice {
    const MODEL: &'static str = "Invoice";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::always("price", |i: &Self| encode(&i.price)),
        FieldDescriptor::always("currency", |i: &Self| encode(&i.currency)),
        FieldDescriptor::if_non_default(
            "orderId",
            |i: &Self| i.order_id.is_wire_default(),
            |i: &Self| encode(&i.order_id),
        ),
        FieldDescriptor::if_non_default(
            "itemDesc",
            |i: &Self| i.item_desc.is_wire_default(),
            |i: &Self| encode(&i.item_desc),
        ),
        FieldDescriptor::if_non_default(
            "itemCode",
            |i: &Self| i.item_code.is_wire_default(),
            |i: &Self| encode(&i.item_code),
        ),
        FieldDescriptor::if_non_default(
            "notificationEmail",
            |i: &Self| i.notification_email.is_wire_default(),
            |i: &Self| encode(&i.notification_email),
        ),
        FieldDescriptor::if_non_default(
            "notificationURL",
            |i: &Self| i.notification_url.is_wire_default(),
            |i: &Self| encode(&i.notification_url),
        ),
        FieldDescriptor::if_non_default(
            "redirectURL",
            |i: &Self| i.redirect_url.is_wire_default(),
            |i: &Self| encode(&i.redirect_url),
        ),
        FieldDescriptor::if_non_default(
            "closeURL",
            |i: &Self| i.close_url.is_wire_default(),
            |i: &Self| encode(&i.close_url),
        ),
        FieldDescriptor::if_non_default(
            "posData",
            |i: &Self| i.pos_data.is_wire_default(),
            |i: &Self| encode(&i.pos_data),
        ),
        FieldDescriptor::if_non_default(
            "transactionSpeed",
            |i: &Self| i.transaction_speed.is_wire_default(),
            |i: &Self| encode(&i.transaction_speed),
        ),
        FieldDescriptor::if_non_default(
            "paymentCurrencies",
            |i: &Self| i.payment_currencies.is_wire_default(),
            |i: &Self| encode(&i.payment_currencies),
        ),
        FieldDescriptor::if_non_default(
            "buyer",
            |i: &Self| i.buyer.is_none(),
            |i: &Self| encode(&i.buyer),
        ),
        FieldDescriptor::if_non_default(
            "supportedTransactionCurrencies",
            |i: &Self| i.supported_transaction_currencies.is_wire_default(),
            |i: &Self| encode(&i.supported_transaction_currencies),
        ),
        FieldDescriptor::if_non_default(
            "acceptanceWindow",
            |i: &Self| i.acceptance_window.is_wire_default(),
            |i: &Self| encode(&i.acceptance_window),
        ),
        FieldDescriptor::if_non_default(
            "token",
            |i: &Self| i.token.is_wire_default(),
            |i: &Self| encode(&i.token),
        ),
        FieldDescriptor::if_non_default(
            "guid",
            |i: &Self| i.guid.is_wire_default(),
            |i: &Self| encode(&i.guid),
        ),
        FieldDescriptor::if_non_default(
            "fullNotifications",
            |i: &Self| !i.full_notifications,
            |i: &Self| encode(&i.full_notifications),
        ),
        FieldDescriptor::if_non_default(
            "extendedNotifications",
            |i: &Self| !i.extended_notifications,
            |i: &Self| encode(&i.extended_notifications),
        ),
        FieldDescriptor::if_non_default(
            "physical",
            |i: &Self| !i.physical,
            |i: &Self| encode(&i.physical),
        ),
        FieldDescriptor::if_non_default(
            "autoRedirect",
            |i: &Self| !i.auto_redirect,
            |i: &Self| encode(&i.auto_redirect),
        ),
        FieldDescriptor::response_only("id"),
        FieldDescriptor::response_only("url"),
        FieldDescriptor::response_only("status"),
        FieldDescriptor::response_only("exceptionStatus"),
        FieldDescriptor::response_only("invoiceTime"),
        FieldDescriptor::response_only("expirationTime"),
        FieldDescriptor::response_only("currentTime"),
        FieldDescriptor::response_only("amountPaid"),
        FieldDescriptor::response_only("displayAmountPaid"),
        FieldDescriptor::response_only("lowFeeDetected"),
    ];
}

outbound_serialize!(Invoice, InvoiceBuyer);

#[cfg(test)]
mod tests {
    use super::*;
    use paywire::envelope::RawResponse;
    use paywire::policy::outbound_fields;
    use paywire::{ApiError, Codec, CodecError};
    use serde_json::json;

    const INVOICE: &str = r#"{"data": {
        "id": "G3viJEJgE8Jk2oekSdgT2A",
        "url": "https://bitpay.com/invoice?id=G3viJEJgE8Jk2oekSdgT2A",
        "status": "new",
        "price": 10.0,
        "currency": "USD",
        "orderId": "20210511_fghij",
        "exceptionStatus": false,
        "invoiceTime": 1620734545366,
        "expirationTime": 1620735445366,
        "currentTime": 1620734545415,
        "amountPaid": null,
        "lowFeeDetected": false,
        "buyer": {"name": "Satoshi", "email": "satoshi@buyeremaildomain.com", "notify": true},
        "supportedTransactionCurrencies": {
            "USD": {"payPro": true, "p2p": false},
            "BTC": {"payPro": false}
        }
    }}"#;

    #[test]
    fn test_currency_map_projects_enabled_flag() {
        let invoice: Invoice = Codec::default()
            .decode_response(&RawResponse::ok(INVOICE))
            .unwrap();
        let currencies = invoice.supported_transaction_currencies.as_ref().unwrap();
        assert_eq!(currencies.len(), 2);
        assert!(currencies.is_enabled("USD"));
        assert!(!currencies.is_enabled("BTC"));

        let payload = serde_json::to_value(&invoice).unwrap();
        assert_eq!(
            payload["supportedTransactionCurrencies"],
            json!({"USD": true, "BTC": false})
        );
    }

    #[test]
    fn test_hydrated_invoice_reencodes_request_fields_only() {
        let invoice: Invoice = Codec::default()
            .decode_response(&RawResponse::ok(INVOICE))
            .unwrap();
        assert_eq!(invoice.amount_paid, 0.0);
        assert!(!invoice.has_exception());
        assert_eq!(
            outbound_fields(&invoice),
            vec!["price", "currency", "orderId", "buyer", "supportedTransactionCurrencies"]
        );

        let payload = serde_json::to_value(&invoice).unwrap();
        assert_eq!(
            payload["buyer"],
            json!({"name": "Satoshi", "email": "satoshi@buyeremaildomain.com", "notify": true})
        );
        for field in ["id", "url", "status", "invoiceTime", "amountPaid", "lowFeeDetected"] {
            assert!(payload.get(field).is_none(), "{field} was sent");
        }
    }

    #[test]
    fn test_null_currency_map_is_absent_and_empty_is_present() {
        let absent: Invoice = serde_json::from_value(json!({
            "price": 1,
            "currency": "USD",
            "supportedTransactionCurrencies": null
        }))
        .unwrap();
        assert_eq!(absent.supported_transaction_currencies, None);

        let empty: Invoice = serde_json::from_value(json!({
            "price": 1,
            "currency": "USD",
            "supportedTransactionCurrencies": {}
        }))
        .unwrap();
        assert_eq!(empty.supported_transaction_currencies, Some(CurrencyMap::new()));
        assert!(!outbound_fields(&empty).contains(&"supportedTransactionCurrencies"));
    }

    #[test]
    fn test_duplicate_currency_rejected() {
        let body = r#"{
            "price": 1,
            "currency": "USD",
            "supportedTransactionCurrencies": {
                "BTC": {"payPro": true},
                "BTC": {"payPro": false}
            }
        }"#;
        let err = Codec::default()
            .decode_response::<Invoice>(&RawResponse::ok(body))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(CodecError::Decode { .. })));
        assert!(err.to_string().contains("duplicate currency key `BTC`"));
    }

    #[test]
    fn test_currency_map_wrong_token_kind() {
        let err = serde_json::from_value::<Invoice>(json!({
            "price": 1,
            "currency": "USD",
            "supportedTransactionCurrencies": ["BTC"]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("sequence"), "{err}");
    }

    #[test]
    fn test_flags_and_empty_lists() {
        let mut invoice = Invoice::new(12.5, "EUR");
        invoice.payment_currencies = Vec::new();
        invoice.full_notifications = true;
        invoice.buyer = Some(InvoiceBuyer::default());
        assert_eq!(
            serde_json::to_value(&invoice).unwrap(),
            json!({"price": 12.5, "currency": "EUR", "fullNotifications": true, "buyer": {}})
        );
    }
}
