//! Ledger balances and entries. Response-only.

use paywire::CodecError;
use paywire::amount::ScaledAmount;
use paywire::convert::Timestamp;
use serde::Deserialize;

/// Balance of one ledger.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Ledger {
    /// Ledger currency code.
    pub currency: String,
    /// Current balance.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub balance: f64,
}

/// Buyer details recorded on a ledger entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Buyer {
    /// Buyer name.
    pub buyer_name: Option<String>,
    /// First address line.
    pub buyer_address1: Option<String>,
    /// Second address line.
    pub buyer_address2: Option<String>,
    /// City.
    pub buyer_city: Option<String>,
    /// State or province.
    pub buyer_state: Option<String>,
    /// Postal code.
    pub buyer_zip: Option<String>,
    /// Country.
    pub buyer_country: Option<String>,
    /// E-mail address.
    pub buyer_email: Option<String>,
    /// Phone number.
    pub buyer_phone: Option<String>,
    /// Whether the buyer asked to be notified.
    pub buyer_notify: bool,
}

/// One movement on a ledger.
///
/// `amount` is the raw magnitude and `scale` its divisor; see
/// [`LedgerEntry::scaled_amount`].
///
/// ```rust
/// use paywire_models::LedgerEntry;
///
/// let entry: LedgerEntry = serde_json::from_str(
///     r#"{"type": "Invoice", "amount": 1023, "scale": 100, "code": 1000}"#,
/// ).unwrap();
/// assert_eq!(entry.scaled_amount().unwrap().to_string(), "10.23");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Entry type, e.g. `"Invoice"` or `"Invoice Fee"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw magnitude.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub amount: f64,
    /// Divisor of `amount`.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub scale: f64,
    /// Numeric entry code.
    pub code: i64,
    /// Entry description.
    pub description: Option<String>,
    /// When the entry was booked.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub timestamp: Option<Timestamp>,
    /// Transaction type.
    pub tx_type: Option<String>,
    /// Related invoice.
    pub invoice_id: Option<String>,
    /// Price of the related invoice.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub invoice_amount: f64,
    /// Currency of the related invoice.
    pub invoice_currency: Option<String>,
    /// Currency the buyer paid in.
    pub transaction_currency: Option<String>,
    /// Entry identifier.
    pub id: Option<String>,
    /// Buyer details.
    pub buyer_fields: Buyer,
}

impl LedgerEntry {
    /// The entry amount as a `(raw, scale)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ZeroScale`] when the server sent no scale, and
    /// [`CodecError::OutOfRange`] for figures a decimal cannot hold.
    pub fn scaled_amount(&self) -> Result<ScaledAmount, CodecError> {
        ScaledAmount::from_wire(self.amount, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paywire::Codec;
    use paywire::amount::Decimal;
    use paywire::envelope::RawResponse;

    #[test]
    fn test_null_balance_reads_as_zero() {
        let body = r#"{"data": [
            {"currency": "EUR", "balance": 0},
            {"currency": "USD", "balance": 2389.82},
            {"currency": "BTC", "balance": null}
        ]}"#;
        let ledgers: Vec<Ledger> = Codec::default()
            .decode_response(&RawResponse::ok(body))
            .unwrap();
        let balances: Vec<f64> = ledgers.iter().map(|l| l.balance).collect();
        assert_eq!(balances, vec![0.0, 2389.82, 0.0]);
    }

    #[test]
    fn test_entry_with_scaled_amount() {
        let entry: LedgerEntry = serde_json::from_str(
            r#"{
                "type": "Invoice",
                "amount": 823000000,
                "code": 1000,
                "description": "20210510_fghij",
                "timestamp": "2021-05-10T20:08:52.919Z",
                "txType": "sale",
                "scale": 100000000,
                "invoiceId": "Hpqc63wvE1ZjzeeH4kEycF",
                "buyerFields": {"buyerName": "John Doe", "buyerNotify": false},
                "invoiceAmount": 10,
                "invoiceCurrency": "USD",
                "transactionCurrency": "BCH",
                "id": "FR4rgfADCRNU5abGtAZYZG"
            }"#,
        )
        .unwrap();
        assert_eq!(entry.kind, "Invoice");
        assert_eq!(entry.buyer_fields.buyer_name.as_deref(), Some("John Doe"));
        assert_eq!(entry.scaled_amount().unwrap().value().unwrap(), Decimal::new(823, 2));
        assert_eq!(entry.invoice_amount, 10.0);
    }

    #[test]
    fn test_missing_scale_is_reported() {
        let entry: LedgerEntry = serde_json::from_str(r#"{"amount": 5, "scale": null}"#).unwrap();
        assert!(matches!(entry.scaled_amount(), Err(CodecError::ZeroScale)));
    }

    #[test]
    fn test_non_numeric_amount_fails() {
        let err = serde_json::from_str::<LedgerEntry>(r#"{"amount": true}"#).unwrap_err();
        assert!(err.to_string().contains("boolean"), "{err}");
    }
}
