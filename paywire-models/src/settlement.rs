//! Settlement reports. Response-only.

use std::collections::BTreeMap;

use paywire::convert::Timestamp;
use serde::Deserialize;
use serde_with::{DefaultOnNull, serde_as};

/// Bank details a settlement is paid out to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PayoutInfo {
    /// Account holder name.
    pub name: Option<String>,
    /// Account number.
    pub account: Option<String>,
    /// Routing number.
    pub routing: Option<String>,
    /// Merchant EIN.
    pub merchant_ein: Option<String>,
    /// Free-form label.
    pub label: Option<String>,
    /// Bank country.
    pub bank_country: Option<String>,
    /// Bank name.
    pub bank_name: Option<String>,
    /// Bank address.
    pub bank_address: Option<String>,
    /// SWIFT code.
    pub swift: Option<String>,
    /// IBAN.
    pub iban: Option<String>,
    /// Paid by wire transfer.
    pub wire: bool,
    /// Account holder name as registered with the bank.
    pub account_holder_name: Option<String>,
    /// Account holder country.
    pub account_holder_country: Option<String>,
}

/// An amount withheld from a settlement.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WithHoldings {
    /// Amount withheld.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub amount: f64,
    /// Withholding code.
    pub code: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Label.
    pub label: Option<String>,
    /// Bank country.
    pub bank_country: Option<String>,
}

/// Invoice details attached to a settlement ledger entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvoiceData {
    /// Merchant order identifier.
    pub order_id: Option<String>,
    /// Invoice date.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub date: Option<Timestamp>,
    /// Invoice price.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub price: f64,
    /// Invoice currency.
    pub currency: Option<String>,
    /// Currency the buyer paid in.
    pub transaction_currency: Option<String>,
    /// Amount paid above the price.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub over_paid_amount: f64,
    /// Share of the payout per currency, in percent.
    pub payout_percentage: BTreeMap<String, f64>,
}

/// One entry of a settlement report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettlementLedgerEntry {
    /// Numeric entry code.
    pub code: i64,
    /// Related invoice.
    pub invoice_id: Option<String>,
    /// Entry amount.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub amount: f64,
    /// When the entry was booked.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub timestamp: Option<Timestamp>,
    /// Entry description.
    pub description: Option<String>,
    /// Merchant reference.
    pub reference: Option<String>,
    /// Invoice details.
    pub invoice_data: Option<InvoiceData>,
}

/// A settlement and, when requested as a reconciliation report, its entries.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settlement {
    /// Settlement identifier.
    pub id: Option<String>,
    /// Merchant account.
    pub account_id: Option<String>,
    /// Settlement currency.
    pub currency: Option<String>,
    /// Bank details.
    pub payout_info: Option<PayoutInfo>,
    /// Settlement status.
    pub status: Option<String>,
    /// When the settlement was created.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub date_created: Option<Timestamp>,
    /// When the settlement was executed.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub date_executed: Option<Timestamp>,
    /// When the funds arrived.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub date_completed: Option<Timestamp>,
    /// Start of the settlement period.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub opening_date: Option<Timestamp>,
    /// End of the settlement period.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub closing_date: Option<Timestamp>,
    /// Balance at the start of the period.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub opening_balance: f64,
    /// Sum of the period's ledger entries.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub ledger_entries_sum: f64,
    /// Amounts withheld.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub with_holdings: Vec<WithHoldings>,
    /// Sum of the amounts withheld.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub with_holdings_sum: f64,
    /// Amount paid out.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub total_amount: f64,
    /// Ledger entries, present on reconciliation reports.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub ledger_entries: Vec<SettlementLedgerEntry>,
    /// Resource token for fetching the reconciliation report.
    pub token: Option<String>,
}

impl Settlement {
    /// `opening_balance + ledger_entries_sum - with_holdings_sum`.
    #[must_use]
    pub fn expected_total(&self) -> f64 {
        self.opening_balance + self.ledger_entries_sum - self.with_holdings_sum
    }
}
