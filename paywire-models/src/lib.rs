//! Typed models for the payment API.
//!
//! Each record is used in both directions. Request models implement
//! [`WireModel`](paywire::WireModel) so their outbound payload is gated by
//! the directional field policy, and implement [`serde::Serialize`] as that
//! outbound view. Every model deserializes every field it knows about.
//!
//! # Modules
//!
//! - [`token`] - Access tokens and their policies
//! - [`bill`] - Bills and bill items
//! - [`payout`] - Payout batches and instructions
//! - [`invoice`] - Invoices and invoice buyers
//! - [`ledger`] - Ledger balances and entries
//! - [`settlement`] - Settlement reports

/// Implements `serde::Serialize` for a [`WireModel`](paywire::WireModel) as
/// its outbound view.
macro_rules! outbound_serialize {
    ($($model:ty),+ $(,)?) => {
        $(
            impl ::serde::Serialize for $model {
                fn serialize<S: ::serde::Serializer>(
                    &self,
                    serializer: S,
                ) -> Result<S::Ok, S::Error> {
                    ::paywire::policy::serialize_outbound(self, serializer)
                }
            }
        )+
    };
}

pub mod bill;
pub mod invoice;
pub mod ledger;
pub mod payout;
pub mod settlement;
pub mod token;

pub use bill::{Bill, BillItem};
pub use invoice::{Invoice, InvoiceBuyer};
pub use ledger::{Buyer, Ledger, LedgerEntry};
pub use payout::{PayoutBatch, PayoutInstruction};
pub use settlement::{InvoiceData, PayoutInfo, Settlement, SettlementLedgerEntry, WithHoldings};
pub use token::{Policy, Token};
