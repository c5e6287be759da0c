//! Type-coercing converters between wire tokens and typed values.
//!
//! Each converter is independent and stateless:
//!
//! - [`numeric`] - `null`-as-zero numeric coercion (read-only)
//! - [`timestamp`] - fixed-width outbound timestamps, permissive inbound parsing
//! - [`currency_map`] - JSON objects keyed by currency code

pub mod currency_map;
pub mod numeric;
pub mod timestamp;

pub use currency_map::{CurrencyMap, CurrencySettings, QrSettings};
pub use timestamp::Timestamp;
