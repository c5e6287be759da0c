//! Numeric-null coercion.
//!
//! The API reports missing monetary figures as `null`. Those must read back as
//! `0.0`, never as a missing-value marker. Numbers arrive integer-shaped,
//! decimal-shaped, or occasionally as numeric strings.
//!
//! This converter is read-only and the write path fails loudly instead of
//! guessing a wire shape. Request fields that carry money are rendered
//! outbound as plain numbers by their field table.
//!
//! ```rust
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Ledger {
//!     #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
//!     balance: f64,
//! }
//!
//! let ledger: Ledger = serde_json::from_str(r#"{"balance": null}"#).unwrap();
//! assert_eq!(ledger.balance, 0.0);
//! ```

use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Serializer, ser};
use serde_json::Value;

use crate::error::CodecError;

/// Converter name reported by write-path failures.
pub const CONVERTER: &str = "numeric-null";

const EXPECTED: &str = "a number, a numeric string, or null";

struct NumericNullVisitor;

impl<'de> Visitor<'de> for NumericNullVisitor {
    type Value = f64;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(EXPECTED)
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Ok(0.0)
    }

    fn visit_none<E: de::Error>(self) -> Result<f64, E> {
        Ok(0.0)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
        Ok(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
        Ok(value as f64)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
        Ok(value as f64)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| E::invalid_value(Unexpected::Str(value), &self))
    }
}

/// Reads a numeric-null field: `null` becomes `0.0`.
///
/// # Errors
///
/// Fails for booleans, objects, arrays, and non-numeric strings, naming the
/// offending token.
pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(NumericNullVisitor)
}

/// Coerces an already-parsed JSON value.
///
/// # Errors
///
/// Returns [`CodecError::Coercion`] naming the token when it is not numeric.
pub fn from_value(value: &Value) -> Result<f64, CodecError> {
    deserialize(value).map_err(|_| CodecError::coercion("number", value))
}

/// Write path. Always fails.
///
/// # Errors
///
/// Always returns a serializer error.
pub fn serialize<S: Serializer>(_value: &f64, _serializer: S) -> Result<S::Ok, S::Error> {
    Err(ser::Error::custom(CodecError::ReadOnly {
        converter: CONVERTER,
    }))
}

/// Field-table encoder counterpart of [`serialize`]. Always fails.
///
/// # Errors
///
/// Always returns [`CodecError::ReadOnly`].
pub fn encode(_value: f64) -> Result<Value, CodecError> {
    Err(CodecError::ReadOnly {
        converter: CONVERTER,
    })
}
