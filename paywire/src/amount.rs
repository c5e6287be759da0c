//! Scaled amounts.
//!
//! Some figures travel as a raw integer magnitude plus a divisor, e.g. a
//! ledger entry with `"amount": 150000000, "scale": 100000000` means `1.5`.
//! [`ScaledAmount`] keeps both halves in decimal form so the round trip
//! `value * scale == raw` holds exactly within decimal precision.

use std::fmt::{Display, Formatter};

pub use rust_decimal::Decimal;

use crate::error::CodecError;

/// A `(raw, scale)` pair whose meaningful value is `raw / scale`.
///
/// The scale is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaledAmount {
    raw: Decimal,
    scale: Decimal,
}

impl ScaledAmount {
    /// Creates a scaled amount from its raw magnitude and scale factor.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ZeroScale`] if `scale` is zero.
    pub fn new(raw: Decimal, scale: Decimal) -> Result<Self, CodecError> {
        if scale.is_zero() {
            return Err(CodecError::ZeroScale);
        }
        Ok(Self { raw, scale })
    }

    /// Creates a scaled amount from the floating-point figures found on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::OutOfRange`] if either figure is not representable
    /// as a decimal, and [`CodecError::ZeroScale`] if `scale` is zero.
    pub fn from_wire(raw: f64, scale: f64) -> Result<Self, CodecError> {
        let raw = to_decimal(raw)?;
        let scale = to_decimal(scale)?;
        Self::new(raw, scale)
    }

    /// Creates a scaled amount from its meaningful value, computing
    /// `raw = value * scale`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ZeroScale`] for a zero scale and
    /// [`CodecError::OutOfRange`] if the product overflows.
    pub fn from_value(value: Decimal, scale: Decimal) -> Result<Self, CodecError> {
        let raw = value
            .checked_mul(scale)
            .ok_or_else(|| CodecError::OutOfRange(format!("{value} * {scale}")))?;
        Self::new(raw, scale)
    }

    /// Raw magnitude as sent on the wire.
    #[must_use]
    pub const fn raw(&self) -> Decimal {
        self.raw
    }

    /// Scale factor.
    #[must_use]
    pub const fn scale(&self) -> Decimal {
        self.scale
    }

    /// The meaningful value, `raw / scale`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::OutOfRange`] if the quotient overflows.
    pub fn value(&self) -> Result<Decimal, CodecError> {
        self.raw
            .checked_div(self.scale)
            .map(|value| value.normalize())
            .ok_or_else(|| CodecError::OutOfRange(format!("{} / {}", self.raw, self.scale)))
    }
}

impl Display for ScaledAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.value() {
            Ok(value) => write!(f, "{value}"),
            Err(_) => write!(f, "{}/{}", self.raw, self.scale),
        }
    }
}

fn to_decimal(value: f64) -> Result<Decimal, CodecError> {
    Decimal::try_from(value).map_err(|_| CodecError::OutOfRange(value.to_string()))
}
