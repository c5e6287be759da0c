//! Calendar-timestamp converter.
//!
//! Outbound timestamps use a fixed-width wire format the API is sensitive to:
//!
//! ```text
//! yyyy-MM-ddTHH:mm:ss.fffffff±hh:mm
//! ```
//!
//! Always seven fractional digits and always an explicit numeric offset, never
//! a bare `Z`. Inbound is permissive: any RFC 3339 string, offsets written
//! `+hhmm` or `+hh`, times without seconds, an offset-less date-time (read as
//! UTC), a bare date, or a number of epoch milliseconds.
//!
//! A `null` timestamp reads back as `None`. It is never coerced to the epoch.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde::Serializer;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde_json::Value;

use crate::error::CodecError;

/// A calendar timestamp with an explicit UTC offset.
pub type Timestamp = DateTime<FixedOffset>;

/// Number of fractional-second digits on the wire.
pub const FRACTION_DIGITS: usize = 7;

// `%#z` takes `+hh:mm`, `+hhmm` and `+hh`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const EXPECTED: &str = "a timestamp string, epoch milliseconds, or null";

/// Renders a timestamp in the outbound wire format.
///
/// Sub-tick precision (below 100 ns) is truncated.
///
/// ```rust
/// use paywire::convert::timestamp;
///
/// let ts = timestamp::parse("2024-01-02T03:04:05.123Z").unwrap();
/// assert_eq!(timestamp::format(&ts), "2024-01-02T03:04:05.1230000+00:00");
/// ```
#[must_use]
pub fn format(timestamp: &Timestamp) -> String {
    let ticks = (timestamp.nanosecond() % 1_000_000_000) / 100;
    format!(
        "{}.{ticks:0width$}{}",
        timestamp.format("%Y-%m-%dT%H:%M:%S"),
        timestamp.format("%:z"),
        width = FRACTION_DIGITS,
    )
}

/// Parses any timestamp string the server is known to send.
///
/// # Errors
///
/// Returns [`CodecError::Coercion`] if no supported format matches.
pub fn parse(input: &str) -> Result<Timestamp, CodecError> {
    let trimmed = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts);
    }
    let zoned = match trimmed.strip_suffix(['Z', 'z']) {
        Some(stem) => format!("{stem}+00:00"),
        None => trimmed.to_owned(),
    };
    for pattern in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(&zoned, pattern) {
            return Ok(ts);
        }
    }
    for pattern in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| CodecError::coercion("timestamp", &Value::String(input.to_owned())))
}

/// Reads a timestamp from epoch milliseconds.
///
/// # Errors
///
/// Returns [`CodecError::Coercion`] when the value is outside chrono's range.
pub fn from_millis(millis: i64) -> Result<Timestamp, CodecError> {
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.fixed_offset())
        .ok_or_else(|| CodecError::coercion("timestamp", &Value::from(millis)))
}

/// Renders a timestamp as a JSON string value for field tables.
#[must_use]
pub fn encode(timestamp: &Timestamp) -> Value {
    Value::String(format(timestamp))
}

/// Writes a timestamp in the outbound wire format.
///
/// # Errors
///
/// Returns the serializer's error.
pub fn serialize<S: Serializer>(timestamp: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(timestamp))
}

struct OptionalTimestampVisitor;

impl OptionalTimestampVisitor {
    fn millis<E: de::Error>(self, millis: i64) -> Result<Option<Timestamp>, E> {
        from_millis(millis)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Signed(millis), &self))
    }
}

impl<'de> Visitor<'de> for OptionalTimestampVisitor {
    type Value = Option<Timestamp>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(EXPECTED)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        parse(value)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        self.millis(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        let millis = i64::try_from(value)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))?;
        self.millis(millis)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value.is_finite() && value.fract() == 0.0 {
            self.millis(value as i64)
        } else {
            Err(E::invalid_value(Unexpected::Float(value), &self))
        }
    }
}

/// Reads an optional timestamp: `null` or a missing field becomes `None`.
///
/// Use together with `#[serde(default)]` so that absent fields are accepted.
///
/// # Errors
///
/// Fails for unparseable strings and non-timestamp tokens, naming the token.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(OptionalTimestampVisitor)
}

/// Coerces an already-parsed JSON value.
///
/// # Errors
///
/// Returns [`CodecError::Coercion`] naming the token.
pub fn from_value(value: &Value) -> Result<Option<Timestamp>, CodecError> {
    deserialize_option(value).map_err(|_| CodecError::coercion("timestamp", value))
}
