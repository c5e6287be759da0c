#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Wire codec and error translation for a payment API.
//!
//! The API speaks loosely-typed JSON: monetary figures reported as `null`,
//! timestamps with a fixed seven-digit fraction, objects keyed by currency
//! code, amounts split into a raw magnitude and a divisor, and validation
//! failures reported as an array of independent items. This crate converts
//! between that wire format and strongly-typed values.
//!
//! # Modules
//!
//! - [`policy`] - Directional field policy: which fields a model sends outbound
//! - [`convert`] - Numeric-null, timestamp, and currency map converters
//! - [`amount`] - Scaled amounts (`raw / scale`)
//! - [`envelope`] - Error envelope translation for completed exchanges
//! - [`error`] - Codec and API error types
//! - [`logging`] - Injected request, response, and error sinks
//! - [`config`] - Environment and per-facade API tokens
//! - [`codec`] - The [`Codec`] facade tying it all together
//!
//! # Feature Flags
//!
//! - `http` (default) - [`ApiResponse`] implementation for `http::Response`
//! - `telemetry` - `tracing` events through [`logging::TracingLogger`]

pub mod amount;
pub mod codec;
pub mod config;
pub mod convert;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod policy;

pub use amount::ScaledAmount;
pub use codec::Codec;
pub use config::{CodecConfig, Environment, Facade};
pub use envelope::{ApiResponse, RawResponse};
pub use error::{ApiError, CodecError, ErrorItem, ValidationError};
pub use logging::{Logger, NoopLogger};
pub use policy::{FieldDescriptor, FieldRule, WireDefault, WireModel};
