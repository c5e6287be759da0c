//! Request, response, and error sinks.
//!
//! The codec never reaches for a global logger. Callers hand a [`Logger`] to
//! the [`Codec`](crate::codec::Codec) (or straight to
//! [`envelope::decode`](crate::envelope::decode)); the default is
//! [`NoopLogger`]. With the `telemetry` feature, [`TracingLogger`] forwards
//! everything to `tracing`.

use std::fmt::Debug;

/// Observability sinks used by the codec. All methods default to no-ops.
///
/// Implementations must be cheap and must not block: they are called inline on
/// every encode and decode.
pub trait Logger: Debug + Send + Sync {
    /// Called with each outbound payload before it is handed to the transport.
    fn log_request(&self, _method: &str, _endpoint: &str, _body: &str) {}

    /// Called with each inbound response before it is translated.
    fn log_response(&self, _status: u16, _body: &str) {}

    /// Called once per failed translation or conversion.
    fn log_error(&self, _message: &str) {}
}

/// A logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {}

/// A logger that emits `tracing` events under the `paywire` target.
#[cfg(feature = "telemetry")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

#[cfg(feature = "telemetry")]
impl Logger for TracingLogger {
    fn log_request(&self, method: &str, endpoint: &str, body: &str) {
        tracing::debug!(target: "paywire", method, endpoint, body, "Outbound request");
    }

    fn log_response(&self, status: u16, body: &str) {
        tracing::debug!(target: "paywire", status, body, "Inbound response");
    }

    fn log_error(&self, message: &str) {
        tracing::event!(target: "paywire", tracing::Level::ERROR, error = message, "Codec failure");
    }
}
