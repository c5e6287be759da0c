//! The codec facade.
//!
//! [`Codec`] bundles a [`CodecConfig`] and an injected [`Logger`] and exposes the
//! outbound and inbound paths in one place. It holds no per-call state: a
//! single instance can be shared across any number of concurrent request flows.
//!
//! ```rust
//! use paywire::codec::Codec;
//! use paywire::envelope::RawResponse;
//!
//! let codec = Codec::default();
//! let balances: Vec<serde_json::Value> = codec
//!     .decode_response(&RawResponse::ok(r#"{"data": [{"currency": "USD", "balance": null}]}"#))
//!     .unwrap();
//! assert_eq!(balances.len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{CodecConfig, Facade};
use crate::envelope::{self, ApiResponse};
use crate::error::{ApiError, CodecError};
use crate::logging::{Logger, NoopLogger};
use crate::policy::{self, WireModel};

/// Wire name of the facade token field in outbound payloads.
pub const TOKEN_FIELD: &str = "token";

/// Outbound and inbound conversion with an injected logger.
#[derive(Clone)]
pub struct Codec {
    config: CodecConfig,
    logger: Arc<dyn Logger>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("config", &self.config)
            .field("logger", &self.logger)
            .finish()
    }
}

impl Codec {
    /// Creates a codec with the given configuration and a no-op logger.
    #[must_use]
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            logger: Arc::new(NoopLogger),
        }
    }

    /// Replaces the logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Returns the injected logger.
    #[must_use]
    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    /// Renders the outbound payload of a model.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] naming the field that failed to render.
    pub fn encode<M: WireModel>(&self, model: &M) -> Result<String, CodecError> {
        policy::to_wire_string(model).inspect_err(|err| self.logger.log_error(&err.to_string()))
    }

    /// Renders the outbound payload and reports it to the request sink.
    ///
    /// # Errors
    ///
    /// See [`Codec::encode`].
    pub fn encode_request<M: WireModel>(
        &self,
        method: &str,
        endpoint: &str,
        model: &M,
    ) -> Result<String, CodecError> {
        let body = self.encode(model)?;
        self.logger.log_request(method, endpoint, &body);
        Ok(body)
    }

    /// Renders the outbound payload with the configured facade token.
    ///
    /// The token is added only when the model did not send one of its own.
    ///
    /// # Errors
    ///
    /// See [`Codec::encode`].
    pub fn encode_for<M: WireModel>(
        &self,
        facade: Facade,
        model: &M,
    ) -> Result<String, CodecError> {
        let mut wire =
            policy::to_wire(model).inspect_err(|err| self.logger.log_error(&err.to_string()))?;
        if let Some(token) = self.config.token(facade) {
            wire.entry(TOKEN_FIELD)
                .or_insert_with(|| Value::String(token.to_owned()));
        }
        serde_json::to_string(&wire).map_err(|source| CodecError::Encode {
            field: M::MODEL,
            source,
        })
    }

    /// Hydrates a value from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] naming the target type.
    pub fn decode<T: DeserializeOwned>(&self, json: &str) -> Result<T, CodecError> {
        serde_json::from_str(json)
            .map_err(|source| CodecError::Decode {
                model: std::any::type_name::<T>(),
                source,
            })
            .inspect_err(|err| self.logger.log_error(&err.to_string()))
    }

    /// Translates a completed exchange into a typed payload or one error.
    ///
    /// # Errors
    ///
    /// See [`envelope::decode`].
    pub fn decode_response<T: DeserializeOwned>(
        &self,
        response: &impl ApiResponse,
    ) -> Result<T, ApiError> {
        envelope::decode(response, self.logger.as_ref())
    }
}
