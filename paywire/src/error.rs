//! Error types for the paywire codec.
//!
//! Two families live here:
//!
//! - [`CodecError`]: a single field or payload could not be converted between
//!   its wire representation and its typed form.
//! - [`ApiError`]: what a caller sees after a completed HTTP exchange has been
//!   run through the [`envelope`](crate::envelope) translator.

use serde_json::Value;

/// Errors raised while converting between wire JSON and typed values.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A wire token could not be interpreted as the declared semantic type.
    #[error("cannot coerce {token} into {expected}")]
    Coercion {
        /// What the converter was looking for.
        expected: &'static str,
        /// The offending wire token, rendered as JSON.
        token: String,
    },

    /// A dynamic currency map carried the same currency code twice.
    #[error("duplicate currency key `{0}`")]
    DuplicateKey(String),

    /// A read-only converter was asked to write a value.
    #[error("{converter} converter is read-only and cannot serialize")]
    ReadOnly {
        /// Name of the converter.
        converter: &'static str,
    },

    /// A server-assigned field reached the outbound encoder.
    #[error("field `{field}` is server-assigned and must never be sent")]
    ServerAssigned {
        /// Wire name of the field.
        field: &'static str,
    },

    /// A field's value could not be rendered to JSON.
    #[error("failed to encode field `{field}`: {source}")]
    Encode {
        /// Wire name of the field.
        field: &'static str,
        /// The underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// A payload could not be hydrated into the named model.
    #[error("failed to decode {model}: {source}")]
    Decode {
        /// Type name of the model being hydrated.
        model: &'static str,
        /// The underlying deserializer error.
        #[source]
        source: serde_json::Error,
    },

    /// A scaled amount was built with a zero scale factor.
    #[error("scale factor must be non-zero")]
    ZeroScale,

    /// A numeric value does not fit the decimal representation.
    #[error("amount {0} is out of range")]
    OutOfRange(String),
}

impl CodecError {
    /// Builds a [`CodecError::Coercion`] from the offending JSON value.
    #[must_use]
    pub fn coercion(expected: &'static str, token: &Value) -> Self {
        Self::Coercion {
            expected,
            token: token.to_string(),
        }
    }
}

/// One entry of the API's `errors` array.
///
/// ```json
/// { "error": "Missing required parameter.", "param": "price" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorItem {
    /// Human-readable message reported by the server.
    pub error: String,
    /// Name of the offending request parameter (may be empty).
    pub param: String,
}

impl ErrorItem {
    /// Creates a new error item.
    #[must_use]
    pub fn new(error: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            param: param.into(),
        }
    }

    /// Reads an item out of one element of the `errors` array.
    ///
    /// Non-string members are kept as their JSON text rather than dropped. An
    /// element that is not an object, or an object with neither `error` nor
    /// `param`, becomes a message of its own JSON text.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| match value.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        match value {
            Value::String(s) => Self::new(s.clone(), ""),
            Value::Object(_) => {
                let item = Self::new(text("error"), text("param"));
                if item.error.is_empty() && item.param.is_empty() {
                    Self::new(value.to_string(), "")
                } else {
                    item
                }
            }
            other => Self::new(other.to_string(), ""),
        }
    }

    /// Renders the item as `"<message> <param>."`.
    ///
    /// The server's own trailing period is dropped so that the parameter
    /// name lands inside the sentence. Either part may be empty.
    #[must_use]
    pub fn render(&self) -> String {
        let message = self.error.trim_end().trim_end_matches('.');
        let param = self.param.trim();
        match (message.is_empty(), param.is_empty()) {
            (_, true) => format!("{message}."),
            (true, false) => format!("{param}."),
            (false, false) => format!("{message} {param}."),
        }
    }
}

/// The server rejected a request with one or more per-field validation errors.
///
/// All items are merged into a single message, in the order the server
/// reported them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// HTTP status code of the response.
    pub status: u16,
    /// The individual items, in wire order.
    pub items: Vec<ErrorItem>,
    /// The aggregated message.
    pub message: String,
}

impl ValidationError {
    /// Aggregates the given items into a single validation error.
    #[must_use]
    pub fn from_items(status: u16, items: Vec<ErrorItem>) -> Self {
        let message = items
            .iter()
            .map(ErrorItem::render)
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            status,
            items,
            message,
        }
    }
}

/// Errors surfaced to callers after translating an API response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Aggregated per-field validation failure. Recoverable by fixing inputs.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The server reported a single, non-field error.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Machine-readable error code, if the server sent one.
        code: Option<String>,
        /// Human-readable message.
        message: String,
    },

    /// The body was not JSON, or was not a recognised error envelope.
    #[error("unexpected response (HTTP {status}): {body}")]
    Transport {
        /// HTTP status code of the response.
        status: u16,
        /// The raw response body.
        body: String,
    },

    /// The body was a success envelope but could not be hydrated.
    #[error("{0}")]
    Decode(#[from] CodecError),
}

impl ApiError {
    /// Returns the HTTP status of the exchange, when known.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Validation(err) => Some(err.status),
            Self::Api { status, .. } | Self::Transport { status, .. } => Some(*status),
            Self::Decode(_) => None,
        }
    }

    /// Returns `true` for server-side validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_drops_message_period() {
        let item = ErrorItem::new("Missing required parameter.", "price");
        assert_eq!(item.render(), "Missing required parameter price.");
    }

    #[test]
    fn test_render_without_param() {
        let item = ErrorItem::new("Invalid token", "");
        assert_eq!(item.render(), "Invalid token.");
    }

    #[test]
    fn test_aggregate_preserves_order() {
        let err = ValidationError::from_items(
            400,
            vec![
                ErrorItem::new("Missing required parameter.", "price"),
                ErrorItem::new("Missing required parameter.", "currency"),
            ],
        );
        assert_eq!(
            err.to_string(),
            "Missing required parameter price. Missing required parameter currency."
        );
        assert_eq!(err.items[0].param, "price");
    }

    #[test]
    fn test_item_from_value_keeps_non_string_param() {
        let item = ErrorItem::from_value(&json!({"error": "Bad index", "param": 3}));
        assert_eq!(item.param, "3");
        assert_eq!(item.render(), "Bad index 3.");
    }

    #[test]
    fn test_render_without_message() {
        let item = ErrorItem::new("", "price");
        assert_eq!(item.render(), "price.");
        let item = ErrorItem::from_value(&json!({"error": null, "param": "currency"}));
        assert_eq!(item.render(), "currency.");
    }

    #[test]
    fn test_item_from_non_object_keeps_json_text() {
        assert_eq!(ErrorItem::from_value(&json!(5)).render(), "5.");
        assert_eq!(ErrorItem::from_value(&json!(true)).render(), "true.");
        assert_eq!(ErrorItem::from_value(&json!({})).render(), "{}.");
        assert_eq!(ErrorItem::from_value(&json!("Rate limited.")).render(), "Rate limited.");
    }

    #[test]
    fn test_validation_error_is_std_error() {
        let err = ValidationError::from_items(422, vec![ErrorItem::new("Bad value", "price")]);
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err.clone());
        assert_eq!(boxed.to_string(), "Bad value price.");
        assert!(boxed.source().is_none());
        assert_eq!(ApiError::from(err).to_string(), "Bad value price.");
    }

    #[test]
    fn test_api_error_status() {
        let err = ApiError::Transport {
            status: 502,
            body: "<html>".into(),
        };
        assert_eq!(err.status(), Some(502));
        assert!(!err.is_validation());
    }
}
