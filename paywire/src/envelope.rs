//! Error envelope translation.
//!
//! Turns a completed HTTP exchange into either a typed payload or one
//! [`ApiError`]. The API reports validation failures as an array of
//! independent items:
//!
//! ```json
//! { "errors": [ { "error": "Missing required parameter.", "param": "price" },
//!               { "error": "Missing required parameter.", "param": "currency" } ] }
//! ```
//!
//! which become a single [`ValidationError`] whose message is
//! `Missing required parameter price. Missing required parameter currency.`
//!
//! Besides the `errors` array the API uses two single-error shapes,
//! `{"error": "..."}` and `{"status": "error", "code": "...", "message": "..."}`,
//! both surfaced as [`ApiError::Api`]. Successful payloads may be wrapped in a
//! `{"data": ...}` envelope.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, CodecError, ErrorItem, ValidationError};
use crate::logging::Logger;

/// A completed HTTP exchange, as seen by the codec.
pub trait ApiResponse {
    /// HTTP status code.
    fn status(&self) -> u16;

    /// Raw response body. Anything other than UTF-8 is reported as a
    /// transport error.
    fn body(&self) -> &[u8];
}

/// A plain status + body pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    status: u16,
    body: String,
}

impl RawResponse {
    /// Creates a response from its status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates an HTTP 200 response.
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

impl ApiResponse for RawResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn body(&self) -> &[u8] {
        self.body.as_bytes()
    }
}

#[cfg(feature = "http")]
impl<B: AsRef<[u8]>> ApiResponse for http::Response<B> {
    fn status(&self) -> u16 {
        self.status().as_u16()
    }

    fn body(&self) -> &[u8] {
        self.body().as_ref()
    }
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// The body as text. A body that is not UTF-8 cannot be a JSON envelope and
/// is returned as a transport error, rendered lossily for display.
fn body_text<R: ApiResponse>(response: &R) -> Result<&str, ApiError> {
    let bytes = response.body();
    std::str::from_utf8(bytes).map_err(|_| ApiError::Transport {
        status: response.status(),
        body: String::from_utf8_lossy(bytes).into_owned(),
    })
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Collects the `errors` array, if the payload carries a non-empty one.
fn error_items(payload: &Value) -> Option<Vec<ErrorItem>> {
    let items = payload.get("errors")?.as_array()?;
    if items.is_empty() {
        return None;
    }
    Some(items.iter().map(ErrorItem::from_value).collect())
}

fn text_member(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Recognises the single-error shapes.
fn single_error(payload: &Value, status: u16) -> Option<ApiError> {
    if let Some(message) = text_member(payload, "error") {
        return Some(ApiError::Api {
            status,
            code: text_member(payload, "code"),
            message,
        });
    }
    if payload.get("status").and_then(Value::as_str) == Some("error") {
        return Some(ApiError::Api {
            status,
            code: text_member(payload, "code"),
            message: text_member(payload, "message").unwrap_or_default(),
        });
    }
    None
}

/// Translates a failed exchange into one error.
///
/// - A body that is not UTF-8 JSON, or carries no `errors` array, becomes
///   [`ApiError::Transport`] with the raw status and body.
/// - An `errors` array becomes one [`ApiError::Validation`] whose message joins
///   every item in array order.
#[must_use]
pub fn translate_error(response: &impl ApiResponse) -> ApiError {
    let status = response.status();
    let body = match body_text(response) {
        Ok(body) => body,
        Err(err) => return err,
    };
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(error_items)
        .map_or_else(
            || ApiError::Transport {
                status,
                body: body.to_owned(),
            },
            |items| ValidationError::from_items(status, items).into(),
        )
}

/// Reads a typed payload out of a completed exchange.
///
/// Malformed bodies fail even with an HTTP 200. Error envelopes take precedence
/// over the status code. The payload is hydrated straight from the body text,
/// unwrapping a `data` envelope when one is present.
///
/// # Errors
///
/// Returns [`ApiError`] for error envelopes, non-UTF-8 or non-JSON bodies, non-success
/// statuses, and payloads that do not fit `T`.
pub fn decode<T: DeserializeOwned>(
    response: &impl ApiResponse,
    logger: &dyn Logger,
) -> Result<T, ApiError> {
    let status = response.status();
    logger.log_response(status, &String::from_utf8_lossy(response.body()));

    let result = body_text(response).and_then(|body| decode_body(status, body, response));
    if let Err(err) = &result {
        logger.log_error(&err.to_string());
        #[cfg(feature = "telemetry")]
        tracing::warn!(status, error = %err, "Response translation failed");
    }
    result
}

fn decode_body<T: DeserializeOwned>(
    status: u16,
    body: &str,
    response: &impl ApiResponse,
) -> Result<T, ApiError> {
    let Ok(payload) = serde_json::from_str::<Value>(body) else {
        return Err(ApiError::Transport {
            status,
            body: body.to_owned(),
        });
    };
    if let Some(items) = error_items(&payload) {
        return Err(ValidationError::from_items(status, items).into());
    }
    if let Some(err) = single_error(&payload, status) {
        return Err(err);
    }
    if !is_success(status) {
        return Err(translate_error(response));
    }

    let wrapped = payload.as_object().is_some_and(|obj| obj.contains_key("data"));
    let decoded = if wrapped {
        serde_json::from_str::<DataEnvelope<T>>(body).map(|envelope| envelope.data)
    } else {
        serde_json::from_str::<T>(body)
    };
    decoded.map_err(|source| {
        ApiError::Decode(CodecError::Decode {
            model: std::any::type_name::<T>(),
            source,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::CurrencyMap;
    use crate::logging::NoopLogger;
    use crate::logging::testing::RecordingLogger;

    #[derive(Debug, Deserialize)]
    struct Rate {
        code: String,
        rate: f64,
    }

    const VALIDATION_BODY: &str = r#"{"errors":[
        {"error":"Missing required parameter.","param":"price"},
        {"error":"Missing required parameter.","param":"currency"}
    ]}"#;

    #[test]
    fn test_validation_errors_are_aggregated() {
        let err = translate_error(&RawResponse::new(400, VALIDATION_BODY));
        match err {
            ApiError::Validation(validation) => {
                assert_eq!(
                    validation.message,
                    "Missing required parameter price. Missing required parameter currency."
                );
                assert_eq!(validation.status, 400);
                assert_eq!(validation.items.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body_is_transport_error() {
        let err = translate_error(&RawResponse::new(502, "<html>Bad Gateway</html>"));
        assert!(matches!(
            err,
            ApiError::Transport { status: 502, ref body } if body == "<html>Bad Gateway</html>"
        ));
    }

    #[test]
    fn test_json_without_errors_is_transport_error() {
        let err = translate_error(&RawResponse::new(500, r#"{"oops": true}"#));
        assert!(matches!(err, ApiError::Transport { status: 500, .. }));

        let err = translate_error(&RawResponse::new(400, r#"{"errors": []}"#));
        assert!(matches!(err, ApiError::Transport { status: 400, .. }));
    }

    #[test]
    fn test_malformed_json_with_200_is_not_success() {
        let result = decode::<Rate>(&RawResponse::ok("{\"code\": \"USD\","), &NoopLogger);
        assert!(matches!(result, Err(ApiError::Transport { status: 200, .. })));
    }

    #[test]
    fn test_decode_plain_and_wrapped_payloads() {
        let rate: Rate =
            decode(&RawResponse::ok(r#"{"code": "USD", "rate": 41000.5}"#), &NoopLogger).unwrap();
        assert_eq!(rate.code, "USD");
        assert_eq!(rate.rate, 41000.5);

        let rates: Vec<Rate> = decode(
            &RawResponse::ok(r#"{"facade": "merchant", "data": [{"code": "EUR", "rate": 1.0}]}"#),
            &NoopLogger,
        )
        .unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].code, "EUR");
    }

    #[test]
    fn test_decode_validation_even_with_200() {
        let err = decode::<Rate>(&RawResponse::ok(VALIDATION_BODY), &NoopLogger).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn test_decode_single_error_shapes() {
        let body = r#"{"error": "This endpoint does not support the `public` facade"}"#;
        let err = decode::<Rate>(&RawResponse::new(401, body), &NoopLogger).unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 401, code: None, .. }));

        let body = r#"{"status": "error", "code": "010207",
            "message": "Invalid amount", "data": null}"#;
        let err = decode::<Rate>(&RawResponse::new(400, body), &NoopLogger).unwrap_err();
        match err {
            ApiError::Api { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("010207"));
                assert_eq!(message, "Invalid amount");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_success_without_envelope() {
        let err = decode::<Rate>(&RawResponse::new(503, r#"{"retry": true}"#), &NoopLogger)
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { status: 503, .. }));
    }

    #[test]
    fn test_null_data_envelope() {
        let response = RawResponse::ok(r#"{"data": null}"#);
        let rate: Option<Rate> = decode(&response, &NoopLogger).unwrap();
        assert!(rate.is_none());

        let err = decode::<Rate>(&response, &NoopLogger).unwrap_err();
        assert!(matches!(err, ApiError::Decode(CodecError::Decode { .. })), "{err:?}");
        assert!(err.to_string().contains("Rate"), "{err}");
    }

    #[test]
    fn test_non_object_error_items_keep_their_text() {
        let body = r#"{"errors": [5, "Rate limited.", {"error": "Bad value.", "param": "price"}]}"#;
        let err = translate_error(&RawResponse::new(400, body));
        assert_eq!(err.to_string(), "5. Rate limited. Bad value price.");
    }

    #[test]
    fn test_decode_failure_names_model() {
        let err = decode::<Rate>(&RawResponse::ok(r#"{"code": 5, "rate": 1}"#), &NoopLogger)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Rate"), "{message}");
    }

    #[test]
    fn test_decode_keeps_duplicate_key_detection() {
        let body = r#"{"data": {"USD": {"payPro": true}, "USD": {"payPro": false}}}"#;
        let err = decode::<Option<CurrencyMap>>(&RawResponse::ok(body), &NoopLogger).unwrap_err();
        assert!(err.to_string().contains("duplicate currency key `USD`"));
    }

    #[test]
    fn test_logger_sinks_receive_response_and_error() {
        let logger = RecordingLogger::default();
        let _ = decode::<Rate>(&RawResponse::new(400, VALIDATION_BODY), &logger);
        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with("response 400"));
        assert_eq!(
            entries[1],
            "error Missing required parameter price. Missing required parameter currency."
        );
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_response_adapter() {
        let response = http::Response::builder()
            .status(422)
            .body(VALIDATION_BODY.as_bytes().to_vec())
            .unwrap();
        let err = translate_error(&response);
        assert_eq!(err.status(), Some(422));
        assert!(err.is_validation());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_non_utf8_body_is_transport_error() {
        let response = http::Response::builder()
            .status(200)
            .body(b"{\"code\": \"Jo\xFFe\", \"rate\": 1}".to_vec())
            .unwrap();
        let logger = RecordingLogger::default();
        let err = decode::<Rate>(&response, &logger).unwrap_err();
        match err {
            ApiError::Transport { status, body } => {
                assert_eq!(status, 200);
                assert!(body.contains('\u{FFFD}'), "{body}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(logger.entries().len(), 2);

        let response = http::Response::builder()
            .status(400)
            .body(vec![0xFF, 0xFE])
            .unwrap();
        assert!(matches!(
            translate_error(&response),
            ApiError::Transport { status: 400, .. }
        ));
    }
}
