//! Conversion of transport outcomes into [`RequestError`]s.
//!
//! Precedence follows how far the exchange got: no response at all, a
//! response with a failing status, a 2xx carrying an application error,
//! and finally a 2xx whose body does not fit the expected type.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RequestError, Result};

/// Maps a transport failure (no usable response) to a request error.
pub(crate) fn transport_error(err: reqwest::Error) -> RequestError {
    if err.is_builder() {
        RequestError::local(err)
    } else {
        RequestError::network()
    }
}

/// Parses a response body; non-JSON text is kept as a string.
pub(crate) fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    Some(
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
    )
}

/// Builds the error for a response whose status is outside 2xx.
pub(crate) fn status_error(status: StatusCode, body: Option<Value>) -> RequestError {
    let message = body
        .as_ref()
        .and_then(|b| b.get("error"))
        .and_then(error_text);
    RequestError::server(status.as_u16(), message, body)
}

/// Returns the body of a 2xx response, or an application error if the
/// body reports one.
pub(crate) fn unwrap_payload(body: Value) -> Result<Value> {
    match body.get("error").and_then(error_text) {
        Some(message) => Err(RequestError::application(message, body)),
        None => Ok(body),
    }
}

/// Decodes a 2xx payload into the operation's response type.
pub(crate) fn decode<T: DeserializeOwned>(payload: Value) -> Result<T> {
    T::deserialize(&payload).map_err(|e| RequestError::decode(e, Some(payload.clone())))
}

/// Text of an `error` field, or None if it signals no error.
///
/// `null`, `false`, zero and the empty string all mean "no error".
fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
