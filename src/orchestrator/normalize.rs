//! Response normalization and error mapping.
//!
//! Callers only ever see the unwrapped JSON payload or an
//! [`ErrorEnvelope`]; status lines, headers and raw bytes stop here.

use super::retry::AttemptFailure;
use crate::model::{ErrorEnvelope, ErrorKind, SERVER_ERROR_MESSAGE};
use crate::transport::RawResponse;
use serde_json::Value;

/// Map the final attempt of a request to what the caller receives.
pub fn normalize(result: Result<RawResponse, AttemptFailure>) -> Result<Value, ErrorEnvelope> {
    match result {
        Ok(response) => Ok(payload(&response.body)),
        Err(AttemptFailure::TimedOut) => Err(ErrorEnvelope::timeout()),
        Err(AttemptFailure::NoResponse(_)) => Err(ErrorEnvelope::network()),
        Err(AttemptFailure::Invalid(detail)) => Err(ErrorEnvelope::new(
            ErrorKind::ClientError,
            format!("invalid request: {detail}"),
        )),
        Err(AttemptFailure::Status(response)) => Err(status_error(&response)),
    }
}

/// Decode a response body. Empty bodies become `null`; bodies that are not
/// JSON are handed back as a JSON string.
pub fn payload(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn status_error(response: &RawResponse) -> ErrorEnvelope {
    let body = payload(&response.body);
    let server_message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_owned);

    let (kind, message) = if response.status >= 500 {
        (
            ErrorKind::ServerError,
            server_message.unwrap_or_else(|| SERVER_ERROR_MESSAGE.to_string()),
        )
    } else {
        (
            ErrorKind::ClientError,
            server_message
                .unwrap_or_else(|| format!("request failed with status {}", response.status)),
        )
    };

    ErrorEnvelope {
        message,
        status_code: Some(response.status),
        server_details: match body {
            Value::Object(map) => Some(map),
            _ => None,
        },
        kind,
    }
}
