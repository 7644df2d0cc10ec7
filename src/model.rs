//! Core data model.
//!
//! A request descriptor is the caller's description of one API call. It has
//! identity (method + path + query + body), and resolves to exactly one
//! [`Outcome`]: a payload, an explicit suppression, or an error envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// HTTP methods the workforce API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Only GET is safe to collapse into a single in-flight call.
    pub fn is_deduplicable(self) -> bool {
        matches!(self, Method::Get)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(format!("unsupported method: {other}")),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

// ---------------------------------------------------------------------------
// Request Descriptor
// ---------------------------------------------------------------------------

/// One API call as described by a page-level wrapper.
///
/// Builder methods consume and return the descriptor, so a built value is
/// never mutated in place. Query parameters are kept sorted by name; the
/// order they were added in does not affect identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: BTreeMap<String, String>,
    body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Add a query parameter. A repeated name replaces the earlier value.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn body_value(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Request Key
// ---------------------------------------------------------------------------

/// Canonical identity of a request. See [`crate::orchestrator::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(pub(crate) String);

impl RequestKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Error Envelope
// ---------------------------------------------------------------------------

/// Message shown when an attempt exceeds the per-attempt timeout.
pub const TIMEOUT_MESSAGE: &str = "connection too slow, please retry";
/// Message shown when no response could be obtained at all.
pub const NETWORK_MESSAGE: &str = "network unavailable, please check your connection";
/// Fallback for 5xx responses without a usable `message`.
pub const SERVER_ERROR_MESSAGE: &str = "server error, please try again later";
pub const SUPPRESSED_MESSAGE: &str = "duplicate request suppressed";
pub const CANCELLED_MESSAGE: &str = "request cancelled";

/// Failure classification shared by every endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No response received (DNS, refused connection, reset).
    Network,
    /// An attempt exceeded the per-attempt timeout.
    Timeout,
    /// 4xx. Never retried.
    ClientError,
    /// 5xx after retries were exhausted.
    ServerError,
    /// A prior identical GET owns this request.
    DeduplicatedSuppressed,
    /// The caller cancelled the request.
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ClientError => "client_error",
            ErrorKind::ServerError => "server_error",
            ErrorKind::DeduplicatedSuppressed => "deduplicated_suppressed",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform failure shape handed to every caller.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ErrorEnvelope {
    pub message: String,
    pub status_code: Option<u16>,
    pub server_details: Option<Map<String, Value>>,
    pub kind: ErrorKind,
}

impl ErrorEnvelope {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            server_details: None,
            kind,
        }
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, TIMEOUT_MESSAGE)
    }

    pub fn network() -> Self {
        Self::new(ErrorKind::Network, NETWORK_MESSAGE)
    }

    pub fn suppressed() -> Self {
        Self::new(ErrorKind::DeduplicatedSuppressed, SUPPRESSED_MESSAGE)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, CANCELLED_MESSAGE)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal result of one orchestrated request.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Outcome<T = Value> {
    /// Unwrapped response payload.
    Ok(T),
    /// An identical GET was already in flight; no call was made.
    Suppressed,
    Failed(ErrorEnvelope),
}

impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Outcome::Suppressed)
    }

    /// Short label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Ok(_) => "ok",
            Outcome::Suppressed => "suppressed",
            Outcome::Failed(_) => "error",
        }
    }

    pub fn error(&self) -> Option<&ErrorEnvelope> {
        match self {
            Outcome::Failed(envelope) => Some(envelope),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Suppressed => Outcome::Suppressed,
            Outcome::Failed(envelope) => Outcome::Failed(envelope),
        }
    }

    /// Collapse into a `Result`, reporting suppression as a
    /// `DeduplicatedSuppressed` envelope.
    pub fn into_result(self) -> Result<T, ErrorEnvelope> {
        match self {
            Outcome::Ok(value) => Ok(value),
            Outcome::Suppressed => Err(ErrorEnvelope::suppressed()),
            Outcome::Failed(envelope) => Err(envelope),
        }
    }
}

impl Outcome<Value> {
    /// Deserialize a successful payload into `T`. Suppression and failures
    /// pass through unchanged.
    pub fn decode<T: DeserializeOwned>(self) -> crate::error::Result<Outcome<T>> {
        Ok(match self {
            Outcome::Ok(value) => Outcome::Ok(serde_json::from_value(value)?),
            Outcome::Suppressed => Outcome::Suppressed,
            Outcome::Failed(envelope) => Outcome::Failed(envelope),
        })
    }
}

impl<T> From<Result<T, ErrorEnvelope>> for Outcome<T> {
    fn from(result: Result<T, ErrorEnvelope>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(envelope) if envelope.kind == ErrorKind::DeduplicatedSuppressed => {
                Outcome::Suppressed
            }
            Err(envelope) => Outcome::Failed(envelope),
        }
    }
}
