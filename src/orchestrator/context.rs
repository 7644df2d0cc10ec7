//! Context injection: auth and mode headers for an outbound request.

use crate::config::secrets::bearer_header;
use crate::model::{Method, RequestDescriptor};
use crate::session::SessionContext;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub const SANDBOX_MODE_HEADER: HeaderName = HeaderName::from_static("x-sandbox-mode");

/// A descriptor plus the headers the core attaches to it.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

/// Build the outbound form of `descriptor` for `session`.
///
/// The descriptor is left untouched. A missing token just omits
/// `Authorization`; the API rejects unauthenticated calls itself.
pub fn augment(descriptor: &RequestDescriptor, session: &SessionContext) -> OutboundRequest {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(token) = session.bearer_token() {
        match bearer_header(token) {
            Some(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            None => warn!("bearer token is not a valid header value, sending without it"),
        }
    }

    if session.sandbox_mode() {
        headers.insert(SANDBOX_MODE_HEADER, HeaderValue::from_static("true"));
    }

    OutboundRequest {
        method: descriptor.method(),
        path: descriptor.path().to_owned(),
        query: descriptor.query_params().clone(),
        body: descriptor.body_value().cloned(),
        headers,
    }
}
