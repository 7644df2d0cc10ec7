//! Transport seam between the orchestrator and the network.
//!
//! A [`Transport`] performs exactly one attempt: it sends an
//! [`OutboundRequest`] and reports either the raw response (any status) or
//! the fact that no response arrived. Retry, timeout and normalization
//! policy all live above it in [`crate::orchestrator`].

use crate::error::{Error, Result};
use crate::orchestrator::context::OutboundRequest;
use reqwest::{Client, Url};
use std::future::Future;
use std::time::Duration;

/// A response as received, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why an attempt produced no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Connection refused, DNS failure, reset mid-body, and the like.
    NoResponse(String),
    /// The transport's own timer fired.
    TimedOut,
    /// The request could not be turned into a valid HTTP call.
    InvalidRequest(String),
}

/// One network attempt.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &OutboundRequest,
    ) -> impl Future<Output = std::result::Result<RawResponse, TransportFailure>> + Send;
}

/// reqwest-backed transport against a single base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Build a transport for `base_url`.
    ///
    /// The client carries only a connect timeout; the per-attempt deadline
    /// is applied by the orchestrator.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Self::with_client(base_url, client)
    }

    /// Use a preconfigured client (proxies, TLS roots, pooling).
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid API base URL {base_url}: {e}")))?;
        Ok(Self { client, base_url })
    }

    /// Join `request.path` onto the base URL and append the canonical query.
    pub fn url_for(&self, request: &OutboundRequest) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        let mut url =
            Url::parse(&joined).map_err(|e| Error::Other(format!("invalid request URL: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &OutboundRequest,
    ) -> std::result::Result<RawResponse, TransportFailure> {
        let url = self
            .url_for(request)
            .map_err(|e| TransportFailure::InvalidRequest(e.to_string()))?;

        let mut builder = self
            .client
            .request(request.method.into(), url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?;

        Ok(RawResponse::new(status, body.to_vec()))
    }
}

fn classify(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::TimedOut
    } else {
        TransportFailure::NoResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RequestDescriptor;
    use crate::orchestrator::context::augment;
    use crate::session::SessionContext;

    fn outbound(descriptor: RequestDescriptor) -> OutboundRequest {
        augment(&descriptor, &SessionContext::anonymous())
    }

    #[test]
    fn url_joins_path_and_sorted_query() {
        let transport = HttpTransport::new("https://api.example.test/v1/").unwrap();
        let url = transport
            .url_for(&outbound(
                RequestDescriptor::get("/staff")
                    .query("store", "A B")
                    .query("page", "2"),
            ))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.test/v1/staff?page=2&store=A+B"
        );
    }

    #[test]
    fn url_without_query_has_no_question_mark() {
        let transport = HttpTransport::new("https://api.example.test").unwrap();
        let url = transport
            .url_for(&outbound(RequestDescriptor::get("ping")))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/ping");
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        assert!(matches!(
            HttpTransport::new("not a url"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(304, "").is_success());
        assert!(!RawResponse::new(500, "").is_success());
    }
}
