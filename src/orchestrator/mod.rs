//! Request orchestrator. The single entry point every API wrapper calls.
//!
//! One logical request moves through:
//!
//! ```text
//! INIT -> KEY_DERIVED -> DEDUP_CHECK -> SUPPRESSED
//!                                    \-> SENDING -> RETRY_WAIT -> SENDING ... -> SETTLED
//! ```
//!
//! Key derivation and the registry check are synchronous. Only the
//! transport call and the backoff sleep suspend. The in-flight lease taken
//! at DEDUP_CHECK is dropped when the request future finishes or is
//! dropped, which is the single release point.

pub mod cancel;
pub mod context;
pub mod key;
pub mod normalize;
pub mod registry;
pub mod retry;

use crate::error::{Error, Result};
use crate::model::{ErrorEnvelope, Outcome, RequestDescriptor};
use crate::session::{SessionContext, SessionSource};
use crate::telemetry::metrics;
use crate::telemetry::request::{record_attempt, record_outcome, start_request_span};
use crate::transport::Transport;
use opentelemetry::KeyValue;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{Instrument, Span, debug, warn};
use uuid::Uuid;

use cancel::{CancellationToken, unless_cancelled};
use context::{OutboundRequest, augment};
use key::derive_key;
use normalize::normalize;
use registry::{Admission, InFlightRegistry};
use retry::{AttemptFailure, RetryPolicy, RetryState};

/// Timing knobs shared by every request an orchestrator sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Per-attempt deadline. Each retry gets a fresh window.
    pub timeout_ms: u64,
    pub max_retries: u32,
    /// Linear backoff unit: retry `n` waits `n * base_delay_ms`.
    pub base_delay_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            max_retries: 3,
            base_delay_ms: 2_000,
        }
    }
}

/// Top-level TOML wrapper.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    orchestrator: OrchestratorConfig,
}

impl OrchestratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }

    /// Parse the `[orchestrator]` table of a TOML document. Missing keys
    /// keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("bad orchestrator config: {e}")))?;
        Ok(file.orchestrator)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }
}

/// Owns the in-flight registry and drives requests through a transport.
///
/// Instances are independent: two orchestrators never suppress each
/// other's requests.
pub struct Orchestrator<T> {
    transport: T,
    registry: InFlightRegistry,
    config: OrchestratorConfig,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(transport: T, config: OrchestratorConfig) -> Self {
        Self {
            transport,
            registry: InFlightRegistry::new(),
            config,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of GETs currently holding a registry entry.
    pub fn in_flight(&self) -> usize {
        self.registry.len()
    }

    /// Send `descriptor` with the caller's current session.
    pub async fn request<S: SessionSource + ?Sized>(
        &self,
        descriptor: &RequestDescriptor,
        session: &S,
    ) -> Outcome {
        let session = session.snapshot();
        self.execute(descriptor, session, None).await
    }

    /// Like [`request`](Self::request), but aborts as soon as `cancel` fires.
    pub async fn request_cancellable<S: SessionSource + ?Sized>(
        &self,
        descriptor: &RequestDescriptor,
        session: &S,
        cancel: &CancellationToken,
    ) -> Outcome {
        let session = session.snapshot();
        self.execute(descriptor, session, Some(cancel)).await
    }

    pub async fn get<S: SessionSource + ?Sized>(&self, path: &str, session: &S) -> Outcome {
        self.request(&RequestDescriptor::get(path), session).await
    }

    pub async fn post<S: SessionSource + ?Sized>(
        &self,
        path: &str,
        body: Value,
        session: &S,
    ) -> Outcome {
        self.request(&RequestDescriptor::post(path).body(body), session)
            .await
    }

    pub async fn put<S: SessionSource + ?Sized>(
        &self,
        path: &str,
        body: Value,
        session: &S,
    ) -> Outcome {
        self.request(&RequestDescriptor::put(path).body(body), session)
            .await
    }

    pub async fn delete<S: SessionSource + ?Sized>(&self, path: &str, session: &S) -> Outcome {
        self.request(&RequestDescriptor::delete(path), session).await
    }

    async fn execute(
        &self,
        descriptor: &RequestDescriptor,
        session: SessionContext,
        cancel: Option<&CancellationToken>,
    ) -> Outcome {
        let request_id = Uuid::new_v4();
        let span = start_request_span(descriptor.method().as_str(), descriptor.path(), &request_id);
        let method_label = KeyValue::new("method", descriptor.method().as_str());

        async {
            let started = Instant::now();
            let key = derive_key(descriptor);

            // Held until this block returns; dropping it releases the entry.
            let _lease = match self.registry.try_acquire(descriptor.method(), &key) {
                Admission::Acquired(lease) => Some(lease),
                Admission::Bypass => None,
                Admission::Busy => {
                    debug!(%key, "identical request already in flight, suppressing");
                    metrics::requests_suppressed().add(1, &[method_label.clone()]);
                    record_outcome(&Span::current(), "suppressed", 0);
                    return Outcome::Suppressed;
                }
            };

            let outbound = augment(descriptor, &session);
            let outcome: Outcome = self.send_with_retry(&outbound, cancel).await.into();

            let elapsed_ms = started.elapsed().as_millis() as u64;
            record_outcome(&Span::current(), outcome.label(), elapsed_ms);
            metrics::requests().add(
                1,
                &[method_label.clone(), KeyValue::new("outcome", outcome.label())],
            );
            metrics::request_duration_ms().record(elapsed_ms as f64, &[method_label]);

            match &outcome {
                Outcome::Failed(envelope) => warn!(
                    kind = %envelope.kind,
                    status = envelope.status_code,
                    elapsed_ms,
                    "request failed: {}",
                    envelope.message
                ),
                _ => debug!(elapsed_ms, "request settled"),
            }

            outcome
        }
        .instrument(span)
        .await
    }

    async fn send_with_retry(
        &self,
        outbound: &OutboundRequest,
        cancel: Option<&CancellationToken>,
    ) -> std::result::Result<Value, ErrorEnvelope> {
        let policy = self.config.retry_policy();
        let mut state = RetryState::new();

        loop {
            record_attempt(&Span::current(), state.attempt() + 1);

            let attempt = tokio::time::timeout(self.config.timeout(), self.transport.send(outbound));
            let Some(timed) = unless_cancelled(cancel, attempt).await else {
                return Err(ErrorEnvelope::cancelled());
            };

            let failure = match timed {
                Ok(Ok(response)) if response.is_success() => return normalize(Ok(response)),
                Ok(Ok(response)) => AttemptFailure::Status(response),
                Ok(Err(failure)) => AttemptFailure::from(failure),
                Err(_elapsed) => AttemptFailure::TimedOut,
            };

            if !policy.should_retry(&failure, &state) {
                return normalize(Err(failure));
            }

            state.advance();
            let delay = policy.next_delay(&state);
            warn!(
                retry = state.attempt(),
                delay_ms = delay.as_millis() as u64,
                reason = failure.reason(),
                status = failure.status(),
                "attempt failed, retrying"
            );
            metrics::retries().add(1, &[KeyValue::new("reason", failure.reason())]);

            if unless_cancelled(cancel, tokio::time::sleep(delay))
                .await
                .is_none()
            {
                return Err(ErrorEnvelope::cancelled());
            }
        }
    }
}
