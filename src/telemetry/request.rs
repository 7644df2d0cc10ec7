//! Request span helpers.

use tracing::Span;
use uuid::Uuid;

/// Start a span covering one logical request, retries included.
///
/// `request.attempts`, `request.outcome` and `request.duration_ms` are
/// declared empty and filled by [`record_attempt`] and [`record_outcome`].
pub fn start_request_span(method: &str, path: &str, request_id: &Uuid) -> Span {
    tracing::info_span!(
        "api.request",
        "http.request.method" = method,
        "url.path" = path,
        "request.id" = %request_id,
        "request.attempts" = tracing::field::Empty,
        "request.outcome" = tracing::field::Empty,
        "request.duration_ms" = tracing::field::Empty,
    )
}

/// Record the number of the attempt about to be sent (1-indexed).
pub fn record_attempt(span: &Span, attempt: u32) {
    span.record("request.attempts", attempt);
}

pub fn record_outcome(span: &Span, outcome: &str, duration_ms: u64) {
    span.record("request.outcome", outcome);
    span.record("request.duration_ms", duration_ms);
}
