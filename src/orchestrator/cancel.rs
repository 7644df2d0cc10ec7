//! Per-request cancellation.
//!
//! Callers hand a [`CancellationToken`] to
//! [`Orchestrator::request_cancellable`](super::Orchestrator::request_cancellable).
//! Cancelling it (or any clone) aborts the attempt or backoff wait in
//! progress. A token cancelled before the request starts is still observed.

use std::future::Future;
pub use tokio_util::sync::CancellationToken;

/// Run `fut` unless `cancel` fires first. `None` means cancelled.
pub(crate) async fn unless_cancelled<F: Future>(
    cancel: Option<&CancellationToken>,
    fut: F,
) -> Option<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => None,
            out = fut => Some(out),
        },
        None => Some(fut.await),
    }
}
