//! Metric instrument factories.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! With no provider installed these are no-ops.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("shiftlog-client")
}

/// Counter: settled requests.
/// Labels: `method`, `outcome` ("ok" | "error").
pub fn requests() -> Counter<u64> {
    meter()
        .u64_counter("shiftlog.requests")
        .with_description("Number of settled API requests")
        .build()
}

/// Counter: retries scheduled.
/// Labels: `reason` ("network" | "timeout" | "server_error").
pub fn retries() -> Counter<u64> {
    meter()
        .u64_counter("shiftlog.retries")
        .with_description("Number of request retries")
        .build()
}

/// Counter: GETs suppressed because an identical one was in flight.
/// Labels: `method`.
pub fn requests_suppressed() -> Counter<u64> {
    meter()
        .u64_counter("shiftlog.requests.suppressed")
        .with_description("Duplicate in-flight requests suppressed")
        .build()
}

/// Histogram: wall time from dedup check to settlement, retries included.
/// Labels: `method`.
pub fn request_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("shiftlog.request.duration_ms")
        .with_description("Request duration in milliseconds")
        .with_unit("ms")
        .build()
}
