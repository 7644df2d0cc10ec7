//! Integration tests for telemetry initialization and span helpers.

use uuid::Uuid;

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be set once per process; another test
    // may have won the race, in which case Err is acceptable.
    let config = shiftlog_client::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "shiftlog-test".to_string(),
        log_level: "debug".to_string(),
    };
    if let Ok(guard) = shiftlog_client::telemetry::init_telemetry(config) {
        assert!(!guard.is_exporting());
        guard.force_flush();
    }
}

#[test]
fn request_span_records_attempts_and_outcome() {
    let id = Uuid::new_v4();
    let span = shiftlog_client::telemetry::request::start_request_span("GET", "/staff", &id);
    shiftlog_client::telemetry::request::record_attempt(&span, 1);
    shiftlog_client::telemetry::request::record_attempt(&span, 2);
    shiftlog_client::telemetry::request::record_outcome(&span, "ok", 2010);
}

#[test]
fn metric_instruments_are_usable_without_provider() {
    use opentelemetry::KeyValue;
    use shiftlog_client::telemetry::metrics;

    metrics::requests().add(
        1,
        &[
            KeyValue::new("method", "GET"),
            KeyValue::new("outcome", "ok"),
        ],
    );
    metrics::retries().add(1, &[KeyValue::new("reason", "network")]);
    metrics::requests_suppressed().add(1, &[KeyValue::new("method", "GET")]);
    metrics::request_duration_ms().record(12.5, &[KeyValue::new("method", "GET")]);
}
