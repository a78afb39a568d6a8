//! Aggregation metrics
//!
//! Recorded through the `metrics` facade; installing an exporter is left to
//! the embedding application.

use std::time::Duration;

/// Record time spent producing one field's result
pub fn record_field_duration(operation: &str, duration: Duration) {
    metrics::histogram!(
        "parametric_field_duration_seconds",
        "operation" => operation.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record a field that produced a result (possibly empty)
pub fn record_field_success(operation: &str) {
    metrics::counter!(
        "parametric_field_requests_total",
        "operation" => operation.to_string(),
        "status" => "ok",
    )
    .increment(1);
}

/// Record a field that failed
pub fn record_field_error(operation: &str, error_type: &str) {
    metrics::counter!(
        "parametric_field_requests_total",
        "operation" => operation.to_string(),
        "status" => "error",
    )
    .increment(1);

    metrics::counter!(
        "parametric_field_errors_total",
        "operation" => operation.to_string(),
        "error_type" => error_type.to_string(),
    )
    .increment(1);
}

/// Record a raw value skipped because it could not be parsed
pub fn record_malformed_value(field: &str) {
    metrics::counter!(
        "parametric_malformed_values_total",
        "field" => field.to_string(),
    )
    .increment(1);
}
