//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxify_requests_total` (counter): relayed calls by response type, outcome
//! - `proxify_request_duration_seconds` (histogram): end-to-end latency
//!
//! Outcome is `ok` or the error kind that ended the call.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one relayed call.
pub fn record_request(response_type: &str, outcome: &str, start: Instant) {
    ::metrics::counter!(
        "proxify_requests_total",
        "response_type" => response_type.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    ::metrics::histogram!(
        "proxify_request_duration_seconds",
        "response_type" => response_type.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
