//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatcher_requests_total` (counter): requests by method and status
//! - `dispatcher_request_duration_seconds` (histogram): time from receipt to
//!   synthesized response, by method
//!
//! Recording is always on and costs nothing when no recorder is installed.
//! The Prometheus exporter is only started when enabled in config.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    ::metrics::counter!(
        "dispatcher_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "dispatcher_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(elapsed);
}
