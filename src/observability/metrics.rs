//! Metrics collection and exposition.
//!
//! # Metrics
//! - `registry_operations_total` (counter): registry calls by `op`, `outcome`
//! - `registry_aliases` (gauge): aliases currently claimed
//! - `dispatch_requests_total` (counter): dispatched requests by `status`
//! - `dispatch_request_duration_seconds` (histogram): dispatch latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_registry_op(op: &'static str, outcome: &'static str) {
    counter!("registry_operations_total", "op" => op, "outcome" => outcome).increment(1);
}

pub fn record_alias_count(count: usize) {
    gauge!("registry_aliases").set(count as f64);
}

pub fn record_dispatch(status: u16, start: Instant) {
    counter!("dispatch_requests_total", "status" => status.to_string()).increment(1);
    histogram!("dispatch_request_duration_seconds").record(start.elapsed().as_secs_f64());
}
