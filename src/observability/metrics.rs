//! Metrics collection and exposition.
//!
//! # Metrics
//! - `portal_proxy_requests_total` (counter): forwarded requests by method, status
//! - `portal_proxy_request_duration_seconds` (histogram): forwarding latency
//! - `portal_proxy_errors_total` (counter): forwarding failures by kind
//! - `portal_access_decisions_total` (counter): guard outcomes by section
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "portal_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "portal_proxy_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_forward_error(kind: &'static str) {
    metrics::counter!("portal_proxy_errors_total", "kind" => kind).increment(1);
}

pub fn record_access_decision(section: &str, outcome: &'static str) {
    metrics::counter!(
        "portal_access_decisions_total",
        "section" => section.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
