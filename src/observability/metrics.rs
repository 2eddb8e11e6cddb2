//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_auth_decisions_total` (counter): auth gate outcomes by `outcome`
//! - `gateway_compositions_total` (counter): composition attempts by `result`
//! - `gateway_overlays_skipped_total` (counter): dropped overlays by `reason`
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record an auth gate decision (`exempt`, `allowed`, `denied`, `malformed`).
pub fn record_auth_decision(outcome: &'static str) {
    metrics::counter!("gateway_auth_decisions_total", "outcome" => outcome).increment(1);
}

/// Record the result of a composition request (`ok`, `error`).
pub fn record_composition(result: &'static str) {
    metrics::counter!("gateway_compositions_total", "result" => result).increment(1);
}

/// Record an overlay dropped from a composition (`unknown`, `fetch_failed`).
pub fn record_overlay_skipped(reason: &'static str) {
    metrics::counter!("gateway_overlays_skipped_total", "reason" => reason).increment(1);
}
