//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gatekeeper_requests_total` (counter): admissions by outcome
//! - `gatekeeper_rejections_total` (counter): rejections by reason
//! - `gatekeeper_cached_credentials` (gauge): credentials in the snapshot
//!
//! # Design Decisions
//! - Recording helpers are no-ops until an exporter is installed, so the
//!   library paths never depend on exporter state

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one admission decision.
pub fn record_admission(allowed: bool) {
    let outcome = if allowed { "allow" } else { "reject" };
    metrics::counter!("gatekeeper_requests_total", "outcome" => outcome).increment(1);
}

/// Count one rejection by reason code.
pub fn record_rejection(reason: &'static str) {
    metrics::counter!("gatekeeper_rejections_total", "reason" => reason).increment(1);
}

/// Track the size of the current credential snapshot.
pub fn record_cache_size(count: usize) {
    metrics::gauge!("gatekeeper_cached_credentials").set(count as f64);
}
