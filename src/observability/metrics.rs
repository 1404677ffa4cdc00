//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): total requests by method, status
//! - `gate_request_duration_seconds` (histogram): latency distribution
//! - `gate_denials_total` (counter): denials by reason
//! - `gate_unauthorized_total` (counter): wrong-role navigation attempts

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gate_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    metrics::histogram!(
        "gate_request_duration_seconds",
        "method" => method.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// A request was rejected because its identifier is blocked.
pub fn record_blocked() {
    metrics::counter!("gate_denials_total", "reason" => "blocked").increment(1);
}

/// A request breached the fixed-window quota.
pub fn record_rate_limited() {
    metrics::counter!("gate_denials_total", "reason" => "rate_limit").increment(1);
}

/// A request matched a suspicious pattern.
pub fn record_suspicious() {
    metrics::counter!("gate_denials_total", "reason" => "suspicious").increment(1);
}

/// An API-key request exceeded its sliding-window quota.
pub fn record_key_quota_exceeded() {
    metrics::counter!("gate_denials_total", "reason" => "key_quota").increment(1);
}

/// A principal requested a path outside its role's prefixes.
pub fn record_unauthorized() {
    metrics::counter!("gate_unauthorized_total").increment(1);
}
