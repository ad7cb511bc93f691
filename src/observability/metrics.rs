//! Metrics collection and exposition.
//!
//! # Metrics
//! - `modsec_gate_requests_total` (counter): requests by outcome
//!   (allow, block, bypass, interrupt, continue)
//! - `modsec_gate_verdict_status_total` (counter): verdicts by status class
//!   (1xx..5xx, or `other` for 600 and above)
//! - `modsec_gate_errors_total` (counter): gate failures by kind
//! - `modsec_gate_verdict_duration_seconds` (histogram): verdict call latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is opt-in

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::StatusCode;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a finished request by its outcome.
pub fn record_outcome(outcome: &'static str) {
    counter!("modsec_gate_requests_total", "outcome" => outcome).increment(1);
}

/// Record a verdict's status class and how long the call took.
pub fn record_verdict(status: StatusCode, started: Instant) {
    counter!("modsec_gate_verdict_status_total", "class" => status_class(status)).increment(1);
    histogram!("modsec_gate_verdict_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Count a gate failure by kind.
pub fn record_error(kind: &'static str) {
    counter!("modsec_gate_errors_total", "kind" => kind).increment(1);
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
