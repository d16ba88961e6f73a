//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tracker_requests_total` (counter): `/track` responses by status
//! - `tracker_request_duration_seconds` (histogram): `/track` latency
//! - `tracker_lookups_total` (counter): successful lookups by source
//! - `tracker_browser_sessions_total` (counter): sessions by outcome
//! - `tracker_browser_session_duration_seconds` (histogram)
//! - `tracker_fetch_attempts_total` (counter): navigation attempts by outcome
//! - `tracker_cache_entries` (gauge)
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint. Needs a running Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start: Instant) {
    counter!("tracker_requests_total", "status" => status.to_string()).increment(1);
    histogram!("tracker_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_lookup(source: &'static str) {
    counter!("tracker_lookups_total", "source" => source).increment(1);
}

pub fn record_browser_session(outcome: &'static str, start: Instant) {
    counter!("tracker_browser_sessions_total", "outcome" => outcome).increment(1);
    histogram!("tracker_browser_session_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_fetch_attempt(outcome: &'static str) {
    counter!("tracker_fetch_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_size(size: usize) {
    gauge!("tracker_cache_entries").set(size as f64);
}
