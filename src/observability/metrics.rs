//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_dispatch_attempts_total` (counter): attempts by endpoint, outcome
//! - `relay_dispatch_total` (counter): logical dispatches by outcome
//! - `relay_dispatch_attempts` (histogram): attempts needed per dispatch
//! - `relay_dispatch_duration_seconds` (histogram): end-to-end latency
//! - `relay_pool_advances_total` (counter) and `relay_pool_cursor` (gauge)
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_attempt(endpoint: &str, outcome: &'static str) {
    counter!(
        "relay_dispatch_attempts_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_dispatch(outcome: &'static str, attempts: usize, start: Instant) {
    counter!("relay_dispatch_total", "outcome" => outcome).increment(1);
    histogram!("relay_dispatch_attempts").record(attempts as f64);
    histogram!("relay_dispatch_duration_seconds", "outcome" => outcome).record(start.elapsed().as_secs_f64());
}

pub fn record_advance(cursor: usize) {
    counter!("relay_pool_advances_total").increment(1);
    gauge!("relay_pool_cursor").set(cursor as f64);
}
