//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_decisions_total` (counter): decisions by outcome and reason
//! - `guard_escalations_total` (counter): clients moved into the block set
//! - `guard_rate_entries_swept` (counter): expired windows removed by sweeps
//!
//! # Design Decisions
//! - Low-overhead updates (atomic increments)
//! - Prometheus exposition on a separate listener

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    if let Err(e) = builder.install() {
        tracing::error!(error = %e, "failed to install Prometheus exporter");
    } else {
        tracing::info!(address = %addr, "metrics endpoint started");
    }
}

pub fn record_decision(outcome: &'static str, reason: &'static str) {
    counter!("guard_decisions_total", "outcome" => outcome, "reason" => reason).increment(1);
}

pub fn record_escalation() {
    counter!("guard_escalations_total").increment(1);
}

pub fn record_sweep(removed: usize) {
    counter!("guard_rate_entries_swept").increment(removed as u64);
}
