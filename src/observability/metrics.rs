//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_publish_attempts_total` (counter): attempts by broker, outcome
//! - `relay_breaker_total_count` (gauge): breaker rolling total per broker
//! - `relay_breaker_error_percent` (gauge): breaker error rate per broker
//!
//! # Design Decisions
//! - Recorders are cheap (atomic updates behind the `metrics` facade) and
//!   safe to call before an exporter is installed
//! - Labels carry broker identity and the closed outcome tag set

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::publish::outcome::Outcome;
use crate::resilience::BreakerMetrics;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one finished publish attempt.
pub fn record_publish(broker_id: &str, outcome: Outcome) {
    metrics::counter!(
        "relay_publish_attempts_total",
        "broker" => broker_id.to_string(),
        "outcome" => outcome.as_label()
    )
    .increment(1);
}

/// Export a breaker's counter snapshot.
pub fn record_breaker(broker_id: &str, snapshot: &BreakerMetrics) {
    metrics::gauge!(
        "relay_breaker_total_count",
        "broker" => broker_id.to_string()
    )
    .set(snapshot.total_count as f64);
    metrics::gauge!(
        "relay_breaker_error_percent",
        "broker" => broker_id.to_string()
    )
    .set(snapshot.error_percent as f64);
}
