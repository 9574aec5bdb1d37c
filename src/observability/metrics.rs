//! Metrics collection.
//!
//! # Metrics
//! - `http_client_requests_total` (counter): attempts by service, outcome, status
//! - `http_client_request_duration_seconds` (histogram): attempt latency
//! - `http_client_retries_total` (counter): scheduled retries
//! - `http_client_circuit_rejections_total` (counter): gate denials
//! - `http_client_circuit_state` (gauge): 0=closed, 1=half_open, 2=open
//!
//! # Design Decisions
//! - Uses the `metrics` facade; the embedding service picks the exporter
//! - Without an installed recorder every call is a no-op

use std::time::Duration;

use metrics::{counter, gauge, histogram};

use crate::resilience::circuit_breaker::CircuitState;

/// Record the outcome of one transport attempt.
///
/// `status` is `None` for network failures.
pub fn record_attempt(service: &str, outcome: &'static str, status: Option<u16>, elapsed: Duration) {
    let status = status.map_or_else(|| "network".to_string(), |s| s.to_string());
    counter!(
        "http_client_requests_total",
        "service" => service.to_string(),
        "outcome" => outcome,
        "status" => status
    )
    .increment(1);
    histogram!(
        "http_client_request_duration_seconds",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_retry(service: &str) {
    counter!("http_client_retries_total", "service" => service.to_string()).increment(1);
}

pub fn record_circuit_rejection(service: &str) {
    counter!("http_client_circuit_rejections_total", "service" => service.to_string()).increment(1);
}

pub fn record_circuit_state(service: &str, state: CircuitState) {
    let value = match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    };
    gauge!("http_client_circuit_state", "service" => service.to_string()).set(value);
}
