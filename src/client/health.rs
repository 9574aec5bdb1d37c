//! Upstream health probing.
//!
//! # Responsibilities
//! - Probe the configured health path through the normal request path
//! - Report the outcome together with the breaker state
//!
//! # Design Decisions
//! - The probe is an ordinary `execute` call: it is gated by the breaker,
//!   retried like any request and counted in breaker statistics
//! - A short timeout override keeps probes cheap

use serde::Serialize;

use crate::client::executor::ResilientClient;
use crate::client::types::RequestSpec;
use crate::resilience::CircuitSnapshot;

/// Overall health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of a health probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub detail: String,
    pub circuit: CircuitSnapshot,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

impl ResilientClient {
    /// Probe the upstream's health endpoint.
    pub async fn health_check(&self) -> HealthReport {
        let path = self.config().health_path.clone();
        let spec = RequestSpec::get(path.clone()).timeout(self.config().health_timeout());

        let (status, detail) = match self.execute(spec).await {
            Ok(response) => (
                HealthStatus::Healthy,
                format!("{} responded with status {}", path, response.status),
            ),
            Err(error) => {
                tracing::warn!(
                    service = %self.config().service_name,
                    path = %path,
                    error = %error,
                    "Health check failed"
                );
                (HealthStatus::Unhealthy, error.to_string())
            }
        };

        HealthReport {
            status,
            detail,
            circuit: self.status(),
        }
    }
}
