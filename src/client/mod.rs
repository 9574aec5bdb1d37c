//! Resilient client subsystem.
//!
//! # Data Flow
//! ```text
//! Caller (business logic)
//!     → executor.rs (correlation ID, gate check, attempt loop)
//!         → security (sanitized copies for the log records)
//!         → transport (one call per attempt, bounded by timeout)
//!         → resilience (retry decision, backoff, breaker outcome)
//!         → observability (log sink + metrics per attempt)
//!     ← Response or typed ClientError
//!
//! health.rs composes execute + breaker status into a HealthReport.
//! ```

pub mod attempt;
pub mod executor;
pub mod health;
pub mod types;

pub use attempt::{AttemptOutcome, AttemptRecord};
pub use executor::ResilientClient;
pub use health::{HealthReport, HealthStatus};
pub use types::{ClientError, ClientResult, CorrelationId, NetworkError, RequestSpec, Response};
