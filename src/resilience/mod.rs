//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → circuit_breaker.rs (gate check, fail fast when open)
//!     → timeouts.rs (enforce per-attempt timeout)
//!     → On failure: retries.rs (check if retryable, compute delay)
//!     → backoff.rs (exponential delay, optional jitter)
//!     → circuit_breaker.rs (record outcome, open circuit if threshold exceeded)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Only transient failures are retried
//! - Circuit breaker prevents cascading failures
//! - Each piece is a plain value the client composes explicitly

pub mod backoff;
pub mod circuit_breaker;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{
    CircuitBreaker, CircuitSnapshot, CircuitState, Permit, PermitGuard, Transition,
};
pub use retries::{is_retryable, is_retryable_status, RetryPolicy, RETRYABLE_STATUSES};
