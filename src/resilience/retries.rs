//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a failed attempt is retryable
//! - Compute the delay before the next attempt
//!
//! # Design Decisions
//! - Connection errors and timeouts always retryable until attempts run out
//! - Only transient statuses (408, 429, 500, 502, 503, 504) are retried
//! - Every other status is terminal, whatever the attempt index
//! - Backoff is deterministic unless jitter is switched on

use std::time::Duration;

use crate::client::types::ClientError;
use crate::config::ClientConfig;
use crate::resilience::backoff::{calculate_backoff, with_jitter};

/// HTTP statuses worth another attempt.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Return true if the status is in the transient set.
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Return true if the error class is retry-eligible, ignoring the attempt budget.
pub fn is_retryable(error: &ClientError) -> bool {
    match error {
        ClientError::Network(_) => true,
        ClientError::Http { status, .. } => is_retryable_status(*status),
        ClientError::CircuitOpen { .. }
        | ClientError::ExhaustedRetries { .. }
        | ClientError::InvalidRequest(_) => false,
    }
}

/// Retry budget and backoff settings for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub jitter: bool,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            jitter: false,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_delay(),
            jitter: config.retry_jitter,
        }
    }

    /// Decide whether the attempt at `attempt` (0-based) should be retried.
    pub fn should_retry(&self, error: &ClientError, attempt: u32) -> bool {
        attempt < self.max_retries && is_retryable(error)
    }

    /// Delay to wait after the failed attempt at `attempt`.
    pub fn compute_backoff(&self, attempt: u32) -> Duration {
        let delay = calculate_backoff(attempt, self.base_delay);
        if self.jitter {
            with_jitter(delay)
        } else {
            delay
        }
    }
}
