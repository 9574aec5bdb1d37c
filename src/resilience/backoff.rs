//! Exponential backoff with optional jitter.

use rand::Rng;
use std::time::Duration;

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Calculate the delay before retry number `attempt + 1`.
///
/// `base * 2^attempt`, saturating at `u64::MAX` milliseconds.
pub fn calculate_backoff(attempt: u32, base: Duration) -> Duration {
    let base_ms = duration_millis(base);
    let exponential_base = 2u64.saturating_pow(attempt);
    Duration::from_millis(base_ms.saturating_mul(exponential_base))
}

/// Add 0 to 10% random jitter to a delay.
pub fn with_jitter(delay: Duration) -> Duration {
    let delay_ms = duration_millis(delay);
    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(delay_ms.saturating_add(jitter))
}
