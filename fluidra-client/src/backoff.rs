//! Retry policy with exponential backoff and jitter

use std::time::Duration;

use rand::Rng;

/// Retry schedule for transient failures
///
/// The delay before retry `n` (zero-based) is `base · 2ⁿ`, capped at
/// `max_delay`, plus uniform random jitter in `[0, jitter_ceiling]`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first
    /// Default: 3
    pub max_attempts: u32,

    /// Delay before the first retry
    /// Default: 1 second
    pub base_delay: Duration,

    /// Cap on the exponential component
    /// Default: 30 seconds
    pub max_delay: Duration,

    /// Upper bound of the uniform jitter added to every delay
    /// Default: 500 milliseconds
    pub jitter_ceiling: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter_ceiling: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep before retry `retry_index` (0 for the first retry)
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        let exponent = retry_index.min(16);
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_delay);

        let jitter_ms = self.jitter_ceiling.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };

        exponential + jitter
    }
}
