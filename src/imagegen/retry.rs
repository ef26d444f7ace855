//! Retry pacing for rate-limited upstream calls.
//!
//! Linear backoff: the wait after attempt `n` is `n * base_delay`, so waits
//! strictly increase across a retry sequence.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per provider, including the first.
    pub max_attempts: u32,
    /// Backoff unit multiplied by the 1-based attempt number.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Backoff to wait after the given 1-based attempt failed.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(15),
        }
    }
}
