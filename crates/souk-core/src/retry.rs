//! Bounded-backoff retries for one-shot reads
//!
//! Live subscriptions reconnect inside the backend client library; the core
//! never retries those. One-shot fetches are different: a listing screen or
//! conversation snapshot that fails on a flaky connection should quietly try
//! again a few times before giving up. This module is the single retry
//! helper shared by all of those reads.

use std::time::Duration;

/// Backoff policy for retried one-shot reads.
///
/// Delays grow exponentially from `base_delay`, doubling per attempt and
/// capped at `max_delay`. With the defaults the schedule is
/// 200 ms, 400 ms, 800 ms between the four attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    ///
    /// Default: 4
    pub max_attempts: u32,
    /// Delay before the second attempt.
    ///
    /// Default: 200 ms
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    ///
    /// Default: 5 s
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Create a new policy with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total number of attempts.
    ///
    /// # Panics
    ///
    /// Panics if `attempts` is 0.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        assert!(attempts > 0, "max_attempts must be greater than 0");
        self.max_attempts = attempts;
        self
    }

    /// Sets the delay before the second attempt.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the upper bound on any single delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// The delay to sleep after the given 1-based failed attempt
    fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Run `op` until it succeeds, the error is not retryable, or the policy's
/// attempts are exhausted. Returns the last result either way.
///
/// `retryable` decides which errors are worth another attempt; validation
/// and not-found errors should return `false` so they surface immediately.
pub async fn with_backoff<T, E, F>(
    policy: &RetryPolicy,
    mut op: F,
    retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(error) if attempt < policy.max_attempts && retryable(&error) => {
                let delay = policy.delay_after(attempt);
                tracing::debug!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "one-shot read failed, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
