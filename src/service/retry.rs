//! Bounded retry of whole transactions on optimistic-concurrency conflicts.

use std::future::Future;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::SwapError;

/// How often and how patiently a conflicting transaction is re-run.
///
/// Only [`SwapError::Conflict`] is retried; every other error is returned
/// on the first attempt. Backoff grows linearly with the attempt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` runs (at least one).
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Builds the policy from `SWAP_MAX_RETRIES` / `SWAP_RETRY_BACKOFF_MS`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.swap_max_retries,
            Duration::from_millis(config.swap_retry_backoff_ms),
        )
    }

    /// Maximum number of attempts.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// the attempts are exhausted.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `op`.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, SwapError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SwapError>>,
    {
        let mut attempt = 1_u32;
        loop {
            match op().await {
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(operation, attempt, error = %err, "transaction conflict, retrying");
                    tokio::time::sleep(self.backoff.saturating_mul(attempt)).await;
                    attempt += 1;
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(operation, attempt, error = %err, "transaction conflict, giving up");
                    return Err(err);
                }
                other => return other,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(20))
    }
}
