use crate::error::{LedgerError, Result};
use std::future::Future;
use std::time::Duration;

/// Bounded exponential-backoff retry for transient serialization conflicts.
///
/// Every attempt is a fresh storage transaction; the previous attempt has
/// already rolled back, so retrying can never double-apply an operation.
/// Definitive errors pass through untouched on the first occurrence.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(10),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the attempt after `attempt` (0-based):
    /// `base_delay * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Runs `op` until it succeeds, fails definitively, or the attempt
    /// bound is exhausted, in which case `TooManyRetries` is returned.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for attempt in 0..self.max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(LedgerError::TransientConflict) => {
                    let backoff = self.backoff(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        "serialization conflict, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
        Err(LedgerError::TooManyRetries)
    }
}
