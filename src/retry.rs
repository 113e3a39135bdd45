use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Backoff policy shared by both fetch sites (issue search and changelog).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Cap on any single sleep, including server-supplied `Retry-After`.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after the given zero-based attempt.
    ///
    /// `Retry-After` wins when present; otherwise exponential
    /// `base_delay * 2^attempt`, capped at `max_delay`. Monotonically
    /// non-decreasing across attempts absent an override.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = match retry_after {
            Some(d) => d,
            None => self
                .base_delay
                .checked_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
                .unwrap_or(self.max_delay),
        };
        delay.min(self.max_delay)
    }
}

/// Run `op`, retrying transient failures with backoff.
///
/// Non-transient errors surface immediately. Once attempts are exhausted the
/// last transient error escalates to `RetriesExhausted`, which callers treat
/// as fatal for the whole run.
pub async fn with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() => {
                if attempt + 1 >= policy.max_attempts {
                    return Err(FetchError::RetriesExhausted {
                        attempts: policy.max_attempts,
                        source: Box::new(err),
                    });
                }
                let delay = policy.delay_for(attempt, err.retry_after());
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient error, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
