use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Exponential backoff: `base * 2^attempt`, capped at `max_delay`.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let factor = 1u32 << (attempt.min(3) as u32);
        (self.base_delay * factor).min(self.max_delay)
    }
}

#[derive(Debug, Clone)]
pub struct RetryRunner {
    policy: RetryPolicy,
}

impl RetryRunner {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Runs `f` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `f` receives the zero-based attempt number.
    pub async fn run<F, Fut, T>(&self, mut f: F) -> Result<T, TransportError>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match f(attempt).await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if !e.is_retryable() || attempt + 1 >= max_attempts {
                        return Err(e);
                    }
                    let delay = self.policy.backoff(attempt);
                    tracing::debug!(attempt, ?delay, error = %e, "poll failed, retrying");
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
