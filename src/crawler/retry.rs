//! Bounded retry with exponential backoff
//!
//! The policy is independent of what is being retried: the operation reports
//! each failure as either worth retrying or final.

use crate::config::FetcherConfig;
use std::future::Future;
use std::time::Duration;

/// How a single failed attempt should be treated
#[derive(Debug)]
pub enum Attempt<E> {
    /// Transient failure; sleep and try again if attempts remain
    Retry(E),

    /// Permanent failure; stop immediately
    GiveUp(E),
}

/// Final failure after the policy stopped retrying
#[derive(Debug)]
pub struct RetryError<E> {
    /// Attempts actually made
    pub attempts: u32,

    /// Error from the last attempt
    pub last_error: E,
}

/// Max attempts plus `base * factor^attempt` backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(5),
            factor: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, factor: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            factor,
        }
    }

    pub fn from_config(config: &FetcherConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.base_backoff(),
            config.backoff_factor,
        )
    }

    /// Delay slept after the failed attempt numbered `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let multiplier = self.factor.saturating_pow(attempt);
        self.base_delay.saturating_mul(multiplier)
    }

    /// Total sleep before attempt `k` (0-based) is started
    pub fn cumulative_backoff(&self, k: u32) -> Duration {
        (0..k).map(|a| self.backoff(a)).sum()
    }

    /// Runs `op` until it succeeds, gives up, or attempts run out
    ///
    /// `op` receives the 0-based attempt number. There is no sleep after the
    /// final attempt.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, Attempt<E>>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(Attempt::GiveUp(last_error)) => {
                    return Err(RetryError {
                        attempts: attempt + 1,
                        last_error,
                    })
                }
                Err(Attempt::Retry(last_error)) => {
                    if attempt + 1 >= self.max_attempts {
                        return Err(RetryError {
                            attempts: attempt + 1,
                            last_error,
                        });
                    }
                    let delay = self.backoff(attempt);
                    tracing::debug!("Attempt {} failed, retrying in {:?}", attempt + 1, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
