//! Bounded polling with exponential backoff
//!
//! Used for remote state that becomes visible eventually (e.g. a pending
//! invitation). Only errors the operation marks as retryable are retried;
//! everything else aborts the loop on the spot.

use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Delay schedule between attempts
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay to wait after the given (zero-based) failed attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_secs_f64(delay).min(self.max_delay)
    }
}

/// Outcome of a single failed attempt
#[derive(Debug)]
pub enum RetryError<E> {
    /// Try again after a delay
    Retryable(E),
    /// Give up immediately
    NonRetryable(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Retryable(e) | RetryError::NonRetryable(e) => e,
        }
    }
}

/// Run `op` until it succeeds, fails non-retryably, or `timeout` elapses
///
/// At least one attempt is always made. When the budget runs out the last
/// retryable error is returned.
pub async fn retry<T, E, F, Fut>(timeout: Duration, config: &RetryConfig, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetryError<E>>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(RetryError::NonRetryable(e)) => return Err(e),
            Err(RetryError::Retryable(e)) => {
                let now = Instant::now();
                if now >= deadline {
                    tracing::debug!("Retry budget exhausted after {} attempts", attempt + 1);
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt).min(deadline - now);
                tracing::debug!(
                    "Attempt {} not ready, retrying in {:?}",
                    attempt + 1,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
