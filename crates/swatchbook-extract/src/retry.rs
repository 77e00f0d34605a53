//! Bounded retry with exponential backoff.
//!
//! Only failures the caller classifies as recoverable are retried; anything
//! else is returned on the first attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry (doubles each time).
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Retry configuration.
///
/// The delay before retry *n* (0-indexed attempt that just failed) is
/// `base_delay * 2^n`. Total attempts are at most `max_retries + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Backoff after the given 0-indexed attempt failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX)
    }

    /// Run `operation`, retrying while `is_recoverable` says so.
    pub async fn run<T, E, F, Fut, P>(&self, mut operation: F, is_recoverable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt >= self.max_retries {
                        debug!(attempts = attempt + 1, error = %e, "Retries exhausted");
                        return Err(e);
                    }
                    if !is_recoverable(&e) {
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Request hit a concurrency limit, backing off"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
