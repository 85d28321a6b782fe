//! Retry policy with exponential backoff.
//!
//! Plain failures wait `base * 2^attempt`; rate-limit failures wait
//! `base * 3^attempt + 2s`. `attempt` is zero-based and there is no wait
//! after the final attempt. Waiting goes through a [`Sleeper`] so tests can
//! record delays instead of sleeping.

use crate::error::{SheetsError, SheetsResult};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Extra wait added to every rate-limit backoff.
pub const RATE_LIMIT_PADDING: Duration = Duration::from_secs(2);

/// Something that can wait.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real waiting on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested waits and returns immediately.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: std::sync::Mutex<Vec<Duration>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(duration);
        }
    }
}

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &ks_core::config::RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs_f64(config.base_delay_secs.max(0.0)),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Whether `error` signals the remote rate limiter.
    ///
    /// True for [`SheetsError::RateLimited`], or when the message mentions
    /// a 429 status or a word starting with "rate".
    pub fn is_rate_limited(&self, error: &SheetsError) -> bool {
        if matches!(error, SheetsError::RateLimited(_)) {
            return true;
        }
        let message = error.message().to_lowercase();
        message.contains("429")
            || message
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word.starts_with("rate"))
    }

    /// Wait before retrying after failed attempt number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32, error: &SheetsError) -> Duration {
        let exponent = attempt.min(16) as i32;
        if self.is_rate_limited(error) {
            self.base_delay.mul_f64(3f64.powi(exponent)) + RATE_LIMIT_PADDING
        } else {
            self.base_delay.mul_f64(2f64.powi(exponent))
        }
    }

    /// Run `op` until it succeeds or attempts run out. `op` receives the
    /// 0-based attempt number. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, sleeper: &dyn Sleeper, label: &str, mut op: F) -> SheetsResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = SheetsResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        log::info!("{} succeeded on attempt {}", label, attempt + 1);
                    }
                    return Ok(value);
                }
                Err(err) if attempt + 1 >= self.max_attempts => {
                    log::warn!(
                        "{} failed after {} attempt(s): {}",
                        label,
                        self.max_attempts,
                        err
                    );
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.delay_for(attempt, &err);
                    log::warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:.1}s",
                        label,
                        attempt + 1,
                        self.max_attempts,
                        err,
                        delay.as_secs_f64()
                    );
                    sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;
