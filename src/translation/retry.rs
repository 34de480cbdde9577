/*!
 * Bounded exponential-backoff retry for provider calls.
 */

use async_trait::async_trait;
use log::{debug, error, warn};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use crate::app_config::RetryConfig;
use crate::errors::{ProviderError, TranslationError};

/// Upper bound for a single backoff delay
const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Suspends the calling task between attempts
#[async_trait]
pub trait BackoffSleeper: Send + Sync + Debug {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl BackoffSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that records requested delays and returns immediately
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }
}

#[async_trait]
impl BackoffSleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
    }
}

/// How often and how patiently a provider call is retried
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, at least 1
    max_retries: u32,
    /// Delay before the second attempt
    initial_backoff: Duration,
    /// Multiplier applied to the delay after every failed attempt
    backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(2),
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a policy; `max_retries` is clamped to at least one attempt
    /// and `backoff_factor` to at least 1.0
    pub fn new(max_retries: u32, initial_backoff: Duration, backoff_factor: f64) -> Self {
        let backoff_factor = if backoff_factor.is_finite() && backoff_factor >= 1.0 {
            backoff_factor
        } else {
            1.0
        };
        Self {
            max_retries: max_retries.max(1),
            initial_backoff: initial_backoff.min(MAX_BACKOFF),
            backoff_factor,
        }
    }

    /// Build a policy from the retry section of the configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.initial_backoff_ms),
            config.backoff_factor,
        )
    }

    /// A policy that tries exactly once
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    /// Total number of attempts
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before the second attempt
    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    /// Backoff multiplier
    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    fn next_backoff(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }

    /// Run `operation` until it succeeds or the attempts are used up
    ///
    /// Attempts are strictly sequential. After the last failed attempt the
    /// final error is returned as `TranslationError::RetriesExhausted`.
    pub async fn execute<T, F, Fut>(
        &self,
        provider: &str,
        sleeper: &dyn BackoffSleeper,
        mut operation: F,
    ) -> Result<T, TranslationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Provider '{}' succeeded on attempt {}", provider, attempt);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        error!(
                            "Max retries ({}) exceeded for provider '{}': {}",
                            self.max_retries, provider, e
                        );
                        return Err(TranslationError::RetriesExhausted {
                            provider: provider.to_string(),
                            attempts: attempt,
                            source: e,
                        });
                    }

                    warn!(
                        "Retry {}/{} for provider '{}' after error: {}",
                        attempt, self.max_retries, provider, e
                    );
                    warn!("Backing off for {:.2} seconds", backoff.as_secs_f64());
                    sleeper.sleep(backoff).await;
                    backoff = self.next_backoff(backoff);
                }
            }
        }
    }
}
