// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bounded retry with exponential backoff for provider calls.
//!
//! Transient provider errors (connection failures, timeouts, HTTP 429/5xx) are retried
//! a fixed number of times with growing, jittered delays. Permanent errors fail
//! immediately.

use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::dns_errors::ProviderError;

/// Maximum interval between retries (5 seconds)
const MAX_INTERVAL_SECS: u64 = 5;

/// Backoff multiplier (exponential growth factor)
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Randomization factor to prevent thundering herd (±10%)
const RANDOMIZATION_FACTOR: f64 = 0.1;

/// Simple exponential backoff implementation.
///
/// Provides exponential backoff with randomization (jitter) to prevent thundering herd.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Current interval duration
    pub current_interval: Duration,
    /// Maximum interval duration
    pub max_interval: Duration,
    /// Backoff multiplier (typically 2.0 for doubling)
    pub multiplier: f64,
    /// Randomization factor (e.g., 0.1 for ±10%)
    pub randomization_factor: f64,
}

impl ExponentialBackoff {
    /// Create a backoff starting at `initial_interval` with the default growth settings.
    #[must_use]
    pub fn new(initial_interval: Duration) -> Self {
        Self {
            current_interval: initial_interval,
            max_interval: Duration::from_secs(MAX_INTERVAL_SECS).max(initial_interval),
            multiplier: BACKOFF_MULTIPLIER,
            randomization_factor: RANDOMIZATION_FACTOR,
        }
    }

    /// Get the next backoff interval and advance the schedule.
    pub fn next_backoff(&mut self) -> Duration {
        let interval = self.current_interval;
        let jittered = self.apply_jitter(interval);

        let next = interval.as_secs_f64() * self.multiplier;
        self.current_interval = Duration::from_secs_f64(next).min(self.max_interval);

        jittered
    }

    /// Apply randomization (jitter) to an interval.
    fn apply_jitter(&self, interval: Duration) -> Duration {
        if self.randomization_factor == 0.0 || interval.is_zero() {
            return interval;
        }

        let secs = interval.as_secs_f64();
        let delta = secs * self.randomization_factor;
        let min = secs - delta;
        let max = secs + delta;

        let jittered = rand::rng().random_range(min..=max);

        Duration::from_secs_f64(jittered.max(0.0))
    }
}

/// Outcome of a bounded retry loop that ran out of attempts or hit a permanent error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFailure {
    /// Number of attempts made
    pub attempts: u32,
    /// Last error observed
    pub error: ProviderError,
}

/// Retry a provider call up to `max_attempts` times.
///
/// Only errors for which [`ProviderError::is_transient`] holds are retried. The
/// delay before retry `n` is roughly `initial_interval * 2^(n-1)`, capped at 5s.
///
/// # Errors
///
/// Returns a [`RetryFailure`] with the last error once a permanent error occurs or
/// the attempt budget is exhausted.
pub async fn retry_provider_call<T, F, Fut>(
    mut operation: F,
    operation_name: &str,
    max_attempts: u32,
    initial_interval: Duration,
) -> Result<T, RetryFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut backoff = ExponentialBackoff::new(initial_interval);
    let start_time = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        elapsed = ?start_time.elapsed(),
                        "Provider call succeeded after retries"
                    );
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => {
                error!(
                    operation = operation_name,
                    error = %e,
                    "Non-retryable provider error, failing immediately"
                );
                return Err(RetryFailure {
                    attempts: attempt,
                    error: e,
                });
            }
            Err(e) if attempt >= max_attempts => {
                error!(
                    operation = operation_name,
                    attempt = attempt,
                    elapsed = ?start_time.elapsed(),
                    error = %e,
                    "Retry budget exhausted, giving up"
                );
                return Err(RetryFailure {
                    attempts: attempt,
                    error: e,
                });
            }
            Err(e) => {
                let duration = backoff.next_backoff();
                warn!(
                    operation = operation_name,
                    attempt = attempt,
                    retry_after = ?duration,
                    error = %e,
                    "Retryable provider error, will retry"
                );
                tokio::time::sleep(duration).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
