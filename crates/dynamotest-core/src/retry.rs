//! Bounded exponential backoff for readiness probing.
//!
//! [`retry`] is only used while a freshly started emulator warms up. It has no
//! notion of retryable versus fatal errors: every failure is retried until the
//! attempt budget runs out, and external cancellation is not observed.

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Exponential backoff with a capped delay and a capped attempt count.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay after the first failed attempt.
    pub initial_interval: Duration,
    /// Upper bound on any single delay.
    pub max_interval: Duration,
    /// Growth factor applied per failed attempt.
    pub multiplier: f64,
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            multiplier: 1.5,
            max_attempts: 20,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries immediately; handy in tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            multiplier: 1.0,
            max_attempts,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let scaled = self.initial_interval.as_secs_f64() * self.multiplier.powi(exponent);
        if !scaled.is_finite() || scaled >= self.max_interval.as_secs_f64() {
            return self.max_interval;
        }
        Duration::from_secs_f64(scaled.max(0.0))
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// The attempt budget ran out; carries the error from the final attempt.
#[derive(Debug, thiserror::Error)]
#[error("gave up after {attempts} attempt(s): {last}")]
pub struct RetryError<E> {
    pub attempts: u32,
    #[source]
    pub last: E,
}

/// Run `op` until it succeeds or `policy` is exhausted, sleeping between
/// attempts. `op` receives the 1-based attempt number and must rebuild any
/// state it needs, since a failed attempt's state is discarded.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(last) if attempt >= max_attempts => {
                return Err(RetryError { attempts: attempt, last });
            }
            Err(err) => {
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    attempt,
                    max_attempts,
                    error = %err,
                    "attempt failed, retrying in {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
