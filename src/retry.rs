//! Bounded retry with backoff for remote calls.
//!
//! Every remote call in the relay (listing pairs, fetching books, submitting
//! orders, pushing to Mesh) goes through [`attempt`]. Attempt numbering is
//! local to one call; nothing is shared between invocations.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};

/// How the delay between attempts grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// `interval * attempt + interval`, attempt numbered from 1.
    #[default]
    Linear,
    /// Always `interval`.
    Fixed,
}

/// Interval and attempt bound for [`attempt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);
    pub const DEFAULT_MAX_RETRIES: u32 = 20;

    #[must_use]
    pub const fn new(interval: Duration, max_retries: u32) -> Self {
        Self {
            interval,
            max_retries,
            backoff: Backoff::Linear,
        }
    }

    #[must_use]
    pub const fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay to wait after the given failed attempt (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Linear => self.interval.saturating_mul(attempt.saturating_add(1)),
            Backoff::Fixed => self.interval,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL, Self::DEFAULT_MAX_RETRIES)
    }
}

/// Run `op` until it succeeds or `policy.max_retries` attempts have failed.
///
/// A `max_retries` of zero still runs the operation once. There is no delay
/// after the final failure.
///
/// # Errors
///
/// Returns [`Error::RetryExhausted`] wrapping the error of the last attempt.
pub async fn attempt<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_retries = policy.max_retries.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(op = what, attempt, "Remote call recovered");
                }
                return Ok(value);
            }
            Err(err) if attempt >= max_retries => {
                error!(op = what, attempts = attempt, error = %err, "Giving up on remote call");
                return Err(Error::RetryExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }
            Err(err) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    op = what,
                    attempt,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Remote call failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(100), max_retries)
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_k_failures() {
        for k in 0..4 {
            let calls = AtomicU32::new(0);
            let value = attempt(&policy(5), "test", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < k {
                    Err(Error::Connection(format!("failure {n}")))
                } else {
                    Ok(n)
                }
            })
            .await
            .unwrap();

            assert_eq!(value, k);
            assert_eq!(calls.load(Ordering::SeqCst), k + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_retries_with_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = attempt(&policy(3), "test", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Connection(format!("failure {n}")))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(Error::RetryExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, Error::Connection(ref m) if m == "failure 2"));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_still_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = attempt(&policy(0), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Connection("down".into()))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(Error::RetryExhausted { attempts: 1, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_linear_backoff_between_attempts() {
        let start = tokio::time::Instant::now();
        let result: Result<()> = attempt(&policy(3), "test", || async {
            Err(Error::Connection("down".into()))
        })
        .await;

        assert!(result.is_err());
        // 200ms after attempt 1, 300ms after attempt 2, none after the last.
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn linear_delay_grows_with_attempt() {
        let p = policy(10);
        assert_eq!(p.delay_for(1), Duration::from_millis(200));
        assert_eq!(p.delay_for(2), Duration::from_millis(300));
        assert_eq!(p.delay_for(5), Duration::from_millis(600));
    }

    #[test]
    fn fixed_delay_is_constant() {
        let p = policy(10).with_backoff(Backoff::Fixed);
        assert_eq!(p.delay_for(1), Duration::from_millis(100));
        assert_eq!(p.delay_for(7), Duration::from_millis(100));
    }
}
