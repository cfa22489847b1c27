//! Retry transient failures of a single request.
//!
//! [`RetryPolicy::run`] makes at most `max_attempts` attempts, sleeping for
//! the next value of a fresh [`Backoff`] between attempts. The whole sequence
//! is bounded by a wall-clock budget: an attempt that is still running when the
//! budget runs out is abandoned, and no sleep is started that would end past
//! the budget.
use std::num::NonZeroU32;
use std::time::Duration;

use tokio::time::{Instant, sleep, timeout};

use crate::{
    Backoff, ErrorKind, Executor, Failure, FailureReason, Outcome,
    observer::{BackoffEvent, Observer},
};

mod ext;

pub use ext::RetryExt;

/// Default number of attempts per request, 3.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default first wait between attempts, 10 seconds.
pub const DEFAULT_RETRY_SLEEP_SECS: u64 = 10;
/// Default wall-clock budget per request, 10 minutes.
pub const DEFAULT_MAX_TIME_SECS: u64 = 60 * 10;

/// How a single request is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    initial_backoff: Duration,
    max_total_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: NonZeroU32::new(DEFAULT_MAX_RETRIES).unwrap_or(NonZeroU32::MIN),
            initial_backoff: Duration::from_secs(DEFAULT_RETRY_SLEEP_SECS),
            max_total_wait: Duration::from_secs(DEFAULT_MAX_TIME_SECS),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    #[must_use]
    pub const fn new(
        max_attempts: NonZeroU32,
        initial_backoff: Duration,
        max_total_wait: Duration,
    ) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_total_wait,
        }
    }

    /// Maximum number of attempts, including the first one
    #[must_use]
    pub const fn max_attempts(&self) -> NonZeroU32 {
        self.max_attempts
    }

    /// Seed of the backoff sequence
    #[must_use]
    pub const fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    /// Wall-clock budget across all attempts of one request
    #[must_use]
    pub const fn max_total_wait(&self) -> Duration {
        self.max_total_wait
    }

    /// Run `request` through `executor` until it succeeds, fails with a
    /// non-transient error, runs out of attempts, or runs out of time.
    ///
    /// `index` is only used to label notifications sent to `observer`.
    pub async fn run<D, E>(
        &self,
        index: usize,
        executor: &E,
        request: &D,
        observer: &dyn Observer,
    ) -> Outcome<E::Output>
    where
        D: Send + Sync,
        E: Executor<D> + ?Sized,
    {
        let start = Instant::now();
        let mut backoff = Backoff::new(self.initial_backoff);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let remaining = self.max_total_wait.saturating_sub(start.elapsed());

            let error = match timeout(remaining, executor.execute(request)).await {
                Ok(Ok(value)) => return Outcome::Completed(value),
                Ok(Err(error)) => error,
                Err(_) => {
                    log::debug!("Request #{index} abandoned after {:?}", self.max_total_wait);
                    return Outcome::Failed(Failure::new(
                        attempt,
                        FailureReason::DeadlineExceeded,
                        ErrorKind::DeadlineExceeded(self.max_total_wait),
                    ));
                }
            };

            if !error.should_retry() {
                log::debug!("Request #{index} failed permanently: {error}");
                return Outcome::Failed(Failure::new(
                    attempt,
                    FailureReason::NonRetryable,
                    error,
                ));
            }

            if attempt >= self.max_attempts.get() {
                return Outcome::Failed(Failure::new(attempt, FailureReason::Exhausted, error));
            }

            // A sleep that uses up the budget leaves no time for another attempt
            let wait = backoff.next_wait();
            if start.elapsed().saturating_add(wait) >= self.max_total_wait {
                return Outcome::Failed(Failure::new(
                    attempt,
                    FailureReason::DeadlineExceeded,
                    error,
                ));
            }

            observer.on_backoff(&BackoffEvent {
                index,
                attempt,
                wait,
                error: &error,
            });
            sleep(wait).await;
        }
    }
}
