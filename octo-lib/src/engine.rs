//! The execution engine.
//!
//! [`Engine::execute`] runs a batch of requests under three constraints at
//! once: a rate limit on launches, a cap on requests in flight, and a retry
//! policy per request. Launches follow batch order, completions happen in any
//! order, and outcomes are returned in batch order.
//!
//! ```
//! use octo_lib::{Engine, EngineConfig, ErrorKind, FnExecutor, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let engine = Engine::new(EngineConfig::builder().connections(2).build())?;
//!     let executor = FnExecutor::new(|n: u64| async move { Ok::<_, ErrorKind>(n * n) });
//!
//!     let outcomes = engine.execute(vec![1, 2, 3], executor).await?;
//!     let squares: Vec<_> = outcomes.into_iter().filter_map(|o| o.into_result().ok()).collect();
//!     assert_eq!(squares, vec![1, 4, 9]);
//!     Ok(())
//! }
//! ```
use std::fmt::Debug;
use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;

use crate::collector::ResultCollector;
use crate::observer::{Completion, LogObserver, Observer};
use crate::ratelimit::{LaunchLimiter, RateLimit};
use crate::retry::RetryPolicy;
use crate::scheduler::{Finished, Scheduler};
use crate::{EngineConfig, ErrorKind, Executor, Outcome, Result};

/// Runs batches of requests. See the [module documentation](self).
///
/// An engine holds validated configuration only. No state is carried from one
/// [`Engine::execute`] call to the next, so independent engines with different
/// policies can run side by side.
#[derive(Clone)]
pub struct Engine {
    rate_limit: Option<RateLimit>,
    connections: NonZeroUsize,
    retry: RetryPolicy,
    observer: Arc<dyn Observer>,
}

impl Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("rate_limit", &self.rate_limit)
            .field("connections", &self.connections)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Validate `config` and build an engine from it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `rate` and `resolution` are not set
    /// together, if the resolution is unknown, or if `connections`, `retries`
    /// or `max_time` is zero.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let rate_limit = RateLimit::from_options(config.rate, config.resolution.as_deref())?;
        let connections =
            NonZeroUsize::new(config.connections).ok_or(ErrorKind::ZeroConnections)?;
        let max_attempts = NonZeroU32::new(config.retries).ok_or(ErrorKind::ZeroRetries)?;
        if config.max_time.is_zero() {
            return Err(ErrorKind::ZeroMaxTime);
        }

        Ok(Self {
            rate_limit,
            connections,
            retry: RetryPolicy::new(max_attempts, config.retry_sleep, config.max_time),
            observer: Arc::new(LogObserver),
        })
    }

    /// Replace the default [`LogObserver`]
    #[must_use]
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: Observer + 'static,
    {
        self.observer = Arc::new(observer);
        self
    }

    /// The launch rate limit, if any
    #[must_use]
    pub const fn rate_limit(&self) -> Option<&RateLimit> {
        self.rate_limit.as_ref()
    }

    /// Maximum number of requests in flight
    #[must_use]
    pub const fn connections(&self) -> NonZeroUsize {
        self.connections
    }

    /// How each request is retried
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run every request of `batch` through `executor`.
    ///
    /// Returns one [`Outcome`] per request, in batch order. A request that
    /// fails terminally is reported as [`Outcome::Failed`] in its slot and
    /// never affects the other requests.
    ///
    /// # Errors
    ///
    /// Only fails on internal inconsistencies (an outcome recorded twice or
    /// missing) or if a unit of work was cancelled by the runtime. A panic
    /// in `executor` is re-raised on the calling task.
    pub async fn execute<D, E>(&self, batch: Vec<D>, executor: E) -> Result<Vec<Outcome<E::Output>>>
    where
        D: Send + Sync + 'static,
        E: Executor<D> + 'static,
        E::Output: 'static,
    {
        let total = batch.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let executor = Arc::new(executor);
        let limiter = self.rate_limit.as_ref().map(LaunchLimiter::new);
        let mut scheduler = Scheduler::new(self.connections);
        let mut run = RunState::new(total, self.observer.as_ref());

        for (index, request) in batch.into_iter().enumerate() {
            scheduler.wait_for_slot(|finished| run.finish(finished)).await?;
            if let Some(limiter) = &limiter {
                limiter.until_ready().await;
            }

            log::debug!("Launching request #{index}");
            let executor = Arc::clone(&executor);
            let observer = Arc::clone(&self.observer);
            let retry = self.retry;
            scheduler.launch(async move {
                let outcome = retry
                    .run(index, executor.as_ref(), &request, observer.as_ref())
                    .await;
                (index, outcome)
            });
        }

        scheduler.drain(|finished| run.finish(finished)).await?;

        log::info!(
            "Finished {total} requests ({} failed), at most {} in flight",
            run.failed,
            scheduler.peak_in_flight()
        );
        run.collector.drain()
    }
}

/// State of one [`Engine::execute`] call
struct RunState<'a, T> {
    collector: ResultCollector<T>,
    observer: &'a dyn Observer,
    failed: usize,
}

impl<'a, T> RunState<'a, T> {
    fn new(total: usize, observer: &'a dyn Observer) -> Self {
        Self {
            collector: ResultCollector::new(total),
            observer,
            failed: 0,
        }
    }

    fn finish(&mut self, (index, outcome): Finished<T>) -> Result<()> {
        let success = outcome.is_success();
        if let Some(failure) = outcome.failure() {
            log::warn!("Request #{index} failed: {failure}");
            self.failed += 1;
        }
        self.collector.record(index, outcome)?;
        self.observer.on_complete(&Completion {
            index,
            success,
            completed: self.collector.completed(),
            total: self.collector.len(),
        });
        Ok(())
    }
}
