//! Bounded concurrency for units of work.
//!
//! The [`Scheduler`] keeps the set of in-flight units in a
//! [`tokio::task::JoinSet`]. Before a launch, the caller waits for a free
//! slot; when the set is full this suspends until *any* unit finishes
//! (first completion wins, there is no fairness between units). Every finished
//! unit is handed back together with the batch index it was launched for.
use std::future::Future;
use std::num::NonZeroUsize;

use tokio::task::JoinSet;

use crate::{Outcome, Result};

/// Default number of units in flight at the same time, 5.
pub const DEFAULT_CONNECTIONS: usize = 5;

/// A unit of work which reached a terminal state
pub(crate) type Finished<T> = (usize, Outcome<T>);

/// Gate on the number of units of work in flight
#[derive(Debug)]
pub(crate) struct Scheduler<T> {
    in_flight: JoinSet<Finished<T>>,
    capacity: NonZeroUsize,
    peak: usize,
}

impl<T> Scheduler<T>
where
    T: Send + 'static,
{
    pub(crate) fn new(capacity: NonZeroUsize) -> Self {
        Self {
            in_flight: JoinSet::new(),
            capacity,
            peak: 0,
        }
    }

    /// Number of units currently in flight
    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Highest number of units that were in flight at once
    pub(crate) const fn peak_in_flight(&self) -> usize {
        self.peak
    }

    /// Suspend until fewer than `capacity` units are in flight.
    ///
    /// Units finishing while waiting are passed to `on_finished`.
    pub(crate) async fn wait_for_slot<F>(&mut self, mut on_finished: F) -> Result<()>
    where
        F: FnMut(Finished<T>) -> Result<()>,
    {
        while self.in_flight.len() >= self.capacity.get() {
            let Some(finished) = self.in_flight.join_next().await else {
                break;
            };
            on_finished(finished?)?;
        }
        Ok(())
    }

    /// Start a unit of work.
    ///
    /// Callers must wait for a slot first; launching into a full scheduler
    /// is a bug and is caught in debug builds.
    pub(crate) fn launch<F>(&mut self, unit: F)
    where
        F: Future<Output = Finished<T>> + Send + 'static,
    {
        debug_assert!(self.in_flight.len() < self.capacity.get());
        self.in_flight.spawn(unit);
        self.peak = self.peak.max(self.in_flight.len());
    }

    /// Wait for every unit still in flight, passing each to `on_finished`
    pub(crate) async fn drain<F>(&mut self, mut on_finished: F) -> Result<()>
    where
        F: FnMut(Finished<T>) -> Result<()>,
    {
        while let Some(finished) = self.in_flight.join_next().await {
            on_finished(finished?)?;
        }
        Ok(())
    }
}
