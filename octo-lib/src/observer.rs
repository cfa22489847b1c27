//! Side-channel notifications about a running batch.
//!
//! Observers see every backoff and every finished request. They cannot
//! influence scheduling; both callbacks are invoked inline and should return
//! quickly.
use std::sync::Arc;
use std::time::Duration;

use crate::ErrorKind;

/// A failed attempt that is about to be retried
#[derive(Debug, Clone, Copy)]
pub struct BackoffEvent<'a> {
    /// Position of the request in the batch
    pub index: usize,
    /// Number of attempts made so far, starting at 1
    pub attempt: u32,
    /// How long the request waits before its next attempt
    pub wait: Duration,
    /// Why the last attempt failed
    pub error: &'a ErrorKind,
}

/// A request that reached a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Position of the request in the batch
    pub index: usize,
    /// Whether the request completed successfully
    pub success: bool,
    /// Number of requests finished so far, including this one
    pub completed: usize,
    /// Size of the batch
    pub total: usize,
}

/// Receives progress notifications from the engine
pub trait Observer: Send + Sync {
    /// Called before a unit of work sleeps ahead of its next attempt
    fn on_backoff(&self, _event: &BackoffEvent<'_>) {}

    /// Called once per request when it reaches a terminal state
    fn on_complete(&self, _completion: &Completion) {}
}

impl<O> Observer for Arc<O>
where
    O: Observer + ?Sized,
{
    fn on_backoff(&self, event: &BackoffEvent<'_>) {
        self.as_ref().on_backoff(event);
    }

    fn on_complete(&self, completion: &Completion) {
        self.as_ref().on_complete(completion);
    }
}

/// The default observer, which writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_backoff(&self, event: &BackoffEvent<'_>) {
        log::warn!(
            "Backing off {:.2}s after {} tries for request #{}: {}",
            event.wait.as_secs_f64(),
            event.attempt,
            event.index,
            event.error
        );
    }

    fn on_complete(&self, completion: &Completion) {
        log::debug!(
            "Request #{} finished ({}/{}){}",
            completion.index,
            completion.completed,
            completion.total,
            if completion.success { "" } else { " with a failure" }
        );
    }
}

/// An observer ignoring every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}
