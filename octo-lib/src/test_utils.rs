use std::fmt::Display;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::observer::{BackoffEvent, Completion, Observer};
use crate::{ErrorKind, Executor, Result};

/// Fails the first `failures` calls, then echoes the request back
#[derive(Debug)]
pub(crate) struct FlakyExecutor {
    failures: u32,
    transient: bool,
    calls: AtomicU32,
}

impl FlakyExecutor {
    /// Fail with a retryable error
    pub(crate) const fn transient(failures: u32) -> Self {
        Self {
            failures,
            transient: true,
            calls: AtomicU32::new(0),
        }
    }

    /// Fail with an error that is never retried
    pub(crate) const fn permanent(failures: u32) -> Self {
        Self {
            failures,
            transient: false,
            calls: AtomicU32::new(0),
        }
    }

    /// Number of attempts made so far
    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<D> Executor<D> for FlakyExecutor
where
    D: Display + Send + Sync,
{
    type Output = String;

    async fn execute(&self, request: &D) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call > self.failures {
            Ok(request.to_string())
        } else if self.transient {
            Err(ErrorKind::Transport("flaky".into()))
        } else {
            Err(ErrorKind::InvalidRequest("flaky".into()))
        }
    }
}

/// Never finishes an attempt
#[derive(Debug)]
pub(crate) struct HangingExecutor;

#[async_trait]
impl<D> Executor<D> for HangingExecutor
where
    D: Send + Sync,
{
    type Output = ();

    async fn execute(&self, _request: &D) -> Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Remembers every notification it receives
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    backoffs: Mutex<Vec<(usize, u32, Duration)>>,
    completions: Mutex<Vec<Completion>>,
}

impl RecordingObserver {
    /// `(index, attempt, wait)` of every backoff, in notification order
    pub(crate) fn backoffs(&self) -> Vec<(usize, u32, Duration)> {
        self.backoffs.lock().unwrap().clone()
    }

    /// Every completion, in notification order
    pub(crate) fn completions(&self) -> Vec<Completion> {
        self.completions.lock().unwrap().clone()
    }
}

impl Observer for RecordingObserver {
    fn on_backoff(&self, event: &BackoffEvent<'_>) {
        self.backoffs
            .lock()
            .unwrap()
            .push((event.index, event.attempt, event.wait));
    }

    fn on_complete(&self, completion: &Completion) {
        self.completions.lock().unwrap().push(*completion);
    }
}
