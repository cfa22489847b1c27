//! The execution function injected into the engine.
//!
//! The engine never looks inside a request. It hands every request of a batch
//! to an [`Executor`], which owns whatever transport it needs (for example a
//! pooled HTTP client) and reports either a value or an [`ErrorKind`].
//! Transient errors, as decided by [`RetryExt`](crate::RetryExt), are retried.
use std::future::Future;

use async_trait::async_trait;

use crate::Result;

/// Executes a single request of a batch
#[async_trait]
pub trait Executor<D>: Send + Sync
where
    D: Send + Sync,
{
    /// What a successful request produces
    type Output: Send;

    /// Run one attempt of `request`.
    ///
    /// This may be called several times for the same request when earlier
    /// attempts failed with a transient error.
    async fn execute(&self, request: &D) -> Result<Self::Output>;
}

/// Adapter turning an async closure into an [`Executor`].
///
/// The closure receives a clone of the request on every attempt.
///
/// ```
/// # use octo_lib::{ErrorKind, FnExecutor};
/// let executor = FnExecutor::new(|n: u32| async move {
///     if n == 0 {
///         Err(ErrorKind::InvalidRequest("zero".into()))
///     } else {
///         Ok(n * 2)
///     }
/// });
/// # let _ = executor;
/// ```
#[derive(Debug, Clone)]
pub struct FnExecutor<F> {
    func: F,
}

impl<F> FnExecutor<F> {
    /// Wrap `func`
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<D, F, Fut, T> Executor<D> for FnExecutor<F>
where
    D: Clone + Send + Sync + 'static,
    F: Fn(D) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn execute(&self, request: &D) -> Result<T> {
        (self.func)(request.clone()).await
    }
}
