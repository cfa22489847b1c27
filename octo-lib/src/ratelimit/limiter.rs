use governor::{
    RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};

use super::RateLimit;

/// Spaces out launches of a single run.
///
/// Uses a token bucket with a burst size of one: the first launch passes
/// immediately and each following launch waits until at least
/// [`RateLimit::interval`] has passed since the previous one.
#[derive(Debug)]
pub(crate) struct LaunchLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl LaunchLimiter {
    pub(crate) fn new(limit: &RateLimit) -> Self {
        Self {
            limiter: RateLimiter::direct(limit.quota()),
        }
    }

    /// Wait until the next launch is allowed
    pub(crate) async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }
}
