//! Throttling of request launches.
//!
//! A [`RateLimit`] is validated once, when the engine is built. Every run then
//! creates its own [`LaunchLimiter`], so no limiter state is shared between
//! runs or between engines.
//!
//! The limiter bounds how often units of work *start*, not how long they take
//! or how many run at once; that is the job of the scheduler.

mod limiter;
mod resolution;

pub(crate) use limiter::LaunchLimiter;
pub use resolution::Resolution;

use std::time::Duration;

use governor::Quota;

use crate::{ErrorKind, Result};

/// A validated launch rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    rate: f64,
    resolution: Resolution,
    quota: Quota,
}

impl RateLimit {
    /// Allow `rate` launches per `resolution`
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidRate`] if `rate` is not a positive number,
    /// so large that launches could not be spaced apart at all, or so small
    /// that the interval does not fit into 64 bits of nanoseconds.
    pub fn new(rate: f64, resolution: Resolution) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ErrorKind::InvalidRate(rate));
        }
        let interval = Duration::try_from_secs_f64(resolution.unit().as_secs_f64() / rate)
            .map_err(|_| ErrorKind::InvalidRate(rate))?;
        // The limiter keeps its interval as u64 nanoseconds
        if interval.as_nanos() > u128::from(u64::MAX) {
            return Err(ErrorKind::InvalidRate(rate));
        }
        let quota = Quota::with_period(interval).ok_or(ErrorKind::InvalidRate(rate))?;
        Ok(Self {
            rate,
            resolution,
            quota,
        })
    }

    /// Build a rate limit from loosely typed options.
    ///
    /// A rate and a resolution must be given together. Giving neither means
    /// launches are not throttled at all.
    ///
    /// # Errors
    ///
    /// Fails if only one of the two options is set, if the resolution is
    /// unknown, or if the rate is invalid.
    pub fn from_options(rate: Option<f64>, resolution: Option<&str>) -> Result<Option<Self>> {
        match (rate, resolution) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ErrorKind::RateWithoutResolution),
            (None, Some(resolution)) => {
                // Report a misspelled resolution before the missing rate
                Resolution::parse(resolution)?;
                Err(ErrorKind::ResolutionWithoutRate)
            }
            (Some(rate), Some(resolution)) => {
                Self::new(rate, Resolution::parse(resolution)?).map(Some)
            }
        }
    }

    /// Launches allowed per unit of time
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// The unit of time of [`RateLimit::rate`]
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Minimum time between two consecutive launches
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.quota.replenish_interval()
    }

    pub(crate) const fn quota(&self) -> Quota {
        self.quota
    }
}
