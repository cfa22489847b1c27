//! Wait times between the attempts of a retried request.
//!
//! [`Backoff`] grows like a dampened Fibonacci sequence: each wait is the
//! previous one plus three quarters of the current one, so the growth factor
//! settles around 1.44 instead of the golden ratio. Waits still increase with
//! every retry, but escalate more slowly than a doubling or Fibonacci backoff.
//!
//! ```
//! use std::time::Duration;
//! use octo_lib::Backoff;
//!
//! let waits: Vec<_> = Backoff::new(Duration::from_secs(1)).take(4).collect();
//! assert_eq!(
//!     waits,
//!     [1.0, 2.0, 2.5, 3.875].map(Duration::from_secs_f64).to_vec()
//! );
//! ```

use std::time::Duration;

/// Damping applied to the current term when computing the next one
const DAMPING: f64 = 0.75;

/// Offset in seconds between the first and second term
const SECOND_TERM_OFFSET: f64 = 1.0;

/// Infinite sequence of wait durations for a single retrying request.
///
/// Every retrying request gets a fresh [`Backoff`]; the sequence never ends,
/// it is up to the caller to stop consuming it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    current: f64,
    next: f64,
}

impl Backoff {
    /// Start a new sequence whose first wait is `initial`
    #[must_use]
    pub fn new(initial: Duration) -> Self {
        let initial = initial.as_secs_f64();
        Self {
            current: initial,
            next: initial + SECOND_TERM_OFFSET,
        }
    }

    /// Return the next wait and advance the sequence
    pub fn next_wait(&mut self) -> Duration {
        let wait = self.current;
        (self.current, self.next) = (self.next, self.current + self.next * DAMPING);
        Duration::try_from_secs_f64(wait).unwrap_or(Duration::MAX)
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_wait())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
