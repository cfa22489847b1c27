use std::fmt::Display;

use serde::Serialize;
use strum::{Display as StrumDisplay, IntoStaticStr};

use crate::ErrorKind;

/// Why a unit of work stopped without a successful result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The execution function failed with an error that is not worth retrying
    NonRetryable,
    /// Every allowed attempt failed with a transient error
    Exhausted,
    /// The wall-clock budget of the request ran out
    DeadlineExceeded,
}

/// Terminal failure of a single request, kept in the output in place of a result
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Failure {
    /// Number of attempts that were started
    pub attempts: u32,
    /// Why no further attempt was made
    pub reason: FailureReason,
    /// The last error seen for this request
    pub error: ErrorKind,
}

impl Failure {
    #[must_use]
    /// Create a new failure marker
    pub const fn new(attempts: u32, reason: FailureReason, error: ErrorKind) -> Self {
        Self {
            attempts,
            reason,
            error,
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} after {} attempt{}: {}",
            self.reason,
            self.attempts,
            if self.attempts == 1 { "" } else { "s" },
            self.error
        )
    }
}

/// The result of one request of a batch.
///
/// A batch of `n` requests always produces `n` outcomes, in input order.
/// Requests which never succeeded are reported as [`Outcome::Failed`]
/// rather than dropped, so the position of every input stays visible.
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    /// Whatever the execution function returned
    Completed(T),
    /// The request reached a terminal failure
    Failed(Failure),
}

impl<T> Outcome<T> {
    #[inline]
    #[must_use]
    /// Returns `true` if the request completed successfully
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    #[inline]
    #[must_use]
    /// Returns `true` if the request reached a terminal failure
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    #[must_use]
    /// The successful value, if any
    pub const fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    /// The failure marker, if any
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    /// Convert into a `Result`, dropping the marker semantics
    ///
    /// # Errors
    ///
    /// Returns the [`Failure`] if the request did not complete
    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Failed(failure) => Err(failure),
        }
    }
}
