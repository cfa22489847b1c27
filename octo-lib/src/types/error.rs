use http::StatusCode;
use serde::{Serialize, Serializer};
use std::hash::Hash;
use std::time::Duration;
use thiserror::Error;

/// Possible errors when running a batch with `octo_lib`
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A rate was given but no time resolution for it
    #[error("A rate was set without a resolution. Use `second` or `minute`")]
    RateWithoutResolution,

    /// A resolution was given but no rate to apply it to
    #[error("Can not set the resolution of a rate without a rate")]
    ResolutionWithoutRate,

    /// The resolution is not one of the known time units
    #[error("Incorrect value of resolution `{0}`, expecting `second` or `minute`")]
    InvalidResolution(String),

    /// The rate must be a finite, positive number
    #[error("Invalid rate {0}, expecting a positive number of requests")]
    InvalidRate(f64),

    /// At least one connection is needed to make progress
    #[error("The number of connections must be at least 1")]
    ZeroConnections,

    /// At least one attempt must be made for every request
    #[error("The number of retries must be at least 1")]
    ZeroRetries,

    /// The wall-clock ceiling per request must leave room for one attempt
    #[error("The maximum time per request must be greater than zero")]
    ZeroMaxTime,

    /// Network error while sending a request or reading its response
    #[error("Network error: {0}")]
    NetworkRequest(#[source] reqwest::Error),

    /// The server answered with a status code outside of the 2xx range
    #[error("Rejected status code: {0}")]
    RejectedStatusCode(StatusCode),

    /// A transient failure reported by a custom execution function.
    /// Requests failing with this error are retried.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A permanent failure reported by a custom execution function.
    /// Requests failing with this error are never retried.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request payload could not be encoded
    #[error("Cannot encode request payload")]
    InvalidPayload(#[from] serde_json::Error),

    /// A header name or value of a job could not be used
    #[error("Invalid header `{0}`")]
    InvalidHeader(String),

    /// The HTTP client could not be built
    #[error("Failed to build the HTTP client: {0}")]
    BuildClient(#[source] reqwest::Error),

    /// The wall-clock budget of a request ran out during an attempt
    #[error("Request did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    /// An outcome was recorded for an index outside of the batch.
    /// This points to a bug in the scheduler.
    #[error("Outcome recorded for index {index}, but the batch only has {len} requests")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Size of the batch
        len: usize,
    },

    /// An outcome was recorded twice for the same index.
    /// This points to a bug in the scheduler.
    #[error("Outcome for index {0} was recorded twice")]
    DuplicateOutcome(usize),

    /// No outcome was recorded for an index once the batch finished.
    /// This points to a bug in the scheduler.
    #[error("No outcome was recorded for index {0}")]
    MissingOutcome(usize),

    /// A unit of work was cancelled before it could report its outcome
    #[error("A unit of work was cancelled before finishing")]
    UnitCancelled,
}

impl ErrorKind {
    /// Returns `true` if this error comes from an invalid engine configuration
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::RateWithoutResolution
                | Self::ResolutionWithoutRate
                | Self::InvalidResolution(_)
                | Self::InvalidRate(_)
                | Self::ZeroConnections
                | Self::ZeroRetries
                | Self::ZeroMaxTime
        )
    }

    /// Return the underlying `reqwest` error, if any
    #[must_use]
    pub const fn reqwest_error(&self) -> Option<&reqwest::Error> {
        match self {
            Self::NetworkRequest(e) | Self::BuildClient(e) => Some(e),
            _ => None,
        }
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NetworkRequest(e1), Self::NetworkRequest(e2))
            | (Self::BuildClient(e1), Self::BuildClient(e2)) => e1.to_string() == e2.to_string(),
            (Self::InvalidPayload(e1), Self::InvalidPayload(e2)) => {
                e1.to_string() == e2.to_string()
            }
            (Self::RejectedStatusCode(c1), Self::RejectedStatusCode(c2)) => c1 == c2,
            (Self::InvalidResolution(s1), Self::InvalidResolution(s2))
            | (Self::Transport(s1), Self::Transport(s2))
            | (Self::InvalidRequest(s1), Self::InvalidRequest(s2))
            | (Self::InvalidHeader(s1), Self::InvalidHeader(s2)) => s1 == s2,
            (Self::InvalidRate(r1), Self::InvalidRate(r2)) => r1.to_bits() == r2.to_bits(),
            (Self::DeadlineExceeded(d1), Self::DeadlineExceeded(d2)) => d1 == d2,
            (
                Self::IndexOutOfRange { index: i1, len: l1 },
                Self::IndexOutOfRange { index: i2, len: l2 },
            ) => i1 == i2 && l1 == l2,
            (Self::DuplicateOutcome(i1), Self::DuplicateOutcome(i2))
            | (Self::MissingOutcome(i1), Self::MissingOutcome(i2)) => i1 == i2,
            (Self::RateWithoutResolution, Self::RateWithoutResolution)
            | (Self::ResolutionWithoutRate, Self::ResolutionWithoutRate)
            | (Self::ZeroConnections, Self::ZeroConnections)
            | (Self::ZeroRetries, Self::ZeroRetries)
            | (Self::ZeroMaxTime, Self::ZeroMaxTime)
            | (Self::UnitCancelled, Self::UnitCancelled) => true,
            _ => false,
        }
    }
}

impl Eq for ErrorKind {}

impl Hash for ErrorKind {
    fn hash<H>(&self, state: &mut H)
    where
        H: std::hash::Hasher,
    {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::NetworkRequest(e) | Self::BuildClient(e) => e.to_string().hash(state),
            Self::InvalidPayload(e) => e.to_string().hash(state),
            Self::RejectedStatusCode(c) => c.hash(state),
            Self::InvalidResolution(s)
            | Self::Transport(s)
            | Self::InvalidRequest(s)
            | Self::InvalidHeader(s) => s.hash(state),
            Self::InvalidRate(r) => r.to_bits().hash(state),
            Self::DeadlineExceeded(d) => d.hash(state),
            Self::IndexOutOfRange { index, len } => (index, len).hash(state),
            Self::DuplicateOutcome(i) | Self::MissingOutcome(i) => i.hash(state),
            Self::RateWithoutResolution
            | Self::ResolutionWithoutRate
            | Self::ZeroConnections
            | Self::ZeroRetries
            | Self::ZeroMaxTime
            | Self::UnitCancelled => {}
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl From<tokio::task::JoinError> for ErrorKind {
    fn from(e: tokio::task::JoinError) -> Self {
        if e.is_panic() {
            // Re-raise the panic of a unit of work on the driving task
            std::panic::resume_unwind(e.into_panic());
        }
        Self::UnitCancelled
    }
}
