use std::io;

use http::StatusCode;

use crate::ErrorKind;

/// An extension trait to help determine if a failed attempt is transient
/// and therefore worth retrying.
///
/// Modified from `Retryable` in [reqwest-middleware].
///
/// [reqwest-middleware]: https://github.com/TrueLayer/reqwest-middleware/blob/f854725791ccf4a02c401a26cab3d9db753f468c/reqwest-retry/src/retryable.rs
pub trait RetryExt {
    /// Returns `true` if the failure is transient
    fn should_retry(&self) -> bool;
}

impl RetryExt for StatusCode {
    /// Any status outside of the 2xx range surfaced as an error is transient,
    /// 4xx included.
    fn should_retry(&self) -> bool {
        !self.is_success()
    }
}

impl RetryExt for reqwest::Error {
    #[allow(clippy::if_same_then_else)]
    fn should_retry(&self) -> bool {
        if self.is_builder() || self.is_redirect() || self.is_decode() {
            // The request itself is malformed, or the response can never be
            // understood. Sending it again will not change that.
            false
        } else if let Some(status) = self.status() {
            status.should_retry()
        } else if self.is_timeout() || self.is_connect() {
            true
        } else if self.is_request() || self.is_body() {
            // The connection was cut while sending the request or reading the
            // body. Dig for the underlying `io::Error` if there is one.
            get_source_error_type::<io::Error>(self).is_none_or(should_retry_io)
        } else {
            false
        }
    }
}

impl RetryExt for io::Error {
    fn should_retry(&self) -> bool {
        should_retry_io(self)
    }
}

impl RetryExt for ErrorKind {
    fn should_retry(&self) -> bool {
        match self {
            Self::NetworkRequest(e) => e.should_retry(),
            Self::RejectedStatusCode(status) => status.should_retry(),
            Self::Transport(_) => true,
            _ => false,
        }
    }
}

/// Classifies an [`io::Error`] into retryable or not.
fn should_retry_io(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut
            | io::ErrorKind::UnexpectedEof
    )
}

/// Downcasts the given err source into T.
fn get_source_error_type<T: std::error::Error + 'static>(
    err: &dyn std::error::Error,
) -> Option<&T> {
    let mut source = err.source();

    while let Some(err) = source {
        if let Some(found) = err.downcast_ref::<T>() {
            return Some(found);
        }

        source = err.source();
    }
    None
}
