#![allow(unreachable_pub)]

mod error;
mod job;
mod outcome;

pub use error::ErrorKind;
pub use job::{Job, JobResponse};
pub use outcome::{Failure, FailureReason, Outcome};

/// The octo `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;
