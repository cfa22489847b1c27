//! `octo` runs batches of requests concurrently.
//!
//! Every request of a batch is launched under a rate limit, runs with at most
//! `connections` other requests in flight, and is retried with a growing
//! backoff when it fails with a transient error. Outcomes come back in batch
//! order, with a [`Failure`] marker in place of every request which never
//! succeeded.
//!
//! Sending a batch of JSON `POST` requests:
//!
//! ```no_run
//! use octo_lib::{EngineConfig, Job, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let jobs = (1..=3)
//!       .map(|n| Job::new("http://127.0.0.1:8001".parse().unwrap(), json!({ "n": n })))
//!       .collect();
//!   let config = EngineConfig::builder().rate(200.0).resolution("minute").build();
//!
//!   for outcome in octo_lib::post_all(jobs, config).await? {
//!       println!("{outcome:?}");
//!   }
//!   Ok(())
//! }
//! ```
//!
//! Any async operation can be scheduled the same way by wrapping it in a
//! [`FnExecutor`], or by implementing [`Executor`] for your own client, and
//! running it with an [`Engine`].
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]
#![deny(missing_docs)]

mod backoff;
mod client;
mod collector;
mod config;
mod engine;
mod executor;
mod observer;
mod retry;
mod scheduler;
#[cfg(test)]
mod test_utils;
mod types;

pub mod ratelimit;

pub use backoff::Backoff;
pub use client::{ClientBuilder, DEFAULT_USER_AGENT, HttpClient, post_all};
pub use collector::ResultCollector;
pub use config::EngineConfig;
pub use engine::Engine;
pub use executor::{Executor, FnExecutor};
pub use observer::{BackoffEvent, Completion, LogObserver, NoopObserver, Observer};
pub use ratelimit::{RateLimit, Resolution};
pub use retry::{
    DEFAULT_MAX_RETRIES, DEFAULT_MAX_TIME_SECS, DEFAULT_RETRY_SLEEP_SECS, RetryExt, RetryPolicy,
};
pub use scheduler::DEFAULT_CONNECTIONS;
pub use types::*;
