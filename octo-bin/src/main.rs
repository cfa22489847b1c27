//! `octo` runs HTTP requests in bulk, with rate limiting, bounded
//! concurrency, retries and backoff.
//!
//! The octo binary is a wrapper around octo-lib, which provides
//! convenience functions for calling octo from the command-line.
//!
//! Send the jobs of a file and print the results:
//! ```sh
//! octo -e -r 1000 -s 1 -j jobs.json
//! ```
//!
//! Read the jobs from stdin and save the results to a file:
//! ```sh
//! cat jobs.json | octo -r 1000 -s 1 -o done.json
//! ```
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

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Error, Result, bail};
use clap::Parser;
use formatters::log::init_logging;
use log::{error, info, warn};
use octo_lib::Engine;

mod formatters;
mod jobs;
mod options;
mod progress;
mod verbosity;
mod writer;

use crate::options::{Config, OCTO_CONFIG_FILE, OctoOptions};
use crate::progress::Progress;

/// A C-like enum that can be cast to `i32` and used as process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    // NOTE: exit code 1 is used for any `Result::Err` bubbled up to `main()`
    // using the `?` operator.
    #[allow(unused)]
    UnexpectedFailure = 1,
    RequestFailure = 2,
    ConfigFile = 3,
}

fn main() -> Result<()> {
    // std::process::exit doesn't run destructors,
    // therefore we wrap the main code in another function.
    let exit_code = run_main()?;
    std::process::exit(exit_code);
}

/// Merge all provided config options into one.
/// This includes a potential config file, command-line- and environment variables
fn load_config() -> Result<OctoOptions> {
    let mut opts = OctoOptions::parse();

    init_logging(&opts.config.verbose);

    // An explicitly given config file must exist, the default one is optional
    let config_file = match &opts.config_file {
        Some(path) => Some(path.clone()),
        None => Some(PathBuf::from(OCTO_CONFIG_FILE)).filter(|path| path.is_file()),
    };

    if let Some(config_file) = config_file {
        match Config::load_from_file(&config_file) {
            Ok(c) => opts.config.merge(c),
            Err(e) => {
                bail!(
                    "Cannot load configuration file `{}`: {e:?}",
                    config_file.display()
                );
            }
        }
    }

    Ok(opts)
}

/// Set up runtime and call octo entrypoint
fn run_main() -> Result<i32> {
    use std::process::exit;

    let opts = match load_config() {
        Ok(opts) => opts,
        Err(e) => {
            error!("Error while loading config: {e}");
            exit(ExitCode::ConfigFile as i32);
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;

    match runtime.block_on(run(&opts.config)) {
        Err(e) if Some(io::ErrorKind::BrokenPipe) == underlying_io_error_kind(&e) => {
            exit(ExitCode::Success as i32);
        }
        res => res,
    }
}

/// Check if the given error can be traced back to an `io::ErrorKind`
/// This is helpful for troubleshooting the root cause of an error.
/// Code is taken from the anyhow documentation.
fn underlying_io_error_kind(error: &Error) -> Option<io::ErrorKind> {
    for cause in error.chain() {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
    }
    None
}

/// Send every job and write the results
async fn run(config: &Config) -> Result<i32> {
    let engine = match Engine::new(config.engine_config()) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return Ok(ExitCode::ConfigFile as i32);
        }
    };

    let jobs = jobs::load(config.jobs.as_deref())?;
    if config.output.is_none() && !config.echo {
        warn!("Neither `--output` nor `--echo` is set, results will be discarded");
    }
    info!("Loaded {} jobs", jobs.len());

    let client = config.client()?;
    let progress = Arc::new(Progress::new(
        jobs.len(),
        config.no_progress || !io::stderr().is_terminal(),
    ));
    let outcomes = engine
        .with_observer(Arc::clone(&progress))
        .execute(jobs, client)
        .await?;

    let failed = outcomes.iter().filter(|outcome| outcome.is_failure()).count();
    progress.finish(failed);

    writer::write(&outcomes, config.output.as_deref(), config.echo)?;

    if failed > 0 {
        warn!("{failed} of {} requests failed", outcomes.len());
        return Ok(ExitCode::RequestFailure as i32);
    }
    Ok(ExitCode::Success as i32)
}
