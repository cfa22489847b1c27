//! `-v` and `-q` flags choosing how much `octo` logs.
//!
//! By default warnings and errors are shown, which includes every backoff.
//! - `-q` only shows errors, `-qq` silences output
//! - `-v` shows info, such as the run summary
//! - `-vv` shows debug, one line per launch and completion
//! - `-vvv` shows trace

use log::LevelFilter;

#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Verbosity {
    /// Pass many times for more log output
    ///
    /// By default, it'll report warnings and errors. Passing `-v` one time
    /// also prints info, `-vv` enables debug logging, and `-vvv` trace.
    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet",
    )]
    verbose: u8,

    /// Less output per occurrence
    #[arg(
        long,
        short = 'q',
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "verbose",
    )]
    quiet: u8,
}

impl Verbosity {
    /// Get the log level filter.
    pub(crate) fn log_level_filter(&self) -> LevelFilter {
        match self.verbosity() {
            i16::MIN..=-1 => LevelFilter::Off,
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn verbosity(&self) -> i16 {
        1 - i16::from(self.quiet) + i16::from(self.verbose)
    }
}

#[cfg(test)]
mod test {
    use clap::{CommandFactory, Parser};
    use log::LevelFilter;

    use super::Verbosity;

    #[derive(Debug, Parser)]
    struct Cli {
        #[clap(flatten)]
        verbose: Verbosity,
    }

    fn level(args: &[&str]) -> LevelFilter {
        Cli::try_parse_from(std::iter::once("octo").chain(args.iter().copied()))
            .unwrap()
            .verbose
            .log_level_filter()
    }

    #[test]
    fn verify_app() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(Verbosity::default().log_level_filter(), LevelFilter::Warn);
    }

    #[test]
    fn test_flags_shift_the_level() {
        assert_eq!(level(&["-v"]), LevelFilter::Info);
        assert_eq!(level(&["-vv"]), LevelFilter::Debug);
        assert_eq!(level(&["-vvvvv"]), LevelFilter::Trace);
        assert_eq!(level(&["-q"]), LevelFilter::Error);
        assert_eq!(level(&["-qq"]), LevelFilter::Off);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["octo", "-v", "-q"]).is_err());
    }
}
