use crate::verbosity::Verbosity;
use anyhow::{Context, Result};
use clap::Parser;
use const_format::{concatcp, formatcp};
use octo_lib::{ClientBuilder, DEFAULT_USER_AGENT, EngineConfig, HttpClient, Resolution};
use serde::Deserialize;
use std::path::Path;
use std::{fs, path::PathBuf, time::Duration};

pub(crate) const OCTO_CONFIG_FILE: &str = "octo.toml";

const DEFAULT_RPM: u32 = 200;
const DEFAULT_TRIES: u32 = 10;
const DEFAULT_SLEEP_SECS: u64 = 10;
const DEFAULT_MAX_TIME_SECS: u64 = octo_lib::DEFAULT_MAX_TIME_SECS;
const DEFAULT_CONNECTIONS: usize = 10;

// clap requires `&str` type values for defaults
// whereas serde expects functions returning owned values
const RPM_STR: &str = concatcp!(DEFAULT_RPM);
const TRIES_STR: &str = concatcp!(DEFAULT_TRIES);
const SLEEP_STR: &str = concatcp!(DEFAULT_SLEEP_SECS);
const MAX_TIME_STR: &str = concatcp!(DEFAULT_MAX_TIME_SECS);
const CONNECTIONS_STR: &str = concatcp!(DEFAULT_CONNECTIONS);
// Show the default config file, while still being able to tell whether the
// user asked for one. A missing default file is not an error.
const HELP_MSG_CONFIG_FILE: &str = formatcp!(
    "Configuration file to use\n\n[default: {}]",
    OCTO_CONFIG_FILE,
);

// Macro for generating default functions to be used by serde
macro_rules! default_function {
    ( $( $name:ident : $T:ty = $e:expr; )* ) => {
        $(
            #[allow(clippy::missing_const_for_fn)]
            fn $name() -> $T {
                $e
            }
        )*
    };
}

// Generate the functions for serde defaults
default_function! {
    rpm: u32 = DEFAULT_RPM;
    tries: u32 = DEFAULT_TRIES;
    sleep: u64 = DEFAULT_SLEEP_SECS;
    max_time: u64 = DEFAULT_MAX_TIME_SECS;
    connections: usize = DEFAULT_CONNECTIONS;
    user_agent: String = DEFAULT_USER_AGENT.to_string();
}

// Macro for merging configuration values
macro_rules! fold_in {
    ($cli:ident , $toml:ident ; $ty:ident { $(..$ignore:ident,)* $( $key:ident : $default:expr, )* } ) => {
        if (false) {
            #[allow(dead_code, unused, clippy::diverging_sub_expression)]
            let _check_fold_in_exhaustivity = $ty {
                $($key: unreachable!(), )*
                $($ignore: unreachable!(), )*
            };
        };
        $(
            if $cli.$key == $default && $toml.$key != $default {
                $cli.$key = $toml.$key;
            }
        )*
    };
}

/// Run HTTP requests in bulk with rate limiting, retries and backoff.
///
/// Every job of the job list is sent as a `POST` request with its payload as
/// JSON body. The results are written as a JSON list in job order, with a
/// failure marker for every job which never succeeded.
#[derive(Parser, Debug)]
#[command(version, about, next_display_order = None)]
pub(crate) struct OctoOptions {
    /// Configuration file to use
    #[arg(long = "config", env = "OCTO_CONFIG", value_name = "PATH")]
    #[arg(help = HELP_MSG_CONFIG_FILE)]
    pub(crate) config_file: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) config: Config,
}

/// The main configuration for octo
#[derive(Parser, Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Verbose program output
    #[clap(flatten)]
    #[serde(skip)]
    pub(crate) verbose: Verbosity,

    /// Path to a JSON file with the job list.
    #[arg(
        short,
        long,
        value_name = "PATH",
        long_help = "Path to a JSON file with the job list, or `-` for stdin.

Without this option, the job list is read from stdin, which must then be a
pipe or a file.

The job list is a JSON array of objects with the keys
- `url`: where to send the request to
- `payload`: any JSON value, sent as the request body
- `headers` (optional): an object of extra request headers

Example:

    [{\"url\": \"http://127.0.0.1:8001\", \"payload\": {\"title\": \"title number 1\"}}]"
    )]
    #[serde(default)]
    pub(crate) jobs: Option<PathBuf>,

    /// Echo results to stdout
    #[arg(short, long)]
    #[serde(default)]
    pub(crate) echo: bool,

    /// Path to save the results of the jobs
    #[arg(short, long, value_name = "PATH")]
    #[serde(default)]
    pub(crate) output: Option<PathBuf>,

    /// Requests per minute. `0` disables throttling
    #[arg(short, long, default_value = RPM_STR)]
    #[serde(default = "rpm")]
    pub(crate) rpm: u32,

    /// Maximum number of attempts per request
    #[arg(short, long, default_value = TRIES_STR)]
    #[serde(default = "tries")]
    pub(crate) tries: u32,

    /// Seconds to wait before the first retry.
    /// Later waits grow by roughly 1.44 each time
    #[arg(short, long, default_value = SLEEP_STR, verbatim_doc_comment)]
    #[serde(default = "sleep")]
    pub(crate) sleep: u64,

    /// Maximum number of seconds spent on a single request, retries included
    #[arg(short = 'x', long, default_value = MAX_TIME_STR)]
    #[serde(default = "max_time")]
    pub(crate) max_time: u64,

    /// Maximum number of requests in flight
    #[arg(short, long, default_value = CONNECTIONS_STR)]
    #[serde(default = "connections")]
    pub(crate) connections: usize,

    /// Timeout in seconds of a single attempt
    #[arg(long)]
    #[serde(default)]
    pub(crate) timeout: Option<u64>,

    /// User agent
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    #[serde(default = "user_agent")]
    pub(crate) user_agent: String,

    /// Do not show progress bar.
    /// This is recommended for non-interactive shells (e.g. for continuous integration)
    #[arg(long, verbatim_doc_comment)]
    #[serde(default)]
    pub(crate) no_progress: bool,
}

impl Config {
    /// Load configuration from a file
    pub(crate) fn load_from_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).with_context(|| "Failed to parse configuration file")
    }

    /// Merge the configuration from TOML into the CLI configuration.
    ///
    /// Values given on the command line win over values from the file.
    pub(crate) fn merge(&mut self, toml: Config) {
        fold_in! {
            // Destination and source configs
            self, toml;

            Config {
                // Only set on the command line
                ..verbose,

                jobs: None,
                echo: false,
                output: None,
                rpm: DEFAULT_RPM,
                tries: DEFAULT_TRIES,
                sleep: DEFAULT_SLEEP_SECS,
                max_time: DEFAULT_MAX_TIME_SECS,
                connections: DEFAULT_CONNECTIONS,
                timeout: None,
                user_agent: DEFAULT_USER_AGENT,
                no_progress: false,
            }
        }
    }

    /// Options of the execution engine.
    ///
    /// These are validated when the engine is built.
    pub(crate) fn engine_config(&self) -> EngineConfig {
        let throttled = self.rpm > 0;
        EngineConfig {
            rate: throttled.then_some(f64::from(self.rpm)),
            resolution: throttled.then(|| Resolution::Minute.to_string()),
            connections: self.connections,
            retries: self.tries,
            retry_sleep: Duration::from_secs(self.sleep),
            max_time: Duration::from_secs(self.max_time),
        }
    }

    /// The HTTP client sending the jobs
    pub(crate) fn client(&self) -> Result<HttpClient> {
        ClientBuilder::builder()
            .timeout(self.timeout.map(Duration::from_secs))
            .user_agent(self.user_agent.clone())
            .connections(self.connections)
            .build()
            .client()
            .context("Failed to create HTTP client")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use clap::{CommandFactory, Parser};
    use octo_lib::EngineConfig;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::{Config, OctoOptions};

    fn parse(args: &[&str]) -> OctoOptions {
        OctoOptions::try_parse_from(std::iter::once("octo").chain(args.iter().copied())).unwrap()
    }

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn verify_app() {
        OctoOptions::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let opts = parse(&[]);
        let config = &opts.config;
        assert_eq!(config.rpm, 200);
        assert_eq!(config.tries, 10);
        assert_eq!(config.sleep, 10);
        assert_eq!(config.max_time, 600);
        assert_eq!(config.connections, 10);
        assert_eq!(config.timeout, None);
        assert!(!config.echo);
        assert!(opts.config_file.is_none());
    }

    #[test]
    fn test_short_flags() {
        let opts = parse(&[
            "-j", "jobs.json", "-e", "-o", "done.json", "-r", "1000", "-t", "3", "-s", "1", "-x",
            "60", "-c", "4",
        ]);
        let config = opts.config;
        assert_eq!(config.jobs.unwrap().to_str(), Some("jobs.json"));
        assert!(config.echo);
        assert_eq!(config.output.unwrap().to_str(), Some("done.json"));
        assert_eq!(config.rpm, 1000);
        assert_eq!(config.tries, 3);
        assert_eq!(config.sleep, 1);
        assert_eq!(config.max_time, 60);
        assert_eq!(config.connections, 4);
    }

    #[test]
    fn test_engine_config() {
        let config = parse(&["--rpm", "120", "--tries", "4", "--sleep", "2"]).config;
        assert_eq!(
            config.engine_config(),
            EngineConfig {
                rate: Some(120.0),
                resolution: Some("minute".to_string()),
                connections: 10,
                retries: 4,
                retry_sleep: Duration::from_secs(2),
                max_time: Duration::from_secs(600),
            }
        );
    }

    #[test]
    fn test_zero_rpm_disables_throttling() {
        let engine_config = parse(&["--rpm", "0"]).config.engine_config();
        assert_eq!(engine_config.rate, None);
        assert_eq!(engine_config.resolution, None);
    }

    #[test]
    fn test_file_values_fill_in_defaults() {
        let file = config_file("rpm = 30\nconnections = 2\necho = true\n");
        let mut config = parse(&["--tries", "5"]).config;

        config.merge(Config::load_from_file(file.path()).unwrap());

        assert_eq!(config.rpm, 30);
        assert_eq!(config.connections, 2);
        assert!(config.echo);
        assert_eq!(config.tries, 5);
    }

    #[test]
    fn test_cli_values_win_over_file_values() {
        let file = config_file("rpm = 30\ntries = 2\n");
        let mut config = parse(&["--rpm", "90"]).config;

        config.merge(Config::load_from_file(file.path()).unwrap());

        assert_eq!(config.rpm, 90);
        assert_eq!(config.tries, 2);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let file = config_file("trys = 2\n");
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_client_is_built() {
        let config = parse(&["--timeout", "5", "--user-agent", "octo-test"]).config;
        assert!(config.client().is_ok());
    }
}
