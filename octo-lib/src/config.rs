//! Engine configuration.
//!
//! [`EngineConfig`] holds the loosely typed options as a user would write them,
//! for example in a TOML file. It is validated once, by
//! [`Engine::new`](crate::Engine::new).
use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::retry::{DEFAULT_MAX_RETRIES, DEFAULT_MAX_TIME_SECS, DEFAULT_RETRY_SLEEP_SECS};
use crate::scheduler::DEFAULT_CONNECTIONS;

/// Options of an [`Engine`](crate::Engine)
///
/// ```
/// use std::time::Duration;
/// use octo_lib::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .rate(200.0)
///     .resolution("minute")
///     .connections(10)
///     .retry_sleep(Duration::from_secs(1))
///     .build();
/// assert_eq!(config.retries, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of launches per `resolution`. Unset means unlimited.
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,

    /// Time unit of `rate`: `second` or `minute`. Required if and only if
    /// `rate` is set.
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    /// Maximum number of requests in flight at the same time
    #[builder(default = DEFAULT_CONNECTIONS)]
    pub connections: usize,

    /// Maximum number of attempts per request, including the first one
    #[builder(default = DEFAULT_MAX_RETRIES)]
    pub retries: u32,

    /// First wait between attempts, the seed of the backoff sequence
    #[builder(default = Duration::from_secs(DEFAULT_RETRY_SLEEP_SECS))]
    #[serde(with = "humantime_serde")]
    pub retry_sleep: Duration,

    /// Wall-clock budget across all attempts of one request
    #[builder(default = Duration::from_secs(DEFAULT_MAX_TIME_SECS))]
    #[serde(with = "humantime_serde")]
    pub max_time: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::EngineConfig;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.rate, None);
        assert_eq!(config.resolution, None);
        assert_eq!(config.connections, 5);
        assert_eq!(config.retries, 3);
        assert_eq!(config.retry_sleep, Duration::from_secs(10));
        assert_eq!(config.max_time, Duration::from_secs(600));
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let config: EngineConfig = toml::from_str(
            r#"
            rate = 200.0
            resolution = "minute"
            retry_sleep = "500ms"
            max_time = "2m"
            "#,
        )
        .unwrap();

        assert_eq!(config.rate, Some(200.0));
        assert_eq!(config.resolution.as_deref(), Some("minute"));
        assert_eq!(config.retry_sleep, Duration::from_millis(500));
        assert_eq!(config.max_time, Duration::from_secs(120));
        assert_eq!(config.connections, 5);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = toml::from_str::<EngineConfig>("rpm = 10");
        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = EngineConfig::builder().connections(2).retries(7).build();
        let toml = toml::to_string(&config).unwrap();
        let deserialized: EngineConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, deserialized);
    }
}
