use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::ErrorKind;

/// Time unit a launch rate is expressed in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, VariantNames, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum Resolution {
    /// Launches per second
    #[strum(to_string = "second", serialize = "sec", serialize = "s")]
    Second,
    /// Launches per minute
    #[strum(to_string = "minute", serialize = "min", serialize = "m")]
    Minute,
}

impl Resolution {
    /// Length of one unit
    #[must_use]
    pub const fn unit(self) -> Duration {
        match self {
            Self::Second => Duration::from_secs(1),
            Self::Minute => Duration::from_secs(60),
        }
    }

    /// Parse a resolution, mapping unknown values to a configuration error
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidResolution`] for anything but a second or a minute
    pub fn parse(input: &str) -> Result<Self, ErrorKind> {
        Self::from_str(input.trim()).map_err(|_| ErrorKind::InvalidResolution(input.to_string()))
    }
}

impl TryFrom<String> for Resolution {
    type Error = ErrorKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Resolution> for String {
    fn from(resolution: Resolution) -> Self {
        resolution.to_string()
    }
}
