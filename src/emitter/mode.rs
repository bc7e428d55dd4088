//! Placement of captured stray output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigurationError;

/// Where captured output goes relative to the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputMode {
    /// Captured output is written before the body.
    #[default]
    Prepend,
    /// Captured output is written after the body.
    Append,
    /// Captured output is dropped.
    Clean,
}

impl OutputMode {
    /// Every accepted mode name, in documentation order.
    pub const NAMES: [&'static str; 3] = ["prepend", "append", "clean"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Prepend => "prepend",
            OutputMode::Append => "append",
            OutputMode::Clean => "clean",
        }
    }
}

impl FromStr for OutputMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prepend" => Ok(OutputMode::Prepend),
            "append" => Ok(OutputMode::Append),
            "clean" => Ok(OutputMode::Clean),
            other => Err(ConfigurationError::new(other)),
        }
    }
}

impl TryFrom<String> for OutputMode {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutputMode> for String {
    fn from(mode: OutputMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
