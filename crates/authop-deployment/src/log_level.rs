//! Operator log levels and their server verbosity

use serde::{Deserialize, Serialize};

/// Log level requested in the operator configuration.
///
/// An unspecified level deserializes as [`OperatorLogLevel::Normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperatorLogLevel {
    #[default]
    #[serde(alias = "")]
    Normal,
    Debug,
    Trace,
    TraceAll,
}

impl OperatorLogLevel {
    /// Numeric `-v` verbosity of the server for this level
    pub fn verbosity(self) -> u32 {
        match self {
            Self::Normal => 2,
            Self::Debug => 4,
            Self::Trace => 6,
            Self::TraceAll => 100,
        }
    }
}

impl std::fmt::Display for OperatorLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Debug => write!(f, "Debug"),
            Self::Trace => write!(f, "Trace"),
            Self::TraceAll => write!(f, "TraceAll"),
        }
    }
}

impl std::str::FromStr for OperatorLogLevel {
    type Err = String;

    /// Accepts the upstream names; empty input is `Normal`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "Normal" => Ok(Self::Normal),
            "Debug" => Ok(Self::Debug),
            "Trace" => Ok(Self::Trace),
            "TraceAll" => Ok(Self::TraceAll),
            other => Err(format!(
                "unknown operator log level '{other}', expected Normal, Debug, Trace or TraceAll"
            )),
        }
    }
}
