use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid solver config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {option}: {value} (must be finite and non-negative)")]
    InvalidValue { option: SolveOption, value: f64 },
}

/// The option names a config source may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveOption {
    /// Relative optimality gap at which the backend may stop
    GapTolerance,
    /// Wall-clock budget for a single solve, in seconds
    TimeLimitSeconds,
}

impl SolveOption {
    pub const ALL: [SolveOption; 2] = [SolveOption::GapTolerance, SolveOption::TimeLimitSeconds];

    pub fn key(&self) -> &'static str {
        match self {
            SolveOption::GapTolerance => "gap-tolerance",
            SolveOption::TimeLimitSeconds => "time-limit-seconds",
        }
    }
}

impl fmt::Display for SolveOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Options handed to a [`crate::SolverAdapter`] for one solve.
///
/// Unset options mean "use the backend default". Unknown keys in a config
/// source are rejected rather than ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SolveOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_tolerance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<f64>,
}

impl SolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gap_tolerance(mut self, gap: f64) -> Self {
        self.gap_tolerance = Some(gap);
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }

    pub fn get(&self, option: SolveOption) -> Option<f64> {
        match option {
            SolveOption::GapTolerance => self.gap_tolerance,
            SolveOption::TimeLimitSeconds => self.time_limit_seconds,
        }
    }

    /// The options that are set, in a fixed order
    pub fn iter(&self) -> impl Iterator<Item = (SolveOption, f64)> + '_ {
        SolveOption::ALL
            .into_iter()
            .filter_map(move |option| self.get(option).map(|value| (option, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.iter().find(|(_, value)| !value.is_finite() || *value < 0.0) {
            Some((option, value)) => Err(ConfigError::InvalidValue { option, value }),
            None => Ok(()),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let options: SolveOptions = serde_json::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&source)
    }
}
