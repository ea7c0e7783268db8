//! The capability interface every solver backend implements.

use std::fmt;
use std::str::FromStr;

use lpkit_model::Model;
use tracing::warn;

use crate::error::SolverResult;
use crate::options::{SolveOption, SolveOptions};
use crate::scip::ScipAdapter;
use crate::simplex::SimplexAdapter;
use crate::solution::Solution;

/// Translates a [`Model`] plus [`SolveOptions`] into one backend invocation.
///
/// Implementations translate every variable, constraint and the objective,
/// apply the options they support, run the backend exactly once and map its
/// outcome onto a [`Solution`]. Infeasible, unbounded and time-limited results
/// are `Ok`; only an engine that cannot be reached is an `Err`.
pub trait SolverAdapter {
    /// Short backend name used in logs and errors
    fn name(&self) -> &'static str;

    /// Whether this backend honors `option`
    fn supports(&self, option: SolveOption) -> bool;

    fn solve(&self, model: &Model, options: &SolveOptions) -> SolverResult<Solution>;
}

/// Log a warning for each set option the adapter cannot apply.
///
/// Returns the options that were skipped so callers can report them.
pub fn warn_unsupported(adapter: &dyn SolverAdapter, options: &SolveOptions) -> Vec<SolveOption> {
    options
        .iter()
        .filter(|(option, _)| !adapter.supports(*option))
        .map(|(option, value)| {
            warn!(
                backend = adapter.name(),
                option = option.key(),
                value,
                "Option not supported by backend; using backend default"
            );
            option
        })
        .collect()
}

/// The backends this crate can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Built-in dense simplex, always available
    #[default]
    Simplex,
    /// External SCIP executable
    Scip,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Simplex, Backend::Scip];

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Simplex => "simplex",
            Backend::Scip => "scip",
        }
    }

    pub fn adapter(&self) -> Box<dyn SolverAdapter> {
        match self {
            Backend::Simplex => Box::new(SimplexAdapter::new()),
            Backend::Scip => Box::new(ScipAdapter::new()),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown solver backend: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("simplex".parse::<Backend>().unwrap(), Backend::Simplex);
        assert_eq!("SCIP".parse::<Backend>().unwrap(), Backend::Scip);
        assert!("gurobi".parse::<Backend>().is_err());
    }

    #[test]
    fn test_adapter_names_match_backend() {
        for backend in Backend::ALL {
            assert_eq!(backend.adapter().name(), backend.name());
        }
    }

    #[test]
    fn test_warn_unsupported_lists_skipped_options() {
        let options = SolveOptions::new().with_gap_tolerance(0.1).with_time_limit(5.0);

        let simplex = SimplexAdapter::new();
        assert_eq!(warn_unsupported(&simplex, &options), vec![SolveOption::GapTolerance]);

        let scip = ScipAdapter::new();
        assert!(warn_unsupported(&scip, &options).is_empty());
    }
}
