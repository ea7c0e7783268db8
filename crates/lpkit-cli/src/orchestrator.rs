//! Sequences config loading, model construction, backend selection and the
//! solve call.

use std::path::PathBuf;

use lpkit_model::{Model, ModelError};
use lpkit_solver::{
    Backend, ConfigError, Solution, SolveOptions, SolveStatus, SolverAdapter, SolverError,
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("Solver {backend} failed: {message}")]
    SolveFailed { backend: String, message: String },
}

/// A solved model, ready for reporting
#[derive(Debug)]
pub struct RunOutcome {
    pub model: Model,
    pub solution: Solution,
}

pub struct Orchestrator {
    adapter: Box<dyn SolverAdapter>,
    options: SolveOptions,
}

impl Orchestrator {
    pub fn new(adapter: Box<dyn SolverAdapter>) -> Self {
        Self {
            adapter,
            options: SolveOptions::default(),
        }
    }

    pub fn for_backend(backend: Backend) -> Self {
        Self::new(backend.adapter())
    }

    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the model with `build`, then solve it.
    ///
    /// Construction errors are returned before the backend is touched.
    pub fn run<F>(&self, build: F) -> Result<RunOutcome, RunError>
    where
        F: FnOnce() -> Result<Model, ModelError>,
    {
        let model = build()?;
        self.solve(model)
    }

    /// Solve `model` once.
    ///
    /// An `Error` status becomes [`RunError::SolveFailed`]; infeasible,
    /// unbounded and time-limited outcomes are returned as solutions.
    pub fn solve(&self, model: Model) -> Result<RunOutcome, RunError> {
        info!(
            backend = self.adapter.name(),
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "Solving model"
        );
        for constraint in model.constraints() {
            debug!(constraint = constraint.id(), "{}", constraint);
        }

        let solution = self.adapter.solve(&model, &self.options)?;
        if solution.status() == SolveStatus::Error {
            return Err(RunError::SolveFailed {
                backend: self.adapter.name().to_string(),
                message: solution.message().unwrap_or("unknown error").to_string(),
            });
        }

        Ok(RunOutcome { model, solution })
    }
}

/// What to run: an optional JSON config file and the backend to use
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub config: Option<PathBuf>,
    pub backend: Backend,
}

/// Load the config, build the model, select the backend and solve.
pub fn run<F>(request: &RunRequest, build: F) -> Result<RunOutcome, RunError>
where
    F: FnOnce() -> Result<Model, ModelError>,
{
    let options = match &request.config {
        Some(path) => SolveOptions::from_path(path)?,
        None => SolveOptions::default(),
    };
    debug!(?options, "Loaded solver options");

    let model = build()?;
    Orchestrator::for_backend(request.backend)
        .with_options(options)
        .solve(model)
}
