use thiserror::Error;

/// Failures of a solve call that are not mathematical outcomes.
///
/// Infeasible, unbounded and time-limited results are reported through
/// [`crate::SolveStatus`] instead.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The requested engine could not be located or initialized.
    #[error("Solver backend {backend} is unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    /// Failure preparing or exchanging files with the backend.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;
