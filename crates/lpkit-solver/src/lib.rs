mod adapter;
mod error;
mod lp_file;
mod options;
mod scip;
mod simplex;
mod solution;

pub use adapter::{Backend, SolverAdapter, warn_unsupported};
pub use error::{SolverError, SolverResult};
pub use lp_file::write_lp;
pub use options::{ConfigError, SolveOption, SolveOptions};
pub use scip::ScipAdapter;
pub use simplex::{LpProblem, SimplexAdapter};
pub use solution::{NamedValue, Solution, SolveStatus};
