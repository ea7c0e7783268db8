//! Backend driving the external SCIP executable.
//!
//! The model is written as an LP file into a scratch directory, SCIP is run
//! once through its interactive shell commands, and the solution file it
//! writes is parsed back into a [`Solution`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use lpkit_model::Model;
use tracing::{debug, info};

use crate::adapter::{SolverAdapter, warn_unsupported};
use crate::error::{SolverError, SolverResult};
use crate::lp_file::{variable_name, write_lp};
use crate::options::{SolveOption, SolveOptions};
use crate::solution::{Solution, SolveStatus};

#[derive(Debug, Clone, Default)]
pub struct ScipAdapter {
    /// Explicit path to the executable; `None` searches `PATH`
    binary: Option<PathBuf>,
}

impl ScipAdapter {
    pub const BINARY_NAME: &'static str = "scip";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            binary: Some(path.into()),
        }
    }

    /// Find the SCIP executable.
    pub fn locate(&self) -> SolverResult<PathBuf> {
        match &self.binary {
            Some(path) if path.is_file() => Ok(path.clone()),
            Some(path) => Err(unavailable(format!("{} does not exist", path.display()))),
            None => which::which(Self::BINARY_NAME).map_err(|e| {
                unavailable(format!("{} not found on PATH: {}", Self::BINARY_NAME, e))
            }),
        }
    }
}

fn unavailable(reason: String) -> SolverError {
    SolverError::BackendUnavailable {
        backend: ScipAdapter::BINARY_NAME.to_string(),
        reason,
    }
}

/// The SCIP shell command line for one solve
fn shell_commands(model_path: &Path, solution_path: &Path, options: &SolveOptions) -> String {
    // Dual reductions may end an unbounded LP as "infeasible or unbounded"
    let mut commands = vec![
        format!("read {}", model_path.display()),
        "set misc allowstrongdualreds FALSE".to_string(),
        "set misc allowweakdualreds FALSE".to_string(),
    ];
    for (option, value) in options.iter() {
        match option {
            SolveOption::GapTolerance => commands.push(format!("set limits gap {}", value)),
            SolveOption::TimeLimitSeconds => commands.push(format!("set limits time {}", value)),
        }
    }
    commands.push("optimize".to_string());
    commands.push(format!("write solution {}", solution_path.display()));
    commands.push("quit".to_string());
    commands.join(" ")
}

impl SolverAdapter for ScipAdapter {
    fn name(&self) -> &'static str {
        Self::BINARY_NAME
    }

    fn supports(&self, option: SolveOption) -> bool {
        match option {
            SolveOption::GapTolerance | SolveOption::TimeLimitSeconds => true,
        }
    }

    fn solve(&self, model: &Model, options: &SolveOptions) -> SolverResult<Solution> {
        let start = Instant::now();
        let binary = self.locate()?;
        warn_unsupported(self, options);

        let workdir = tempfile::tempdir()?;
        let model_path = workdir.path().join("model.lp");
        let solution_path = workdir.path().join("model.sol");
        {
            let mut writer = BufWriter::new(File::create(&model_path)?);
            write_lp(model, &mut writer)?;
            writer.flush()?;
        }
        debug!(path = %model_path.display(), "Wrote LP file");

        let output = Command::new(&binary)
            .arg("-c")
            .arg(shell_commands(&model_path, &solution_path, options))
            .output()
            .map_err(|e| unavailable(format!("failed to start {}: {}", binary.display(), e)))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(target: "lpkit::scip", "{}", line);
        }

        let solution = if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Solution::error(format!("scip exited with {}: {}", output.status, stderr.trim()))
        } else {
            match std::fs::read_to_string(&solution_path) {
                Ok(text) => to_solution(model, &text),
                Err(e) => Solution::error(format!("scip wrote no solution file: {}", e)),
            }
        };

        info!(
            backend = self.name(),
            status = %solution.status(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Solve finished"
        );
        Ok(solution)
    }
}

/// Contents of a SCIP solution file
#[derive(Debug, PartialEq)]
struct SolutionFile {
    /// Text after `solution status:`
    status: String,
    /// Values by declaration index; `None` when SCIP had no solution
    point: Option<Vec<f64>>,
}

fn parse_solution_file(text: &str, n_vars: usize) -> Result<SolutionFile, String> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let status = lines
        .next()
        .and_then(|l| l.strip_prefix("solution status:"))
        .map(|s| s.trim().to_string())
        .ok_or_else(|| "missing solution status line".to_string())?;

    let mut point = Some(vec![0.0; n_vars]);
    for line in lines {
        if line.starts_with("objective value:") {
            continue;
        }
        if line.starts_with("no solution available") {
            point = None;
            break;
        }

        let mut fields = line.split_whitespace();
        let (Some(name), Some(value)) = (fields.next(), fields.next()) else {
            return Err(format!("malformed solution line: {}", line));
        };
        let value: f64 = value
            .parse()
            .map_err(|_| format!("invalid value for {}: {}", name, value))?;

        // Variables at zero are omitted by SCIP; unknown names are ignored
        let index = name
            .strip_prefix('x')
            .and_then(|i| i.parse::<usize>().ok())
            .filter(|&i| i < n_vars && variable_name(i) == name);
        if let (Some(i), Some(values)) = (index, point.as_mut()) {
            values[i] = value;
        }
    }

    Ok(SolutionFile { status, point })
}

fn map_status(status: &str) -> SolveStatus {
    match status {
        "optimal solution found" | "gap limit reached" => SolveStatus::Optimal,
        "infeasible" => SolveStatus::Infeasible,
        "unbounded" => SolveStatus::Unbounded,
        "time limit reached" => SolveStatus::TimeLimitReached,
        _ => SolveStatus::Error,
    }
}

fn to_solution(model: &Model, text: &str) -> Solution {
    let file = match parse_solution_file(text, model.num_variables()) {
        Ok(file) => file,
        Err(e) => return Solution::error(format!("unreadable scip solution: {}", e)),
    };

    match (map_status(&file.status), file.point) {
        (SolveStatus::Optimal, Some(point)) => Solution::optimal(model, &point),
        (SolveStatus::TimeLimitReached, point) => {
            Solution::time_limit_reached(model, point.as_deref())
        }
        (SolveStatus::Infeasible, _) => Solution::infeasible(),
        (SolveStatus::Unbounded, _) => Solution::unbounded(),
        (_, _) => Solution::error(format!("scip reported: {}", file.status)),
    }
}
