mod problem;

use std::time::{Duration, Instant};

use lpkit_model::{Model, Relation};
use tracing::{debug, info, trace};

use crate::adapter::{SolverAdapter, warn_unsupported};
use crate::error::SolverResult;
use crate::options::{SolveOption, SolveOptions};
use crate::solution::Solution;

pub use problem::LpProblem;

/// In-process two-phase simplex backend.
///
/// Honors `time-limit-seconds` by checking a wall-clock deadline before every
/// pivot. `gap-tolerance` has no meaning for a pure LP simplex and is ignored
/// with a warning.
#[derive(Debug, Clone)]
pub struct SimplexAdapter {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for SimplexAdapter {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

impl SimplexAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    fn run(&self, problem: &LpProblem, deadline: Option<Instant>) -> Outcome {
        let mut tableau = Tableau::build(problem);

        // Phase 1: find an initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, deadline) {
                PhaseResult::Optimal => {}
                PhaseResult::Unbounded => return Outcome::Infeasible,
                PhaseResult::TimeLimit => return Outcome::TimeLimit(None),
                PhaseResult::IterationLimit => return Outcome::IterationLimit,
            }
            if !self.artificials_cleared(&tableau) {
                return Outcome::Infeasible;
            }
            self.drive_out_artificials(&mut tableau);
        }

        // Phase 2: optimize over the original objective
        let eligible = tableau.n_vars + tableau.n_slack;
        match self.iterate(&mut tableau, eligible, deadline) {
            PhaseResult::Optimal => Outcome::Optimal(tableau.point()),
            PhaseResult::Unbounded => Outcome::Unbounded,
            PhaseResult::TimeLimit => Outcome::TimeLimit(Some(tableau.point())),
            PhaseResult::IterationLimit => Outcome::IterationLimit,
        }
    }

    fn phase1(&self, tableau: &mut Tableau, deadline: Option<Instant>) -> PhaseResult {
        let obj_row = tableau.obj_row();
        let n_cols = tableau.n_cols();
        let art_start = tableau.n_vars + tableau.n_slack;

        let original = std::mem::replace(&mut tableau.data[obj_row], vec![0.0; n_cols]);

        // Maximize -sum(artificials), priced out against the artificial basis
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[obj_row][j] = -1.0;
        }
        for i in 0..obj_row {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] += tableau.data[i][j];
                }
            }
        }

        let result = self.iterate(tableau, n_cols - 1, deadline);
        if result != PhaseResult::Optimal {
            return result;
        }

        // Restore the original objective and price out the current basis
        tableau.data[obj_row] = original;
        for i in 0..obj_row {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[obj_row][basic];
            if ratio.abs() > self.tolerance {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        PhaseResult::Optimal
    }

    fn artificials_cleared(&self, tableau: &Tableau) -> bool {
        let art_start = tableau.n_vars + tableau.n_slack;
        let rhs_col = tableau.n_cols() - 1;
        (0..tableau.obj_row())
            .filter(|&i| tableau.basic_vars[i] >= art_start)
            .all(|i| tableau.data[i][rhs_col].abs() <= self.tolerance)
    }

    /// Remove artificials left in the basis at zero after phase 1.
    ///
    /// Each such row is pivoted on any non-artificial column with a nonzero
    /// entry; a row without one is a redundant equation and is dropped.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let art_start = tableau.n_vars + tableau.n_slack;
        for i in (0..tableau.obj_row()).rev() {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            match (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance) {
                Some(col) => {
                    trace!(row = i, col, "Degenerate pivot removing artificial");
                    self.pivot(tableau, i, col);
                }
                None => {
                    debug!(row = i, "Dropping redundant equality row");
                    tableau.data.remove(i);
                    tableau.basic_vars.remove(i);
                }
            }
        }
    }

    /// Pivot until no column among the first `eligible` improves the objective.
    ///
    /// After a degenerate pivot the entering column switches from the largest
    /// reduced cost to the lowest index (Bland's rule) so the basis cannot cycle.
    fn iterate(
        &self,
        tableau: &mut Tableau,
        eligible: usize,
        deadline: Option<Instant>,
    ) -> PhaseResult {
        let mut iterations = 0;
        let mut degenerate = false;
        loop {
            let Some(pivot_col) = self.find_pivot_column(tableau, eligible, degenerate) else {
                debug!(iterations, "Simplex phase converged");
                return PhaseResult::Optimal;
            };
            if iterations >= self.max_iterations {
                return PhaseResult::IterationLimit;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                debug!(iterations, "Simplex deadline reached");
                return PhaseResult::TimeLimit;
            }
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                return PhaseResult::Unbounded;
            };
            let rhs_col = tableau.n_cols() - 1;
            degenerate = tableau.data[pivot_row][rhs_col].abs() <= self.tolerance;
            trace!(pivot_row, pivot_col, degenerate, "Pivot");
            self.pivot(tableau, pivot_row, pivot_col);
            iterations += 1;
        }
    }

    fn find_pivot_column(&self, tableau: &Tableau, eligible: usize, bland: bool) -> Option<usize> {
        let obj_row = tableau.obj_row();
        if bland {
            return (0..eligible).find(|&j| tableau.data[obj_row][j] > self.tolerance);
        }

        // Most positive reduced cost (can improve objective)
        let mut max_val = self.tolerance;
        let mut max_col = None;
        for j in 0..eligible {
            if tableau.data[obj_row][j] > max_val {
                max_val = tableau.data[obj_row][j];
                max_col = Some(j);
            }
        }
        max_col
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.n_cols() - 1;

        let mut min_ratio = f64::INFINITY;
        let mut min_row = None;
        for i in 0..tableau.obj_row() {
            let val = tableau.data[i][col];
            if val > self.tolerance {
                let ratio = tableau.data[i][rhs_col] / val;
                if ratio < 0.0 {
                    continue;
                }
                // Ties go to the row whose basic variable has the lowest index
                let better = match min_row {
                    None => true,
                    Some(current) => {
                        ratio < min_ratio - self.tolerance
                            || (ratio <= min_ratio + self.tolerance
                                && tableau.basic_vars[i] < tableau.basic_vars[current])
                    }
                };
                if better {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }
        min_row
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        tableau.basic_vars[row] = col;

        let pivot_val = tableau.data[row][col];
        for value in tableau.data[row].iter_mut() {
            *value /= pivot_val;
        }

        let pivot_row = tableau.data[row].clone();
        for (i, current) in tableau.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = current[col];
            if factor != 0.0 {
                for (value, p) in current.iter_mut().zip(&pivot_row) {
                    *value -= factor * p;
                }
            }
        }
    }
}

impl SolverAdapter for SimplexAdapter {
    fn name(&self) -> &'static str {
        "simplex"
    }

    fn supports(&self, option: SolveOption) -> bool {
        matches!(option, SolveOption::TimeLimitSeconds)
    }

    fn solve(&self, model: &Model, options: &SolveOptions) -> SolverResult<Solution> {
        let start = Instant::now();
        warn_unsupported(self, options);

        let problem = LpProblem::from_model(model);
        debug!(
            variables = problem.num_variables(),
            constraints = problem.num_constraints(),
            sense = %problem.sense(),
            "Translated model to dense form"
        );

        let deadline = options.time_limit_seconds.and_then(|s| deadline_after(start, s));
        let solution = match self.run(&problem, deadline) {
            Outcome::Optimal(point) => Solution::optimal(model, &point),
            Outcome::Infeasible => Solution::infeasible(),
            Outcome::Unbounded => Solution::unbounded(),
            Outcome::TimeLimit(incumbent) => {
                Solution::time_limit_reached(model, incumbent.as_deref())
            }
            Outcome::IterationLimit => {
                Solution::error(format!("iteration limit of {} reached", self.max_iterations))
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

/// Budgets too large to represent are treated as no limit
fn deadline_after(start: Instant, seconds: f64) -> Option<Instant> {
    Duration::try_from_secs_f64(seconds.max(0.0))
        .ok()
        .and_then(|budget| start.checked_add(budget))
}

struct Tableau {
    /// Constraint rows followed by the objective row; last column is the RHS
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn build(problem: &LpProblem) -> Self {
        let rows: Vec<_> = problem.constraints.iter().map(|c| c.normalized()).collect();
        let n_vars = problem.num_variables();
        let n_constraints = rows.len();

        let mut n_slack = 0;
        let mut n_artificial = 0;
        for row in &rows {
            match row.relation {
                Relation::Le => n_slack += 1,
                Relation::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                Relation::Eq => n_artificial += 1,
            }
        }

        let total_cols = n_vars + n_slack + n_artificial + 1;
        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; n_constraints + 1],
            basic_vars: vec![0; n_constraints],
            n_vars,
            n_slack,
            n_artificial,
        };

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;
        for (i, row) in rows.iter().enumerate() {
            tableau.data[i][..n_vars].copy_from_slice(&row.coefficients);
            tableau.data[i][total_cols - 1] = row.rhs;

            match row.relation {
                Relation::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    tableau.basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                Relation::Ge => {
                    tableau.data[i][slack_idx] = -1.0;
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                Relation::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // The engine maximizes, so minimization objectives are negated
        let obj_row = n_constraints;
        for (j, &coef) in problem.objective.coefficients.iter().enumerate() {
            tableau.data[obj_row][j] = if problem.objective.minimize { -coef } else { coef };
        }

        tableau
    }

    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    /// Values of the original variables at the current basis
    fn point(&self) -> Vec<f64> {
        let rhs_col = self.n_cols() - 1;
        let mut values = vec![0.0; self.n_vars];
        for (i, &basic) in self.basic_vars.iter().enumerate() {
            if basic < self.n_vars {
                values[basic] = self.data[i][rhs_col];
            }
        }
        values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseResult {
    Optimal,
    Unbounded,
    TimeLimit,
    IterationLimit,
}

enum Outcome {
    Optimal(Vec<f64>),
    Infeasible,
    Unbounded,
    TimeLimit(Option<Vec<f64>>),
    IterationLimit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::SolveStatus;
    use lpkit_model::{Domain, LinearExpr, ModelBuilder, Sense};

    fn builder(vars: &[&str]) -> ModelBuilder {
        let mut builder = Model::builder();
        for v in vars {
            builder.add_variable(*v, Domain::NonNegativeReals).unwrap();
        }
        builder
    }

    fn expr(terms: &[(&str, f64)]) -> LinearExpr {
        terms.iter().map(|&(v, c)| (v, c)).collect()
    }

    fn solve(builder: ModelBuilder, options: &SolveOptions) -> Solution {
        let model = builder.build().unwrap();
        SimplexAdapter::new().solve(&model, options).unwrap()
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to: x + y <= 4, x <= 3, y <= 3
        // Optimal: x=3, y=1, obj=11
        let mut b = builder(&["x", "y"]);
        b.add_constraint("sum", expr(&[("x", 1.0), ("y", 1.0)]), Relation::Le, 4.0).unwrap();
        b.add_constraint("x_max", expr(&[("x", 1.0)]), Relation::Le, 3.0).unwrap();
        b.add_constraint("y_max", expr(&[("y", 1.0)]), Relation::Le, 3.0).unwrap();
        b.set_objective(expr(&[("x", 3.0), ("y", 2.0)]), Sense::Maximize).unwrap();

        let solution = solve(b, &SolveOptions::new());

        assert_eq!(solution.status(), SolveStatus::Optimal);
        let x = solution.value("x").unwrap();
        let y = solution.value("y").unwrap();
        assert!((x - 3.0).abs() < 1e-6, "x = {} (expected 3)", x);
        assert!((y - 1.0).abs() < 1e-6, "y = {} (expected 1)", y);
        assert!((solution.objective_value().unwrap() - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to: x + y >= 4, x <= 3, y <= 3
        // Optimal: x=3, y=1, obj=9
        let mut b = builder(&["x", "y"]);
        b.add_constraint("sum", expr(&[("x", 1.0), ("y", 1.0)]), Relation::Ge, 4.0).unwrap();
        b.add_constraint("x_max", expr(&[("x", 1.0)]), Relation::Le, 3.0).unwrap();
        b.add_constraint("y_max", expr(&[("y", 1.0)]), Relation::Le, 3.0).unwrap();
        b.set_objective(expr(&[("x", 2.0), ("y", 3.0)]), Sense::Minimize).unwrap();

        let solution = solve(b, &SolveOptions::new());

        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert!((solution.value("x").unwrap() - 3.0).abs() < 1e-6);
        assert!((solution.value("y").unwrap() - 1.0).abs() < 1e-6);
        assert!((solution.objective_value().unwrap() - 9.0).abs() < 1e-6);
        assert!((solution.activity("sum").unwrap() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_equality_and_negative_rhs() {
        // Minimize: x + y
        // Subject to: x - y = 2, -x <= -3  (x >= 3)
        // Optimal: x=3, y=1, obj=4
        let mut b = builder(&["x", "y"]);
        b.add_constraint("diff", expr(&[("x", 1.0), ("y", -1.0)]), Relation::Eq, 2.0).unwrap();
        b.add_constraint("floor", expr(&[("x", -1.0)]), Relation::Le, -3.0).unwrap();
        b.set_objective(expr(&[("x", 1.0), ("y", 1.0)]), Sense::Minimize).unwrap();

        let solution = solve(b, &SolveOptions::new());

        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert!((solution.value("x").unwrap() - 3.0).abs() < 1e-6);
        assert!((solution.value("y").unwrap() - 1.0).abs() < 1e-6);
        assert!((solution.activity("floor").unwrap() + 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible() {
        // x >= 5, x <= 3
        let mut b = builder(&["x"]);
        b.add_constraint("lower", expr(&[("x", 1.0)]), Relation::Ge, 5.0).unwrap();
        b.add_constraint("upper", expr(&[("x", 1.0)]), Relation::Le, 3.0).unwrap();
        b.set_objective(expr(&[("x", 1.0)]), Sense::Minimize).unwrap();

        let solution = solve(b, &SolveOptions::new());

        assert_eq!(solution.status(), SolveStatus::Infeasible);
        assert!(!solution.has_values());
    }

    #[test]
    fn test_unbounded() {
        let mut b = builder(&["x", "y"]);
        b.add_constraint("floor", expr(&[("x", 1.0)]), Relation::Ge, 1.0).unwrap();
        b.set_objective(expr(&[("x", 1.0), ("y", 1.0)]), Sense::Maximize).unwrap();

        let solution = solve(b, &SolveOptions::new());

        assert_eq!(solution.status(), SolveStatus::Unbounded);
        assert!(!solution.has_values());
    }

    #[test]
    fn test_zero_time_limit_in_phase_one_has_no_incumbent() {
        let mut b = builder(&["x"]);
        b.add_constraint("floor", expr(&[("x", 1.0)]), Relation::Ge, 2.0).unwrap();
        b.set_objective(expr(&[("x", 1.0)]), Sense::Minimize).unwrap();

        let solution = solve(b, &SolveOptions::new().with_time_limit(0.0));

        assert_eq!(solution.status(), SolveStatus::TimeLimitReached);
        assert!(!solution.has_values());
    }

    #[test]
    fn test_already_optimal_basis_ignores_zero_time_limit() {
        let mut b = builder(&["x"]);
        b.add_constraint("cap", expr(&[("x", 1.0)]), Relation::Le, 2.0).unwrap();
        b.set_objective(expr(&[("x", 1.0)]), Sense::Minimize).unwrap();

        let solution = solve(b, &SolveOptions::new().with_time_limit(0.0));

        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert_eq!(solution.value("x"), Some(0.0));
    }

    #[test]
    fn test_iteration_limit_is_error() {
        let mut b = builder(&["x", "y"]);
        b.add_constraint("sum", expr(&[("x", 1.0), ("y", 1.0)]), Relation::Le, 4.0).unwrap();
        b.set_objective(expr(&[("x", 3.0), ("y", 2.0)]), Sense::Maximize).unwrap();
        let model = b.build().unwrap();

        let solution = SimplexAdapter::new()
            .with_max_iterations(0)
            .solve(&model, &SolveOptions::new())
            .unwrap();

        assert_eq!(solution.status(), SolveStatus::Error);
        assert!(solution.message().unwrap().contains("iteration limit"));
    }

    #[test]
    fn test_degenerate_equality_stays_feasible() {
        // x <= 0, x - y = 0, y <= 5, maximize y
        // Optimal: x=0, y=0, obj=0
        let mut b = builder(&["x", "y"]);
        b.add_constraint("x_cap", expr(&[("x", 1.0)]), Relation::Le, 0.0).unwrap();
        b.add_constraint("link", expr(&[("x", 1.0), ("y", -1.0)]), Relation::Eq, 0.0).unwrap();
        b.add_constraint("y_cap", expr(&[("y", 1.0)]), Relation::Le, 5.0).unwrap();
        b.set_objective(expr(&[("y", 1.0)]), Sense::Maximize).unwrap();

        let solution = solve(b, &SolveOptions::new());

        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert!(solution.value("x").unwrap().abs() < 1e-9);
        assert!(solution.value("y").unwrap().abs() < 1e-9);
        assert!(solution.activity("link").unwrap().abs() < 1e-9);
        assert!(solution.objective_value().unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_equality_without_cap_is_bounded() {
        // x <= 0, x - y = 0, maximize y
        let mut b = builder(&["x", "y"]);
        b.add_constraint("x_cap", expr(&[("x", 1.0)]), Relation::Le, 0.0).unwrap();
        b.add_constraint("link", expr(&[("x", 1.0), ("y", -1.0)]), Relation::Eq, 0.0).unwrap();
        b.set_objective(expr(&[("y", 1.0)]), Sense::Maximize).unwrap();

        let solution = solve(b, &SolveOptions::new());

        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert!(solution.objective_value().unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_redundant_equality_row_is_dropped() {
        // x + y = 2, 2x + 2y = 4, minimize x
        // Optimal: x=0, y=2, obj=0
        let mut b = builder(&["x", "y"]);
        b.add_constraint("sum", expr(&[("x", 1.0), ("y", 1.0)]), Relation::Eq, 2.0).unwrap();
        b.add_constraint("double", expr(&[("x", 2.0), ("y", 2.0)]), Relation::Eq, 4.0).unwrap();
        b.set_objective(expr(&[("x", 1.0)]), Sense::Minimize).unwrap();

        let solution = solve(b, &SolveOptions::new());

        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert!(solution.value("x").unwrap().abs() < 1e-9);
        assert!((solution.value("y").unwrap() - 2.0).abs() < 1e-9);
        assert!((solution.activity("double").unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_ties_prefer_lowest_basic_index() {
        // Both rows tie at ratio 0 for x; the row whose basic slack has the
        // lower column index wins
        let mut b = builder(&["x", "y"]);
        b.add_constraint("first", expr(&[("x", 1.0)]), Relation::Le, 0.0).unwrap();
        b.add_constraint("second", expr(&[("x", 1.0), ("y", 1.0)]), Relation::Le, 0.0).unwrap();
        b.set_objective(expr(&[("x", 1.0)]), Sense::Maximize).unwrap();
        let model = b.build().unwrap();

        let adapter = SimplexAdapter::new();
        let mut tableau = Tableau::build(&LpProblem::from_model(&model));
        tableau.basic_vars.swap(0, 1);
        assert_eq!(adapter.find_pivot_row(&tableau, 0), Some(1));
    }

    #[test]
    fn test_huge_time_limit_is_no_limit() {
        let start = Instant::now();
        assert!(deadline_after(start, f64::MAX).is_none());
        assert_eq!(deadline_after(start, 0.0), Some(start));
    }
}
