//! Rendering of solutions for people and for machines.
//!
//! Rows follow the model's declaration order; values come from the solution.

use std::io::{self, Write};

use lpkit_model::Model;
use lpkit_solver::{Solution, SolveStatus};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    model: &'a Model,
    solution: &'a Solution,
}

pub fn render_text<W: Write>(model: &Model, solution: &Solution, out: &mut W) -> io::Result<()> {
    writeln!(out, "Status: {}", solution.status())?;

    match solution.status() {
        SolveStatus::Infeasible => {
            return writeln!(out, "No solution exists that satisfies all constraints.");
        }
        SolveStatus::Unbounded => {
            return writeln!(out, "The problem has no finite optimal solution.");
        }
        SolveStatus::Error => {
            return writeln!(out, "Solver error: {}", solution.message().unwrap_or("unknown error"));
        }
        SolveStatus::TimeLimitReached if !solution.has_values() => {
            return writeln!(out, "No feasible solution was found within the time limit.");
        }
        SolveStatus::TimeLimitReached => {
            writeln!(out, "Best solution found so far (not proven optimal).")?;
        }
        SolveStatus::Optimal => {}
    }

    if let Some(objective) = solution.objective_value() {
        writeln!(out, "Objective ({}): {:.4}", model.objective().sense(), objective)?;
    }

    writeln!(out)?;
    writeln!(out, "Decision variables:")?;
    for variable in model.variables() {
        if let Some(value) = solution.value(variable.id()) {
            writeln!(out, "  {:20} {:12.4}", variable.id(), value)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Constraints:")?;
    for constraint in model.constraints() {
        if let Some(activity) = solution.activity(constraint.id()) {
            writeln!(
                out,
                "  {:20} {:12.4}  ({} {})",
                constraint.id(),
                activity,
                constraint.relation(),
                constraint.bound()
            )?;
        }
    }
    Ok(())
}

/// Pretty-printed JSON holding the model and its solution
pub fn render_json<W: Write>(
    model: &Model,
    solution: &Solution,
    out: &mut W,
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &JsonReport { model, solution })?;
    writeln!(out).map_err(serde_json::Error::io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::production_model;

    fn render(solution: &Solution) -> String {
        let model = production_model().unwrap();
        let mut buf = Vec::new();
        render_text(&model, solution, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_optimal_report_in_declaration_order() {
        let model = production_model().unwrap();
        let text = render(&Solution::optimal(&model, &[20.0, 60.0]));

        assert!(text.starts_with("Status: OPTIMAL\n"));
        assert!(text.contains("Objective (maximize): 2600.0000"));
        let x = text.find("  x ").unwrap();
        let y = text.find("  y ").unwrap();
        assert!(x < y);
        let demand = text.find("demand").unwrap();
        let labor_a = text.find("labor_a").unwrap();
        let labor_b = text.find("labor_b").unwrap();
        assert!(demand < labor_a && labor_a < labor_b);
        assert!(text.contains("100.0000  (<= 100)"));
    }

    #[test]
    fn test_infeasible_report_has_no_values() {
        let text = render(&Solution::infeasible());

        assert!(text.starts_with("Status: INFEASIBLE\n"));
        assert!(!text.contains("Decision variables"));
        assert!(!text.contains("Objective"));
    }

    #[test]
    fn test_unbounded_report() {
        let text = render(&Solution::unbounded());
        assert!(text.contains("UNBOUNDED"));
        assert!(!text.contains("Constraints:"));
    }

    #[test]
    fn test_time_limited_report_marks_incumbent() {
        let model = production_model().unwrap();
        let text = render(&Solution::time_limit_reached(&model, Some(&[0.0, 0.0])));
        assert!(text.contains("not proven optimal"));
        assert!(text.contains("Decision variables:"));

        let text = render(&Solution::time_limit_reached(&model, None));
        assert!(text.contains("No feasible solution"));
    }

    #[test]
    fn test_json_report() {
        let model = production_model().unwrap();
        let solution = Solution::optimal(&model, &[20.0, 60.0]);
        let mut buf = Vec::new();
        render_json(&model, &solution, &mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["solution"]["status"], "optimal");
        assert_eq!(value["solution"]["objective_value"], 2600.0);
        assert_eq!(value["solution"]["variables"][1]["id"], "y");
        assert_eq!(value["model"]["constraints"][2]["id"], "labor_b");
    }
}
