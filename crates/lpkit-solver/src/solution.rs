use std::fmt;

use lpkit_model::Model;
use serde::Serialize;

/// Outcome class of a solve attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveStatus {
    /// A proven optimal solution was found
    Optimal,
    /// No assignment satisfies all constraints
    Infeasible,
    /// The objective can be improved without limit
    Unbounded,
    /// The time budget ran out; an incumbent may be attached
    TimeLimitReached,
    /// The backend failed internally
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unbounded => "UNBOUNDED",
            SolveStatus::TimeLimitReached => "TIME LIMIT REACHED",
            SolveStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub id: String,
    pub value: f64,
}

/// The result of one solve call. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    status: SolveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    objective_value: Option<f64>,
    variables: Vec<NamedValue>,
    constraints: Vec<NamedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl Solution {
    /// Build a solution from a point given in variable declaration order.
    ///
    /// The objective value and the left-hand side of every constraint are
    /// evaluated at that point.
    pub fn from_point(model: &Model, status: SolveStatus, point: &[f64]) -> Self {
        let value_of = |id: &str| {
            model
                .variable_index(id)
                .and_then(|i| point.get(i).copied())
                .unwrap_or(0.0)
        };

        let variables = model
            .variables()
            .map(|v| NamedValue {
                id: v.id().to_string(),
                value: value_of(v.id()),
            })
            .collect();
        let constraints = model
            .constraints()
            .map(|c| NamedValue {
                id: c.id().to_string(),
                value: c.expression().evaluate(value_of),
            })
            .collect();

        Self {
            status,
            objective_value: Some(model.objective().expression().evaluate(value_of)),
            variables,
            constraints,
            message: None,
        }
    }

    pub fn optimal(model: &Model, point: &[f64]) -> Self {
        Self::from_point(model, SolveStatus::Optimal, point)
    }

    /// Time budget exhausted, with or without a feasible incumbent
    pub fn time_limit_reached(model: &Model, incumbent: Option<&[f64]>) -> Self {
        match incumbent {
            Some(point) => Self::from_point(model, SolveStatus::TimeLimitReached, point),
            None => Self::status_only(SolveStatus::TimeLimitReached),
        }
    }

    pub fn infeasible() -> Self {
        Self::status_only(SolveStatus::Infeasible)
    }

    pub fn unbounded() -> Self {
        Self::status_only(SolveStatus::Unbounded)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::status_only(SolveStatus::Error)
        }
    }

    fn status_only(status: SolveStatus) -> Self {
        Self {
            status,
            objective_value: None,
            variables: Vec::new(),
            constraints: Vec::new(),
            message: None,
        }
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    /// Variable values in model declaration order; empty when there is no point
    pub fn variable_values(&self) -> std::slice::Iter<'_, NamedValue> {
        self.variables.iter()
    }

    /// Constraint left-hand sides in model declaration order
    pub fn constraint_activity(&self) -> std::slice::Iter<'_, NamedValue> {
        self.constraints.iter()
    }

    pub fn value(&self, variable: &str) -> Option<f64> {
        self.variables.iter().find(|v| v.id == variable).map(|v| v.value)
    }

    pub fn activity(&self, constraint: &str) -> Option<f64> {
        self.constraints.iter().find(|c| c.id == constraint).map(|c| c.value)
    }

    /// Backend diagnostic attached to an `Error` status
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn has_values(&self) -> bool {
        !self.variables.is_empty()
    }
}
