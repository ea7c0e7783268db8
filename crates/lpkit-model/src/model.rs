use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

use crate::expr::LinearExpr;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),
    #[error("Unknown variable '{variable}' referenced by {referenced_by}")]
    UnknownVariable { variable: String, referenced_by: String },
    #[error("Non-finite coefficient or bound in {0}")]
    NonFiniteCoefficient(String),
    #[error("Model has no objective")]
    MissingObjective,
}

/// Admissible values for a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Domain {
    #[default]
    NonNegativeReals,
}

impl Domain {
    pub fn lower_bound(&self) -> f64 {
        match self {
            Domain::NonNegativeReals => 0.0,
        }
    }

    pub fn upper_bound(&self) -> f64 {
        match self {
            Domain::NonNegativeReals => f64::INFINITY,
        }
    }
}

/// A decision variable declared on a model
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Variable {
    id: String,
    domain: Domain,
}

impl Variable {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl Relation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        }
    }

    /// Whether `lhs` satisfies the relation against `bound` within `tolerance`
    pub fn holds(&self, lhs: f64, bound: f64, tolerance: f64) -> bool {
        match self {
            Relation::Le => lhs <= bound + tolerance,
            Relation::Ge => lhs >= bound - tolerance,
            Relation::Eq => (lhs - bound).abs() <= tolerance,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `expression <relation> bound`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Constraint {
    id: String,
    expression: LinearExpr,
    relation: Relation,
    bound: f64,
}

impl Constraint {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expression(&self) -> &LinearExpr {
        &self.expression
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {} {}", self.id, self.expression, self.relation, self.bound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Sense {
    Maximize,
    Minimize,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Maximize => f.write_str("maximize"),
            Sense::Minimize => f.write_str("minimize"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Objective {
    expression: LinearExpr,
    sense: Sense,
}

impl Objective {
    pub fn expression(&self) -> &LinearExpr {
        &self.expression
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }
}

/// Mutable stage of model construction.
///
/// Every reference to a variable is checked when the constraint or objective is
/// added, so a failed call never leaves the builder partially updated.
#[derive(Debug, Default, Clone)]
pub struct ModelBuilder {
    variables: Vec<Variable>,
    index: HashMap<String, usize>,
    constraints: Vec<Constraint>,
    constraint_ids: HashSet<String>,
    objective: Option<Objective>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(
        &mut self,
        id: impl Into<String>,
        domain: Domain,
    ) -> Result<&mut Self, ModelError> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(ModelError::DuplicateIdentifier(id));
        }
        self.index.insert(id.clone(), self.variables.len());
        self.variables.push(Variable { id, domain });
        Ok(self)
    }

    pub fn add_constraint(
        &mut self,
        id: impl Into<String>,
        expression: LinearExpr,
        relation: Relation,
        bound: f64,
    ) -> Result<&mut Self, ModelError> {
        let id = id.into();
        if self.constraint_ids.contains(&id) {
            return Err(ModelError::DuplicateIdentifier(id));
        }
        self.check_references(&expression, || format!("constraint '{}'", id))?;
        if !expression.is_finite() || !bound.is_finite() {
            return Err(ModelError::NonFiniteCoefficient(format!("constraint '{}'", id)));
        }

        self.constraint_ids.insert(id.clone());
        self.constraints.push(Constraint {
            id,
            expression,
            relation,
            bound,
        });
        Ok(self)
    }

    /// Set the objective, replacing any earlier one
    pub fn set_objective(
        &mut self,
        expression: LinearExpr,
        sense: Sense,
    ) -> Result<&mut Self, ModelError> {
        self.check_references(&expression, || "objective".to_string())?;
        if !expression.is_finite() {
            return Err(ModelError::NonFiniteCoefficient("objective".to_string()));
        }
        self.objective = Some(Objective { expression, sense });
        Ok(self)
    }

    pub fn variables(&self) -> std::slice::Iter<'_, Variable> {
        self.variables.iter()
    }

    pub fn constraints(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Freeze the builder into a [`Model`]
    pub fn build(self) -> Result<Model, ModelError> {
        let objective = self.objective.ok_or(ModelError::MissingObjective)?;
        Ok(Model {
            variables: self.variables,
            index: self.index,
            constraints: self.constraints,
            objective,
        })
    }

    fn check_references(
        &self,
        expression: &LinearExpr,
        referenced_by: impl Fn() -> String,
    ) -> Result<(), ModelError> {
        match expression.variables().find(|v| !self.index.contains_key(*v)) {
            Some(unknown) => Err(ModelError::UnknownVariable {
                variable: unknown.to_string(),
                referenced_by: referenced_by(),
            }),
            None => Ok(()),
        }
    }
}

/// A complete linear program: variables, constraints and one objective.
///
/// Variables and constraints are kept in declaration order, which is the order
/// adapters translate them in and reports list them in.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Model {
    variables: Vec<Variable>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<String, usize>,
    constraints: Vec<Constraint>,
    objective: Objective,
}

impl Model {
    pub fn builder() -> ModelBuilder {
        ModelBuilder::new()
    }

    pub fn variables(&self) -> std::slice::Iter<'_, Variable> {
        self.variables.iter()
    }

    pub fn constraints(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Declaration position of a variable
    pub fn variable_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}
