use lpkit_model::{Model, Relation, Sense};

/// Dense, index-based form of a [`Model`] consumed by the simplex engine.
///
/// Column `j` is the `j`-th declared variable and row `i` the `i`-th declared
/// constraint.
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Row>,
}

#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[derive(Debug, Clone)]
pub struct Row {
    /// Constraint identifier (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

impl LpProblem {
    pub fn from_model(model: &Model) -> Self {
        let n = model.num_variables();
        let dense = |expr: &lpkit_model::LinearExpr| {
            let mut coefficients = vec![0.0; n];
            for term in expr.terms() {
                if let Some(j) = model.variable_index(&term.variable) {
                    coefficients[j] += term.coefficient;
                }
            }
            coefficients
        };

        let objective = model.objective();
        Self {
            variables: model.variables().map(|v| v.id().to_string()).collect(),
            objective: Objective {
                coefficients: dense(objective.expression()),
                minimize: objective.sense() == Sense::Minimize,
            },
            constraints: model
                .constraints()
                .map(|c| Row {
                    name: c.id().to_string(),
                    coefficients: dense(c.expression()),
                    relation: c.relation(),
                    rhs: c.bound(),
                })
                .collect(),
        }
    }

    pub fn sense(&self) -> Sense {
        if self.objective.minimize {
            Sense::Minimize
        } else {
            Sense::Maximize
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

impl Row {
    /// Equivalent row with a non-negative right-hand side
    pub(crate) fn normalized(&self) -> Row {
        if self.rhs >= 0.0 {
            return self.clone();
        }
        Row {
            name: self.name.clone(),
            coefficients: self.coefficients.iter().map(|c| -c).collect(),
            relation: match self.relation {
                Relation::Le => Relation::Ge,
                Relation::Ge => Relation::Le,
                Relation::Eq => Relation::Eq,
            },
            rhs: -self.rhs,
        }
    }
}
