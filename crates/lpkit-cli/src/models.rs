//! Example models.

use lpkit_model::{Domain, LinearExpr, Model, ModelBuilder, ModelError, Relation, Sense};

/// Weekly production plan for two products, without its objective.
///
/// `x` and `y` are production rates. Demand caps `x` at 40 and two labor
/// pools bound the combined output.
pub fn production_builder() -> Result<ModelBuilder, ModelError> {
    let mut builder = Model::builder();
    builder
        .add_variable("x", Domain::NonNegativeReals)?
        .add_variable("y", Domain::NonNegativeReals)?
        .add_constraint("demand", LinearExpr::new().term("x", 1.0), Relation::Le, 40.0)?
        .add_constraint(
            "labor_a",
            LinearExpr::new().term("x", 1.0).term("y", 1.0),
            Relation::Le,
            80.0,
        )?
        .add_constraint(
            "labor_b",
            LinearExpr::new().term("x", 2.0).term("y", 1.0),
            Relation::Le,
            100.0,
        )?;
    Ok(builder)
}

pub fn profit() -> LinearExpr {
    LinearExpr::new().term("x", 40.0).term("y", 30.0)
}

/// Maximize profit `40x + 30y` over [`production_builder`]
pub fn production_model() -> Result<Model, ModelError> {
    let mut builder = production_builder()?;
    builder.set_objective(profit(), Sense::Maximize)?;
    builder.build()
}
