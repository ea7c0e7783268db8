pub mod expr;
pub mod model;

pub use expr::{LinearExpr, Term};
pub use model::{
    Constraint, Domain, Model, ModelBuilder, ModelError, Objective, Relation, Sense, Variable,
};
