//! CPLEX LP format writer used to hand models to file-based backends.
//!
//! Variables and constraints are written under positional names (`x0`, `x1`,
//! ... and `c0`, `c1`, ...) so arbitrary model identifiers never have to be
//! escaped, and results can be mapped back by declaration index.

use std::io::{self, Write};

use lpkit_model::{LinearExpr, Model, Relation, Sense};

pub(crate) fn variable_name(index: usize) -> String {
    format!("x{}", index)
}

pub(crate) fn constraint_name(index: usize) -> String {
    format!("c{}", index)
}

/// Write `model` in CPLEX LP format
pub fn write_lp<W: Write>(model: &Model, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "\\ lpkit model: {} variables, {} constraints",
        model.num_variables(),
        model.num_constraints()
    )?;

    let objective = model.objective();
    match objective.sense() {
        Sense::Maximize => writeln!(out, "Maximize")?,
        Sense::Minimize => writeln!(out, "Minimize")?,
    }
    write!(out, " obj:")?;
    write_expr(model, objective.expression(), out)?;
    writeln!(out)?;

    writeln!(out, "Subject To")?;
    for (i, constraint) in model.constraints().enumerate() {
        write!(out, " {}:", constraint_name(i))?;
        write_expr(model, constraint.expression(), out)?;
        let op = match constraint.relation() {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        };
        writeln!(out, " {} {}", op, constraint.bound())?;
    }

    writeln!(out, "Bounds")?;
    for (j, variable) in model.variables().enumerate() {
        let domain = variable.domain();
        let name = variable_name(j);
        if domain.upper_bound().is_finite() {
            writeln!(out, " {} <= {} <= {}", domain.lower_bound(), name, domain.upper_bound())?;
        } else {
            writeln!(out, " {} >= {}", name, domain.lower_bound())?;
        }
    }
    writeln!(out, "End")
}

fn write_expr<W: Write>(model: &Model, expr: &LinearExpr, out: &mut W) -> io::Result<()> {
    let mut written = 0;
    for term in expr.terms() {
        let Some(j) = model.variable_index(&term.variable) else {
            continue;
        };
        let sign = if term.coefficient < 0.0 { '-' } else { '+' };
        write!(out, " {} {} {}", sign, term.coefficient.abs(), variable_name(j))?;
        written += 1;
    }
    if written == 0 {
        write!(out, " 0 {}", variable_name(0))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpkit_model::Domain;

    #[test]
    fn test_write_lp() {
        let mut builder = Model::builder();
        builder
            .add_variable("apples", Domain::NonNegativeReals)
            .unwrap()
            .add_variable("pears", Domain::NonNegativeReals)
            .unwrap()
            .add_constraint(
                "budget",
                LinearExpr::new().term("apples", 2.0).term("pears", -1.5),
                Relation::Le,
                10.0,
            )
            .unwrap()
            .add_constraint("pears min", LinearExpr::new().term("pears", 1.0), Relation::Ge, 1.0)
            .unwrap()
            .add_constraint("empty", LinearExpr::new(), Relation::Eq, 0.0)
            .unwrap()
            .set_objective(LinearExpr::new().term("pears", 3.0), Sense::Minimize)
            .unwrap();
        let model = builder.build().unwrap();

        let mut buf = Vec::new();
        write_lp(&model, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let expected = "\
\\ lpkit model: 2 variables, 3 constraints
Minimize
 obj: + 3 x1
Subject To
 c0: + 2 x0 - 1.5 x1 <= 10
 c1: + 1 x1 >= 1
 c2: 0 x0 = 0
Bounds
 x0 >= 0
 x1 >= 0
End
";
        assert_eq!(text, expected);
    }
}
