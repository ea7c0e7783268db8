use std::fmt;

/// A single `coefficient * variable` product
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Term {
    pub variable: String,
    pub coefficient: f64,
}

/// A linear combination of variables.
///
/// Terms keep the order in which each variable was first mentioned; adding a
/// variable that is already present sums the coefficients.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LinearExpr {
    terms: Vec<Term>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`LinearExpr::add_term`]
    pub fn term(mut self, variable: impl Into<String>, coefficient: f64) -> Self {
        self.add_term(variable, coefficient);
        self
    }

    pub fn add_term(&mut self, variable: impl Into<String>, coefficient: f64) {
        let variable = variable.into();
        match self.terms.iter_mut().find(|t| t.variable == variable) {
            Some(existing) => existing.coefficient += coefficient,
            None => self.terms.push(Term { variable, coefficient }),
        }
    }

    pub fn terms(&self) -> std::slice::Iter<'_, Term> {
        self.terms.iter()
    }

    /// Identifiers referenced by this expression, in term order
    pub fn variables(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.terms.iter().map(|t| t.variable.as_str())
    }

    /// Coefficient of `variable`, zero when it does not appear
    pub fn coefficient(&self, variable: &str) -> f64 {
        self.terms
            .iter()
            .find(|t| t.variable == variable)
            .map_or(0.0, |t| t.coefficient)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        self.terms.iter().all(|t| t.coefficient.is_finite())
    }

    /// Evaluate the expression, looking up each variable's value with `value_of`
    pub fn evaluate(&self, mut value_of: impl FnMut(&str) -> f64) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * value_of(&t.variable))
            .sum()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut expr = LinearExpr::new();
        for (variable, coefficient) in iter {
            expr.add_term(variable, coefficient);
        }
        expr
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, t) in self.terms.iter().enumerate() {
            let magnitude = t.coefficient.abs();
            match (i, t.coefficient < 0.0) {
                (0, false) => {}
                (0, true) => write!(f, "-")?,
                (_, false) => write!(f, " + ")?,
                (_, true) => write!(f, " - ")?,
            }
            if magnitude == 1.0 {
                write!(f, "{}", t.variable)?;
            } else {
                write!(f, "{}*{}", magnitude, t.variable)?;
            }
        }
        Ok(())
    }
}
