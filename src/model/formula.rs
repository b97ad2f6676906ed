//! Formula terms and their text rendering.

use std::fmt;

/// One factor as it enters a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variable {
    /// Factor treated as categorical, rendered `C(name)`.
    Categorical(String),
    /// Factor used as a number, rendered `name`.
    Numeric(String),
    /// Square of a numeric factor, rendered `I(name**2)`.
    Square(String),
}

impl Variable {
    /// Name of the underlying factor column.
    #[must_use]
    pub fn factor(&self) -> &str {
        match self {
            Self::Categorical(name) | Self::Numeric(name) | Self::Square(name) => name,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categorical(name) => write!(f, "C({name})"),
            Self::Numeric(name) => f.write_str(name),
            Self::Square(name) => write!(f, "I({name}**2)"),
        }
    }
}

/// A model term: a single variable or an interaction of several.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    variables: Vec<Variable>,
}

impl Term {
    /// A main-effect term.
    #[must_use]
    pub fn main(variable: Variable) -> Self {
        Self {
            variables: vec![variable],
        }
    }

    /// An interaction term of the given variables, in order.
    #[must_use]
    pub fn interaction(variables: Vec<Variable>) -> Self {
        Self { variables }
    }

    /// Variables of this term.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Interaction order (1 for a main effect).
    #[must_use]
    pub fn order(&self) -> usize {
        self.variables.len()
    }

    /// Whether every variable of `self` also appears in `other`.
    ///
    /// A term contains itself.
    #[must_use]
    pub fn is_contained_in(&self, other: &Self) -> bool {
        self.variables.iter().all(|v| other.variables.contains(v))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.variables.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A response and the terms that explain it. The intercept is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Formula {
    response: String,
    terms: Vec<Term>,
}

impl Formula {
    /// Create a formula.
    #[must_use]
    pub fn new(response: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            response: response.into(),
            terms,
        }
    }

    /// Response column name.
    #[must_use]
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Terms in order.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ ", self.response)?;
        if self.terms.is_empty() {
            return f.write_str("1");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}
