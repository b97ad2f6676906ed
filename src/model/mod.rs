//! Model formula builder.
//!
//! Turns a response and an ordered factor list into formula text for each
//! model class, and enumerates the ordered candidate list that the fitting
//! engine walks through. Nothing here fits a model.
//!
//! | Class | Formula for factors `A`, `B` |
//! |-------|------------------------------|
//! | Main + interaction | `y ~ C(A) + C(B) + C(A):C(B)` |
//! | Main only | `y ~ C(A) + C(B)` |
//! | Single factor `A` | `y ~ C(A)` |
//! | Quadratic RSM | `y ~ A + B + A:B + I(A**2) + I(B**2)` |
//!
//! ```
//! use doekit::model::{FormulaClass, ModelSpec};
//!
//! let spec = ModelSpec::new("y", ["A", "B"], FormulaClass::MainOnly);
//! assert_eq!(spec.formula().to_string(), "y ~ C(A) + C(B)");
//! ```

mod formula;

pub use formula::{Formula, Term, Variable};

use std::fmt;

use crate::utils::combinations;

/// Shape of a model over the factor list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormulaClass {
    /// Categorical main effects plus every two-factor interaction.
    MainWithInteractions,
    /// Categorical main effects only.
    MainOnly,
    /// One categorical factor.
    SingleFactor(String),
    /// Full second-order polynomial in numeric factors.
    QuadraticRsm,
}

impl fmt::Display for FormulaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainWithInteractions => f.write_str("main+interaction"),
            Self::MainOnly => f.write_str("main-only"),
            Self::SingleFactor(name) => write!(f, "single-factor({name})"),
            Self::QuadraticRsm => f.write_str("quadratic-RSM"),
        }
    }
}

/// The analysis entry points, each with its own candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnalysisKind {
    /// Factorial ANOVA with the full fallback chain.
    DoeAnova,
    /// Main-effects ANOVA, no fallback.
    MainEffects,
    /// Quadratic response surface, no fallback.
    RsmQuadratic,
}

impl AnalysisKind {
    /// Candidate classes in the order they are tried.
    ///
    /// ```
    /// use doekit::model::{AnalysisKind, FormulaClass};
    ///
    /// let chain = AnalysisKind::DoeAnova.candidates(&["A".to_string(), "B".to_string()]);
    /// assert_eq!(chain[0], FormulaClass::MainWithInteractions);
    /// assert_eq!(chain[3], FormulaClass::SingleFactor("B".into()));
    /// ```
    #[must_use]
    pub fn candidates(self, factors: &[String]) -> Vec<FormulaClass> {
        match self {
            Self::DoeAnova => {
                let mut chain = vec![FormulaClass::MainWithInteractions, FormulaClass::MainOnly];
                chain.extend(factors.iter().cloned().map(FormulaClass::SingleFactor));
                chain
            }
            Self::MainEffects => vec![FormulaClass::MainOnly],
            Self::RsmQuadratic => vec![FormulaClass::QuadraticRsm],
        }
    }
}

/// Response, ordered factors and model class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelSpec {
    /// Response column.
    pub response: String,
    /// Factor columns, in the order terms are generated.
    pub factors: Vec<String>,
    /// Model class.
    pub class: FormulaClass,
}

impl ModelSpec {
    /// Create a model specification.
    pub fn new<I, S>(response: impl Into<String>, factors: I, class: FormulaClass) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            response: response.into(),
            factors: factors.into_iter().map(Into::into).collect(),
            class,
        }
    }

    /// The formula for this specification.
    #[must_use]
    pub fn formula(&self) -> Formula {
        let categorical = |name: &String| Variable::Categorical(name.clone());
        let numeric = |name: &String| Variable::Numeric(name.clone());

        let terms = match &self.class {
            FormulaClass::MainWithInteractions => {
                let mut terms: Vec<Term> =
                    self.factors.iter().map(|f| Term::main(categorical(f))).collect();
                terms.extend(pairs(&self.factors, categorical));
                terms
            }
            FormulaClass::MainOnly => self
                .factors
                .iter()
                .map(|f| Term::main(categorical(f)))
                .collect(),
            FormulaClass::SingleFactor(name) => vec![Term::main(categorical(name))],
            FormulaClass::QuadraticRsm => {
                let mut terms: Vec<Term> =
                    self.factors.iter().map(|f| Term::main(numeric(f))).collect();
                terms.extend(pairs(&self.factors, numeric));
                terms.extend(
                    self.factors
                        .iter()
                        .map(|f| Term::main(Variable::Square(f.clone()))),
                );
                terms
            }
        };

        Formula::new(self.response.clone(), terms)
    }
}

/// Two-factor interactions over `factors` in (i < j) order.
fn pairs(factors: &[String], make: impl Fn(&String) -> Variable) -> Vec<Term> {
    combinations(factors.len(), 2)
        .map(|pair| Term::interaction(pair.iter().map(|&i| make(&factors[i])).collect()))
        .collect()
}

/// Every candidate specification for `kind`, in the order they are tried.
#[must_use]
pub fn candidates(kind: AnalysisKind, response: &str, factors: &[String]) -> Vec<ModelSpec> {
    kind.candidates(factors)
        .into_iter()
        .map(|class| ModelSpec::new(response, factors.iter().cloned(), class))
        .collect()
}
