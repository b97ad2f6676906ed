//! Analysis result types.

use std::fmt;

use super::anova::AnovaTable;
use crate::error::CandidateFailure;
use crate::model::{AnalysisKind, FormulaClass, ModelSpec};

/// Which simplification, if any, the fitting engine had to make.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FallbackLevel {
    /// The first candidate was fitted.
    None,
    /// Interactions were dropped.
    MainOnly,
    /// Only the named factor was kept.
    SingleFactor(String),
}

impl FallbackLevel {
    /// Fallback level for the candidate at `index` of the chain.
    pub(crate) fn from_candidate(index: usize, class: &FormulaClass) -> Self {
        match class {
            _ if index == 0 => Self::None,
            FormulaClass::SingleFactor(name) => Self::SingleFactor(name.clone()),
            FormulaClass::MainOnly | FormulaClass::MainWithInteractions | FormulaClass::QuadraticRsm => {
                Self::MainOnly
            }
        }
    }

    /// Whether any simplification happened.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for FallbackLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::MainOnly => f.write_str("main-only"),
            Self::SingleFactor(name) => write!(f, "single-factor:{name}"),
        }
    }
}

/// An estimated model coefficient.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coefficient {
    /// Model-matrix column name, e.g. `Intercept` or `C(A)[T.2]`.
    pub name: String,
    /// Least-squares estimate.
    pub estimate: f64,
}

/// Outcome of a successful analysis.
///
/// Created fresh per call and never mutated by the library afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitResult {
    /// Caller-supplied description, e.g. `"Split-plot analysis"`.
    pub label: Option<String>,
    /// Entry point that produced the result, if any.
    pub kind: Option<AnalysisKind>,
    /// The fitted model specification.
    pub spec: ModelSpec,
    /// Text of the fitted formula.
    pub formula: String,
    /// Simplification taken.
    pub fallback: FallbackLevel,
    /// Position of the fitted candidate in the chain.
    pub candidate_index: usize,
    /// Candidates rejected before the fitted one, in order.
    pub rejected: Vec<CandidateFailure>,
    /// Type-II ANOVA table.
    pub anova: AnovaTable,
    /// Estimates of the estimable columns, in model-matrix order.
    pub coefficients: Vec<Coefficient>,
    /// Model-matrix columns that could not be estimated.
    pub aliased: Vec<String>,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// R² adjusted for model degrees of freedom.
    pub adj_r_squared: f64,
    /// Number of observations used.
    pub n_obs: usize,
    /// Model degrees of freedom (rank minus the intercept).
    pub df_model: usize,
    /// Residual degrees of freedom.
    pub df_resid: usize,
    /// Table row index of each observation used.
    pub observations: Vec<usize>,
    /// Residuals, one per observation.
    pub residuals: Vec<f64>,
    /// Fitted values, one per observation.
    pub fitted: Vec<f64>,
}

impl FitResult {
    /// Response column name.
    #[must_use]
    pub fn response(&self) -> &str {
        &self.spec.response
    }

    /// Factor column names.
    #[must_use]
    pub fn factors(&self) -> &[String] {
        &self.spec.factors
    }

    /// Estimate of a named coefficient.
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.estimate)
    }

    /// Residual mean square.
    #[must_use]
    pub fn mse(&self) -> f64 {
        self.anova
            .residual()
            .and_then(|r| r.mean_sq)
            .unwrap_or(f64::NAN)
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            writeln!(f, "{label}")?;
        }
        writeln!(f, "formula: {}", self.formula)?;
        writeln!(f, "fallback: {}", self.fallback)?;
        writeln!(
            f,
            "n = {}, R² = {:.4}, adj. R² = {:.4}",
            self.n_obs, self.r_squared, self.adj_r_squared
        )?;
        write!(f, "{}", self.anova)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_from_candidate() {
        assert_eq!(
            FallbackLevel::from_candidate(0, &FormulaClass::MainWithInteractions),
            FallbackLevel::None
        );
        assert_eq!(
            FallbackLevel::from_candidate(0, &FormulaClass::QuadraticRsm),
            FallbackLevel::None
        );
        assert_eq!(
            FallbackLevel::from_candidate(1, &FormulaClass::MainOnly),
            FallbackLevel::MainOnly
        );
        let single = FallbackLevel::from_candidate(3, &FormulaClass::SingleFactor("B".into()));
        assert_eq!(single, FallbackLevel::SingleFactor("B".into()));
        assert!(single.is_fallback());
        assert_eq!(single.to_string(), "single-factor:B");
    }
}
