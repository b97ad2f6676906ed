//! Model fitting and ANOVA.
//!
//! This module fits linear models to experimental results and decomposes
//! their variation:
//! - Treatment-coded model matrices for categorical factors
//! - Least squares with aliasing detection ([`LeastSquaresSolver`])
//! - Type-II ANOVA with F-test p-values ([`FDistribution`])
//! - A fallback chain of progressively simpler models ([`FitEngine`])
//! - General-purpose analyses of any table: descriptive statistics,
//!   Pearson correlation, one-way ANOVA and multiple linear regression
//!
//! ## Quick Start
//!
//! ```rust
//! use doekit::analysis::{doe_anova, FallbackLevel};
//! use doekit::design::full_factorial;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = full_factorial(&[2, 2])?
//!     .with_response("y", vec![10.0, 14.0, 11.0, 17.0])?;
//!
//! // Four runs cannot carry the interaction, so the engine falls back
//! let result = doe_anova(&table, "y", &["F1", "F2"])?;
//! assert_eq!(result.fallback, FallbackLevel::MainOnly);
//! assert_eq!(result.formula, "y ~ C(F1) + C(F2)");
//!
//! let f1 = result.anova.term("C(F1)").unwrap();
//! assert_eq!(f1.df, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Entry Points
//!
//! | Function | Candidates |
//! |----------|------------|
//! | [`doe_anova`] | main + interaction, main only, each factor alone |
//! | [`main_effects_anova`] | main only |
//! | [`rsm_quadratic`] | full quadratic in numeric factors |
//! | [`fit`] | the given [`ModelSpec`] |
//!
//! | Function | Output |
//! |----------|--------|
//! | [`describe`] | count, mean, spread and quartiles per numeric column |
//! | [`correlation`] | Pearson matrix and the strongly correlated pairs |
//! | [`one_way_anova`] | F test of one factor, with per-level statistics |
//! | [`linear_regression`] | intercept, slopes, R² and RMSE |

mod anova;
mod descriptive;
mod encode;
mod fallback;
mod ols;
mod oneway;
mod regression;
mod stats;
mod types;

pub use anova::{AnovaRow, AnovaTable, RESIDUAL_ROW};
pub use descriptive::{
    correlation, describe, pearson, ColumnSummary, CorrelatedPair, CorrelationMatrix,
    CorrelationReport, CorrelationStrength, DescriptiveSummary, MIN_ROWS, STRONG_CORRELATION,
};
pub use fallback::FitEngine;
pub use ols::{LeastSquaresFit, LeastSquaresSolver, QrSolver, SolveError};
pub use oneway::{GroupSummary, OneWayAnova};
pub use regression::RegressionResult;
pub use stats::{
    f_distribution_p_value, ln_gamma, regularized_incomplete_beta, FDistribution,
    IncompleteBetaF,
};
pub use types::{Coefficient, FallbackLevel, FitResult};

use crate::error::Result;
use crate::model::{AnalysisKind, ModelSpec};
use crate::table::{DataTable, TabularData};

/// Fit one model specification with the default engine.
///
/// # Errors
///
/// See [`FitEngine::fit`].
pub fn fit<T: TabularData + ?Sized>(table: &T, spec: &ModelSpec) -> Result<FitResult> {
    FitEngine::standard().fit(table, spec)
}

/// Factorial ANOVA with the full fallback chain, using the default engine.
///
/// # Errors
///
/// See [`FitEngine::analyze`].
pub fn doe_anova<T: TabularData + ?Sized>(
    table: &T,
    response: &str,
    factors: &[&str],
) -> Result<FitResult> {
    FitEngine::standard().doe_anova(table, response, factors)
}

/// Main-effects ANOVA with the default engine.
///
/// # Errors
///
/// See [`FitEngine::analyze`].
pub fn main_effects_anova<T: TabularData + ?Sized>(
    table: &T,
    response: &str,
    factors: &[&str],
    label: Option<&str>,
) -> Result<FitResult> {
    FitEngine::standard().main_effects_anova(table, response, factors, label)
}

/// Quadratic response-surface fit with the default engine.
///
/// # Errors
///
/// See [`FitEngine::analyze`].
pub fn rsm_quadratic<T: TabularData + ?Sized>(
    table: &T,
    response: &str,
    factors: &[&str],
    label: Option<&str>,
) -> Result<FitResult> {
    FitEngine::standard().rsm_quadratic(table, response, factors, label)
}

/// One-way ANOVA with the default engine.
///
/// # Errors
///
/// See [`FitEngine::one_way_anova`].
pub fn one_way_anova<T: TabularData + ?Sized>(
    table: &T,
    response: &str,
    factor: &str,
) -> Result<OneWayAnova> {
    FitEngine::standard().one_way_anova(table, response, factor)
}

/// Multiple linear regression with the default engine.
///
/// # Errors
///
/// See [`FitEngine::linear_regression`].
pub fn linear_regression<T: TabularData + ?Sized>(
    table: &T,
    response: &str,
    predictors: &[&str],
) -> Result<RegressionResult> {
    FitEngine::standard().linear_regression(table, response, predictors)
}

/// A self-contained analysis job.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisRequest {
    /// Data to analyse.
    pub table: DataTable,
    /// Entry point.
    pub kind: AnalysisKind,
    /// Response column.
    pub response: String,
    /// Factor columns.
    pub factors: Vec<String>,
    /// Optional label carried into the result.
    pub label: Option<String>,
}

impl AnalysisRequest {
    /// Create a request without a label.
    pub fn new<I, S>(table: DataTable, kind: AnalysisKind, response: impl Into<String>, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table,
            kind,
            response: response.into(),
            factors: factors.into_iter().map(Into::into).collect(),
            label: None,
        }
    }

    /// Attach a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Run the request with the default engine.
    ///
    /// # Errors
    ///
    /// See [`FitEngine::analyze`].
    pub fn run(&self) -> Result<FitResult> {
        FitEngine::standard().analyze(
            &self.table,
            self.kind,
            &self.response,
            &self.factors,
            self.label.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{box_behnken, full_factorial, plackett_burman, Level};
    use crate::error::Error;

    #[test]
    fn test_rsm_on_box_behnken() {
        let design = box_behnken(3, 3).unwrap();
        // y = 5 + 2 x1 - x2 + 0.5 x1 x3 - 1.5 x2^2, plus a small center wobble
        let mut y: Vec<f64> = design
            .iter_runs()
            .map(|run| {
                let v: Vec<f64> = run.values().iter().map(|l| l.as_f64().unwrap()).collect();
                5.0 + 2.0 * v[0] - v[1] + 0.5 * v[0] * v[2] - 1.5 * v[1] * v[1]
            })
            .collect();
        y[12] += 0.1;
        y[13] -= 0.1;

        let table = design.with_response("y", y).unwrap();
        let result = rsm_quadratic(&table, "y", &["F1", "F2", "F3"], Some("Box-Behnken")).unwrap();

        assert_eq!(
            result.formula,
            "y ~ F1 + F2 + F3 + F1:F2 + F1:F3 + F2:F3 + I(F1**2) + I(F2**2) + I(F3**2)"
        );
        assert_eq!(result.df_resid, 15 - 10);
        assert!((result.coefficient("F1").unwrap() - 2.0).abs() < 1e-9);
        assert!((result.coefficient("F1:F3").unwrap() - 0.5).abs() < 1e-9);
        assert!((result.coefficient("I(F2**2)").unwrap() + 1.5).abs() < 1e-9);
        assert!(result.aliased.is_empty());
        assert_eq!(result.kind, Some(AnalysisKind::RsmQuadratic));
    }

    #[test]
    fn test_main_effects_on_plackett_burman() {
        let design = plackett_burman(7).unwrap();
        let y: Vec<f64> = design
            .iter_runs()
            .enumerate()
            .map(|(i, run)| {
                let a = run.get("F1").and_then(Level::as_f64).unwrap();
                10.0 + 3.0 * a + (i % 3) as f64 * 0.1
            })
            .collect();
        let table = design.with_response("y", y).unwrap();

        // 8 runs, 7 factors: the main-effects model is saturated
        let saturated =
            main_effects_anova(&table, "y", &["F1", "F2", "F3", "F4", "F5", "F6", "F7"], None);
        assert!(matches!(saturated, Err(Error::ModelUnidentifiable { .. })));

        let result = main_effects_anova(&table, "y", &["F1", "F2", "F3"], Some("Screening")).unwrap();
        assert_eq!(result.df_resid, 4);
        let f1 = result.anova.term("C(F1)").unwrap();
        assert!(f1.p_value.unwrap() < 0.001);
    }

    #[test]
    fn test_request_run() {
        let table = full_factorial(&[2, 2])
            .unwrap()
            .with_response("y", vec![1.0, 2.0, 3.0, 5.0])
            .unwrap();
        let request =
            AnalysisRequest::new(table, AnalysisKind::DoeAnova, "y", ["F1", "F2"]).with_label("2x2");
        let result = request.run().unwrap();
        assert_eq!(result.label.as_deref(), Some("2x2"));
        assert_eq!(result.fallback, FallbackLevel::MainOnly);
        assert_eq!(result.rejected.len(), 1);
    }

    #[test]
    fn test_fit_free_function() {
        let table = full_factorial(&[3, 2])
            .unwrap()
            .with_response("y", vec![1.0, 2.0, 3.0, 4.0, 5.0, 7.0])
            .unwrap();
        let spec = ModelSpec::new("y", ["F1", "F2"], crate::model::FormulaClass::MainOnly);
        let result = fit(&table, &spec).unwrap();
        assert_eq!(result.df_resid, 2);
        assert_eq!(result.coefficients.len(), 4);
    }

    #[test]
    fn test_general_analyses_on_one_table() {
        let design = full_factorial(&[3, 2]).unwrap();
        let y: Vec<f64> = design
            .iter_runs()
            .map(|run| {
                let a = run.get("F1").and_then(Level::as_f64).unwrap();
                let b = run.get("F2").and_then(Level::as_f64).unwrap();
                2.0 * a + 0.5 * b
            })
            .collect();
        let table = design.with_response("y", y).unwrap();

        let summary = describe(&table).unwrap();
        assert_eq!(summary.variables(), 3);
        assert_eq!(summary.observations, 6);

        let report = correlation(&table).unwrap();
        assert_eq!(report.total_pairs, 3);
        assert!(report.matrix.get("F1", "F2").unwrap().abs() < 1e-12);
        assert!(report
            .strong_pairs
            .iter()
            .any(|p| p.first == "F1" && p.second == "y"));

        let oneway = one_way_anova(&table, "y", "F1").unwrap();
        assert_eq!(oneway.groups.len(), 3);
        assert_eq!(oneway.df_within, 3);

        let regression = linear_regression(&table, "y", &["F1", "F2"]).unwrap();
        assert!((regression.coefficient("F1").unwrap() - 2.0).abs() < 1e-10);
        assert!((regression.coefficient("F2").unwrap() - 0.5).abs() < 1e-10);
        assert!(regression.intercept.abs() < 1e-10);
    }

    #[test]
    fn test_free_functions_use_standard_engine() {
        let table = full_factorial(&[2, 2])
            .unwrap()
            .with_response("y", vec![1.0, 2.0, 3.0, 5.0])
            .unwrap();
        assert_eq!(
            doe_anova(&table, "y", &["F1", "F2"]),
            FitEngine::<QrSolver, IncompleteBetaF>::default().doe_anova(&table, "y", &["F1", "F2"])
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_result_serializes() {
        let table = full_factorial(&[2, 2])
            .unwrap()
            .with_response("y", vec![1.0, 2.0, 3.0, 5.0])
            .unwrap();
        let result = doe_anova(&table, "y", &["F1", "F2"]).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["formula"], "y ~ C(F1) + C(F2)");
        assert_eq!(json["fallback"], "MainOnly");
        assert_eq!(json["rejected"].as_array().unwrap().len(), 1);
    }
}
