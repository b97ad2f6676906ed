//! Fitting engine with a fallback chain.
//!
//! Candidates are tried in order. A candidate succeeds when its model
//! matrix can be built, the least-squares solve succeeds and at least one
//! residual degree of freedom remains; the first success stops the walk.
//! When every candidate fails the engine reports all of the failures
//! instead of a partial result.
//!
//! ```text
//! Trying(0) ──fail──▶ Trying(1) ──fail──▶ … ──fail──▶ Exhausted
//!     │                   │
//!   success             success
//!     ▼                   ▼
//!   Fitted              Fitted
//! ```

use ndarray::Array1;

use super::anova::type_two;
use super::encode::encode;
use super::ols::{LeastSquaresSolver, QrSolver};
use super::stats::{FDistribution, IncompleteBetaF};
use super::types::{Coefficient, FallbackLevel, FitResult};
use crate::error::{CandidateFailure, Error, Result};
use crate::model::{candidates, AnalysisKind, FormulaClass, ModelSpec};
use crate::table::{duplicated, TabularData};

/// Complete rows and their numeric response.
#[derive(Debug, Clone)]
struct Prepared {
    rows: Vec<usize>,
    y: Array1<f64>,
}

/// Check names and columns, then drop incomplete rows.
///
/// With `numeric_factors`, a factor cell that does not read as a number
/// counts as missing.
fn prepare<T: TabularData + ?Sized>(
    table: &T,
    response: &str,
    factors: &[String],
    numeric_factors: bool,
) -> Result<Prepared> {
    if factors.is_empty() {
        return Err(Error::invalid_params("at least one factor is required"));
    }
    let repeated = duplicated(factors.iter().map(String::as_str));
    if !repeated.is_empty() {
        return Err(Error::invalid_params(format!(
            "factors listed more than once: {repeated:?}"
        )));
    }
    if factors.iter().any(|f| f == response) {
        return Err(Error::invalid_params(format!(
            "response `{response}` is also listed as a factor"
        )));
    }
    for name in std::iter::once(response).chain(factors.iter().map(String::as_str)) {
        if !table.has_column(name) {
            return Err(Error::missing_column(name));
        }
    }

    let mut rows = Vec::new();
    let mut y = Vec::new();
    for row in 0..table.n_rows() {
        let value = table.cell(row, response).and_then(|c| c.as_f64());
        let complete = factors.iter().all(|f| {
            table.cell(row, f).is_some_and(|c| {
                if numeric_factors {
                    c.as_f64().is_some()
                } else {
                    !c.is_missing()
                }
            })
        });
        if let (Some(value), true) = (value, complete) {
            rows.push(row);
            y.push(value);
        }
    }

    let required = factors.len() + 1;
    if rows.len() < required {
        return Err(Error::InsufficientData {
            required,
            available: rows.len(),
        });
    }

    Ok(Prepared {
        rows,
        y: Array1::from(y),
    })
}

/// Bundles the least-squares and F-distribution capabilities.
///
/// [`FitEngine::standard`] uses [`QrSolver`] and [`IncompleteBetaF`]; any
/// other implementations of the two traits can be plugged in.
///
/// # Example
///
/// ```
/// use doekit::analysis::{FitEngine, QrSolver};
/// use doekit::design::full_factorial;
///
/// let table = full_factorial(&[2, 2])
///     .unwrap()
///     .with_response("y", vec![1.0, 2.0, 3.0, 5.0])
///     .unwrap();
///
/// let engine = FitEngine::standard().with_solver(QrSolver::new(1e-12));
/// let result = engine.main_effects_anova(&table, "y", &["F1", "F2"], None).unwrap();
/// assert_eq!(result.df_resid, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FitEngine<S = QrSolver, D = IncompleteBetaF> {
    solver: S,
    distribution: D,
}

impl FitEngine {
    /// An engine over [`QrSolver`] and [`IncompleteBetaF`].
    #[must_use]
    pub fn standard() -> Self {
        Self::default()
    }
}

impl<S, D> FitEngine<S, D>
where
    S: LeastSquaresSolver,
    D: FDistribution,
{
    /// An engine over the given capabilities.
    pub fn new(solver: S, distribution: D) -> Self {
        Self {
            solver,
            distribution,
        }
    }

    /// The least-squares solver.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// The F-distribution implementation.
    pub fn distribution(&self) -> &D {
        &self.distribution
    }

    /// Replace the least-squares solver.
    pub fn with_solver<S2: LeastSquaresSolver>(self, solver: S2) -> FitEngine<S2, D> {
        FitEngine {
            solver,
            distribution: self.distribution,
        }
    }

    /// Replace the F-distribution implementation.
    pub fn with_distribution<D2: FDistribution>(self, distribution: D2) -> FitEngine<S, D2> {
        FitEngine {
            solver: self.solver,
            distribution,
        }
    }

    /// Fit a single model specification, without fallback.
    ///
    /// # Errors
    ///
    /// Returns the precondition errors of the analysis entry points, or
    /// [`Error::ModelUnidentifiable`] with one attempt if the model cannot
    /// be fitted.
    pub fn fit<T: TabularData + ?Sized>(&self, table: &T, spec: &ModelSpec) -> Result<FitResult> {
        if let FormulaClass::SingleFactor(name) = &spec.class {
            if !spec.factors.contains(name) {
                return Err(Error::invalid_params(format!(
                    "single factor `{name}` is not among the factors"
                )));
            }
        }
        let numeric = spec.class == FormulaClass::QuadraticRsm;
        let prepared = prepare(table, &spec.response, &spec.factors, numeric)?;
        self.walk(table, &prepared, vec![spec.clone()], None, None)
    }

    /// Run the candidate chain of `kind` over `table`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameters`] for an empty or repeated factor list,
    ///   or a response that is also a factor.
    /// - [`Error::MissingColumn`] if the response or a factor is absent.
    /// - [`Error::InsufficientData`] if fewer than `factors + 1` complete
    ///   rows remain. For [`AnalysisKind::RsmQuadratic`] a factor cell that
    ///   is not numeric makes its row incomplete.
    /// - [`Error::ModelUnidentifiable`] if every candidate fails.
    pub fn analyze<T: TabularData + ?Sized>(
        &self,
        table: &T,
        kind: AnalysisKind,
        response: &str,
        factors: &[String],
        label: Option<&str>,
    ) -> Result<FitResult> {
        let numeric = kind == AnalysisKind::RsmQuadratic;
        let prepared = prepare(table, response, factors, numeric)?;
        let chain = candidates(kind, response, factors);
        self.walk(table, &prepared, chain, Some(kind), label)
    }

    /// Factorial ANOVA with fallback: main effects and two-factor
    /// interactions, then main effects only, then each factor alone.
    ///
    /// # Errors
    ///
    /// See [`analyze`](Self::analyze).
    pub fn doe_anova<T: TabularData + ?Sized>(
        &self,
        table: &T,
        response: &str,
        factors: &[&str],
    ) -> Result<FitResult> {
        self.analyze(table, AnalysisKind::DoeAnova, response, &owned(factors), None)
    }

    /// Main-effects ANOVA, without fallback.
    ///
    /// # Errors
    ///
    /// See [`analyze`](Self::analyze).
    pub fn main_effects_anova<T: TabularData + ?Sized>(
        &self,
        table: &T,
        response: &str,
        factors: &[&str],
        label: Option<&str>,
    ) -> Result<FitResult> {
        self.analyze(table, AnalysisKind::MainEffects, response, &owned(factors), label)
    }

    /// Quadratic response-surface fit, without fallback.
    ///
    /// # Errors
    ///
    /// See [`analyze`](Self::analyze). Rows with a non-numeric factor value
    /// are dropped before fitting.
    pub fn rsm_quadratic<T: TabularData + ?Sized>(
        &self,
        table: &T,
        response: &str,
        factors: &[&str],
        label: Option<&str>,
    ) -> Result<FitResult> {
        self.analyze(table, AnalysisKind::RsmQuadratic, response, &owned(factors), label)
    }

    fn walk<T: TabularData + ?Sized>(
        &self,
        table: &T,
        prepared: &Prepared,
        chain: Vec<ModelSpec>,
        kind: Option<AnalysisKind>,
        label: Option<&str>,
    ) -> Result<FitResult> {
        let mut rejected = Vec::new();

        for (index, spec) in chain.into_iter().enumerate() {
            let formula_text = spec.formula().to_string();
            match self.attempt(table, prepared, &spec, index) {
                Ok(mut result) => {
                    tracing::debug!(
                        index,
                        formula = %formula_text,
                        df_resid = result.df_resid,
                        "candidate fitted"
                    );
                    result.kind = kind;
                    result.label = label.map(str::to_string);
                    result.rejected = rejected;
                    return Ok(result);
                }
                Err(reason) => {
                    tracing::debug!(index, formula = %formula_text, %reason, "candidate rejected");
                    rejected.push(CandidateFailure {
                        formula: formula_text,
                        reason,
                    });
                }
            }
        }

        Err(Error::ModelUnidentifiable { attempts: rejected })
    }

    fn attempt<T: TabularData + ?Sized>(
        &self,
        table: &T,
        prepared: &Prepared,
        spec: &ModelSpec,
        index: usize,
    ) -> Result<FitResult, String> {
        let formula = spec.formula();
        let model = encode(table, &prepared.rows, &formula)?;
        let y = prepared.y.view();

        let fit = self
            .solver
            .solve(model.x.view(), y)
            .map_err(|e| e.to_string())?;

        let n = prepared.rows.len();
        if fit.rank >= n {
            return Err(format!(
                "no residual degrees of freedom ({n} observations, {} estimable parameters)",
                fit.rank
            ));
        }
        let df_resid = n - fit.rank;

        let anova = type_two(
            formula.terms(),
            &model,
            y,
            fit.rss,
            df_resid,
            &self.solver,
            &self.distribution,
        )
        .map_err(|e| e.to_string())?;

        let mean = prepared.y.mean().unwrap_or(f64::NAN);
        let constant = prepared.y.iter().all(|&v| v == prepared.y[0]);
        let tss: f64 = prepared.y.iter().map(|v| (v - mean).powi(2)).sum();
        let (r_squared, adj_r_squared) = if constant {
            (f64::NAN, f64::NAN)
        } else {
            let r2 = 1.0 - fit.rss / tss;
            (r2, 1.0 - (1.0 - r2) * (n as f64 - 1.0) / df_resid as f64)
        };

        let mut coefficients = Vec::new();
        let mut aliased = Vec::new();
        for (name, estimate) in model.names.iter().zip(&fit.coefficients) {
            match estimate {
                Some(estimate) => coefficients.push(Coefficient {
                    name: name.clone(),
                    estimate: *estimate,
                }),
                None => aliased.push(name.clone()),
            }
        }

        Ok(FitResult {
            label: None,
            kind: None,
            formula: formula.to_string(),
            fallback: FallbackLevel::from_candidate(index, &spec.class),
            candidate_index: index,
            rejected: Vec::new(),
            anova,
            coefficients,
            aliased,
            r_squared,
            adj_r_squared,
            n_obs: n,
            df_model: fit.rank.saturating_sub(1),
            df_resid,
            observations: prepared.rows.clone(),
            residuals: fit.residuals.to_vec(),
            fitted: fit.fitted.to_vec(),
            spec: spec.clone(),
        })
    }
}

fn owned(factors: &[&str]) -> Vec<String> {
    factors.iter().map(|f| (*f).to_string()).collect()
}
