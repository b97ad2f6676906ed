//! Multiple linear regression of a response on numeric predictors.

use ndarray::{Array1, Array2};

use super::descriptive::{check_rows, MIN_ROWS};
use super::fallback::FitEngine;
use super::ols::LeastSquaresSolver;
use super::stats::FDistribution;
use super::types::Coefficient;
use crate::error::{Error, Result};
use crate::table::{duplicated, TabularData};

/// Outcome of [`FitEngine::linear_regression`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegressionResult {
    /// Response column.
    pub response: String,
    /// Predictor columns, in the order given.
    pub predictors: Vec<String>,
    /// Intercept estimate.
    pub intercept: f64,
    /// Slope estimates of the estimable predictors.
    pub coefficients: Vec<Coefficient>,
    /// Predictors that are linear combinations of earlier ones.
    pub aliased: Vec<String>,
    /// Coefficient of determination; NaN for a constant response.
    pub r_squared: f64,
    /// Root mean squared error, `sqrt(RSS / n)`.
    pub rmse: f64,
    /// Number of observations used.
    pub n_obs: usize,
    /// Table row index of each observation used.
    pub observations: Vec<usize>,
    /// Fitted values, one per observation.
    pub fitted: Vec<f64>,
    /// Residuals, one per observation.
    pub residuals: Vec<f64>,
}

impl RegressionResult {
    /// Slope of a named predictor.
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.estimate)
    }
}

impl<S, D> FitEngine<S, D>
where
    S: LeastSquaresSolver,
    D: FDistribution,
{
    /// Regress `response` on `predictors` with an intercept.
    ///
    /// Only rows where the response and every predictor read as numbers
    /// are used.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameters`] for an empty or repeated predictor
    ///   list, a response among the predictors, or unusable values.
    /// - [`Error::MissingColumn`] if a column is absent.
    /// - [`Error::InsufficientData`] if the table or the complete rows
    ///   number fewer than three.
    pub fn linear_regression<T: TabularData + ?Sized>(
        &self,
        table: &T,
        response: &str,
        predictors: &[&str],
    ) -> Result<RegressionResult> {
        check_rows(table)?;
        if predictors.is_empty() {
            return Err(Error::invalid_params("at least one predictor is required"));
        }
        let repeated = duplicated(predictors.iter().copied());
        if !repeated.is_empty() {
            return Err(Error::invalid_params(format!(
                "predictors listed more than once: {repeated:?}"
            )));
        }
        if predictors.contains(&response) {
            return Err(Error::invalid_params(format!(
                "response `{response}` is also listed as a predictor"
            )));
        }
        for &name in std::iter::once(&response).chain(predictors) {
            if !table.has_column(name) {
                return Err(Error::missing_column(name));
            }
        }

        let mut observations = Vec::new();
        let mut y = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        for row in 0..table.n_rows() {
            let Some(value) = table.cell(row, response).and_then(|c| c.as_f64()) else {
                continue;
            };
            let x: Option<Vec<f64>> = predictors
                .iter()
                .map(|p| table.cell(row, p).and_then(|c| c.as_f64()))
                .collect();
            if let Some(x) = x {
                observations.push(row);
                y.push(value);
                rows.push(x);
            }
        }

        let n = observations.len();
        if n < MIN_ROWS {
            return Err(Error::InsufficientData {
                required: MIN_ROWS,
                available: n,
            });
        }

        let p = predictors.len();
        let x = Array2::from_shape_fn((n, p + 1), |(i, j)| if j == 0 { 1.0 } else { rows[i][j - 1] });
        let y = Array1::from(y);
        let fit = self
            .solver()
            .solve(x.view(), y.view())
            .map_err(|e| Error::invalid_params(e.to_string()))?;

        let mut coefficients = Vec::new();
        let mut aliased = Vec::new();
        for (name, estimate) in predictors.iter().zip(&fit.coefficients[1..]) {
            match estimate {
                Some(estimate) => coefficients.push(Coefficient {
                    name: (*name).to_string(),
                    estimate: *estimate,
                }),
                None => aliased.push((*name).to_string()),
            }
        }

        let mean = y.mean().unwrap_or(f64::NAN);
        let tss: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
        let r_squared = if y.iter().all(|&v| v == y[0]) {
            f64::NAN
        } else {
            1.0 - fit.rss / tss
        };
        let rmse = (fit.rss / n as f64).sqrt();

        tracing::debug!(
            response,
            predictors = p,
            n_obs = n,
            r_squared,
            aliased = aliased.len(),
            "linear regression fitted"
        );

        Ok(RegressionResult {
            response: response.to_string(),
            predictors: predictors.iter().map(|s| (*s).to_string()).collect(),
            intercept: fit.coefficients[0].unwrap_or(f64::NAN),
            coefficients,
            aliased,
            r_squared,
            rmse,
            n_obs: n,
            observations,
            fitted: fit.fitted.to_vec(),
            residuals: fit.residuals.to_vec(),
        })
    }
}
