//! One-way ANOVA of a numeric response across the levels of one factor.

use std::collections::HashMap;

use super::descriptive::check_rows;
use super::fallback::FitEngine;
use super::ols::LeastSquaresSolver;
use super::stats::FDistribution;
use crate::design::Level;
use crate::error::{Error, Result};
use crate::table::TabularData;

/// Statistics of the response within one factor level.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupSummary {
    /// Factor level, as displayed.
    pub level: String,
    /// Observations in the group.
    pub count: usize,
    /// Group mean.
    pub mean: f64,
    /// Sample standard deviation; NaN for a single observation.
    pub std: f64,
    /// Smallest observation.
    pub min: f64,
    /// Largest observation.
    pub max: f64,
}

impl GroupSummary {
    fn new(level: String, values: &[f64]) -> Self {
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };
        Self {
            level,
            count,
            mean,
            std,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Result of a one-way ANOVA.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OneWayAnova {
    /// Response column.
    pub response: String,
    /// Grouping column.
    pub factor: String,
    /// Between-group sum of squares.
    pub ss_between: f64,
    /// Within-group sum of squares.
    pub ss_within: f64,
    /// Groups minus one.
    pub df_between: usize,
    /// Observations minus groups.
    pub df_within: usize,
    /// F statistic; infinite when every group is constant but the means
    /// differ, NaN when every observation is equal.
    pub f_statistic: f64,
    /// Upper-tail p-value of `f_statistic`.
    pub p_value: f64,
    /// Groups in order of first appearance.
    pub groups: Vec<GroupSummary>,
}

impl OneWayAnova {
    /// Whether the group means differ at level `alpha`.
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Summary of a named level.
    #[must_use]
    pub fn group(&self, level: &str) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.level == level)
    }

    /// Total observations used.
    #[must_use]
    pub fn n_obs(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }
}

impl<S, D> FitEngine<S, D>
where
    S: LeastSquaresSolver,
    D: FDistribution,
{
    /// Compare the mean of `response` across the levels of `factor`.
    ///
    /// Rows with a missing factor cell or a non-numeric response are
    /// dropped; a level left without observations is not a group.
    ///
    /// # Errors
    ///
    /// - [`Error::InsufficientData`] for a table with fewer than three
    ///   rows, or when no observation is left beyond one per group.
    /// - [`Error::InvalidParameters`] if `response` equals `factor` or
    ///   fewer than two groups remain.
    /// - [`Error::MissingColumn`] if either column is absent.
    pub fn one_way_anova<T: TabularData + ?Sized>(
        &self,
        table: &T,
        response: &str,
        factor: &str,
    ) -> Result<OneWayAnova> {
        check_rows(table)?;
        if response == factor {
            return Err(Error::invalid_params(format!(
                "`{response}` cannot be both the response and the factor"
            )));
        }
        for name in [response, factor] {
            if !table.has_column(name) {
                return Err(Error::missing_column(name));
            }
        }

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
        for row in 0..table.n_rows() {
            let Some(level) = table.cell(row, factor).filter(|c| !c.is_missing()) else {
                continue;
            };
            let Some(value) = table.cell(row, response).and_then(Level::as_f64) else {
                continue;
            };
            let key = level.to_string();
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(value);
        }

        let k = groups.len();
        if k < 2 {
            return Err(Error::invalid_params(format!(
                "one-way ANOVA needs at least 2 groups in `{factor}`, found {k}"
            )));
        }
        let n: usize = groups.iter().map(|(_, v)| v.len()).sum();
        if n <= k {
            return Err(Error::InsufficientData {
                required: k + 1,
                available: n,
            });
        }

        let summaries: Vec<GroupSummary> = groups
            .iter()
            .map(|(level, values)| GroupSummary::new(level.clone(), values))
            .collect();

        let grand = summaries.iter().map(|g| g.mean * g.count as f64).sum::<f64>() / n as f64;
        let ss_between: f64 = summaries
            .iter()
            .map(|g| g.count as f64 * (g.mean - grand).powi(2))
            .sum();
        let ss_within: f64 = groups
            .iter()
            .zip(&summaries)
            .map(|((_, values), g)| values.iter().map(|v| (v - g.mean).powi(2)).sum::<f64>())
            .sum();

        let df_between = k - 1;
        let df_within = n - k;
        let ms_within = ss_within / df_within as f64;
        let f_statistic = if ms_within > 0.0 {
            (ss_between / df_between as f64) / ms_within
        } else if ss_between > 0.0 {
            f64::INFINITY
        } else {
            f64::NAN
        };
        let p_value = if f_statistic.is_infinite() {
            0.0
        } else {
            self.distribution()
                .survival(f_statistic, df_between as f64, df_within as f64)
        };

        tracing::debug!(
            factor,
            response,
            groups = k,
            f_statistic,
            p_value,
            "one-way ANOVA computed"
        );

        Ok(OneWayAnova {
            response: response.to_string(),
            factor: factor.to_string(),
            ss_between,
            ss_within,
            df_between,
            df_within,
            f_statistic,
            p_value,
            groups: summaries,
        })
    }
}
