//! Descriptive statistics and Pearson correlation.
//!
//! Both analyses look only at the numeric columns of a table (see
//! [`TabularData::numeric_columns`]) and accept any table with at least
//! [`MIN_ROWS`] rows. Missing cells are skipped column by column, or pair
//! by pair for correlations.

use std::fmt;

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::table::TabularData;
use crate::utils::combinations;

/// Fewest rows the general-purpose analyses accept.
pub const MIN_ROWS: usize = 3;

/// Pairs with |r| strictly above this are reported as strongly correlated.
pub const STRONG_CORRELATION: f64 = 0.7;

pub(crate) fn check_rows<T: TabularData + ?Sized>(table: &T) -> Result<()> {
    let available = table.n_rows();
    if available < MIN_ROWS {
        return Err(Error::InsufficientData {
            required: MIN_ROWS,
            available,
        });
    }
    Ok(())
}

/// Summary statistics of one numeric column.
///
/// Quartiles interpolate linearly between order statistics. Statistics of
/// a column without values are NaN, as is `std` for a single value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSummary {
    /// Column name.
    pub name: String,
    /// Non-missing values.
    pub count: usize,
    /// Missing or non-numeric cells.
    pub missing: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    /// Smallest value.
    pub min: f64,
    /// 25th percentile.
    pub q1: f64,
    /// Median.
    pub median: f64,
    /// 75th percentile.
    pub q3: f64,
    /// Largest value.
    pub max: f64,
}

impl ColumnSummary {
    fn from_cells(name: &str, cells: &[Option<f64>]) -> Self {
        let mut values: Vec<f64> = cells.iter().flatten().copied().collect();
        values.sort_by(f64::total_cmp);
        let count = values.len();

        let mean = if count == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / count as f64
        };
        let std = if count > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Self {
            name: name.to_string(),
            count,
            missing: cells.len() - count,
            mean,
            std,
            min: values.first().copied().unwrap_or(f64::NAN),
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Linearly interpolated quantile of sorted values.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Per-column summaries of every numeric column.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptiveSummary {
    /// One summary per numeric column, in table order.
    pub columns: Vec<ColumnSummary>,
    /// Rows in the table, missing cells included.
    pub observations: usize,
}

impl DescriptiveSummary {
    /// Number of numeric columns summarised.
    #[must_use]
    pub fn variables(&self) -> usize {
        self.columns.len()
    }

    /// Summary of a named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Summarise every numeric column of `table`.
///
/// # Errors
///
/// - [`Error::InsufficientData`] for fewer than [`MIN_ROWS`] rows.
/// - [`Error::InvalidParameters`] if the table has no numeric column.
///
/// # Example
///
/// ```
/// use doekit::analysis::describe;
/// use doekit::design::full_factorial;
///
/// let table = full_factorial(&[2, 2])
///     .unwrap()
///     .with_response("y", vec![1.0, 2.0, 3.0, 6.0])
///     .unwrap();
///
/// let summary = describe(&table).unwrap();
/// assert_eq!(summary.variables(), 3);
/// assert_eq!(summary.column("y").unwrap().mean, 3.0);
/// ```
pub fn describe<T: TabularData + ?Sized>(table: &T) -> Result<DescriptiveSummary> {
    check_rows(table)?;
    let names = table.numeric_columns();
    if names.is_empty() {
        return Err(Error::invalid_params("no numeric columns to describe"));
    }

    let columns: Vec<ColumnSummary> = names
        .iter()
        .filter_map(|name| {
            let cells = table.numeric_cells(name)?;
            Some(ColumnSummary::from_cells(name, &cells))
        })
        .collect();

    tracing::debug!(
        variables = columns.len(),
        observations = table.n_rows(),
        "descriptive statistics computed"
    );

    Ok(DescriptiveSummary {
        columns,
        observations: table.n_rows(),
    })
}

/// Verbal grade of a correlation coefficient's magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorrelationStrength {
    /// |r| < 0.3
    VeryWeak,
    /// 0.3 <= |r| < 0.5
    Weak,
    /// 0.5 <= |r| < 0.7
    Moderate,
    /// 0.7 <= |r| < 0.9
    Strong,
    /// |r| >= 0.9
    VeryStrong,
}

impl CorrelationStrength {
    /// Grade of `r`; NaN grades as very weak.
    #[must_use]
    pub fn from_r(r: f64) -> Self {
        let a = r.abs();
        if a >= 0.9 {
            Self::VeryStrong
        } else if a >= 0.7 {
            Self::Strong
        } else if a >= 0.5 {
            Self::Moderate
        } else if a >= 0.3 {
            Self::Weak
        } else {
            Self::VeryWeak
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VeryWeak => "very weak",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
            Self::VeryStrong => "very strong",
        })
    }
}

/// Symmetric matrix of pairwise Pearson coefficients.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelationMatrix {
    /// Column names, indexing both axes.
    pub names: Vec<String>,
    /// Coefficients; NaN where a column has no spread.
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[[i, j]])
    }
}

/// Two columns whose correlation exceeds [`STRONG_CORRELATION`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelatedPair {
    /// Earlier column.
    pub first: String,
    /// Later column.
    pub second: String,
    /// Pearson coefficient.
    pub r: f64,
    /// Grade of `r`.
    pub strength: CorrelationStrength,
}

/// Outcome of [`correlation`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelationReport {
    /// Full matrix over the numeric columns.
    pub matrix: CorrelationMatrix,
    /// Strongly correlated pairs, in column order.
    pub strong_pairs: Vec<CorrelatedPair>,
    /// Number of distinct column pairs, k(k-1)/2.
    pub total_pairs: usize,
}

/// Pearson coefficient over the rows where both values are present.
///
/// NaN when fewer than two such rows remain or either side is constant.
#[must_use]
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        sxx += (a - mx) * (a - mx);
        syy += (b - my) * (b - my);
        sxy += (a - mx) * (b - my);
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Pearson correlation between every pair of numeric columns.
///
/// # Errors
///
/// - [`Error::InsufficientData`] for fewer than [`MIN_ROWS`] rows.
/// - [`Error::InvalidParameters`] for fewer than two numeric columns.
pub fn correlation<T: TabularData + ?Sized>(table: &T) -> Result<CorrelationReport> {
    check_rows(table)?;
    let names: Vec<String> = table
        .numeric_columns()
        .into_iter()
        .map(str::to_string)
        .collect();
    let k = names.len();
    if k < 2 {
        return Err(Error::invalid_params(format!(
            "correlation needs at least 2 numeric columns, found {k}"
        )));
    }

    let cells: Vec<Vec<Option<f64>>> = names
        .iter()
        .map(|name| table.numeric_cells(name).unwrap_or_default())
        .collect();

    let mut values = Array2::<f64>::from_elem((k, k), f64::NAN);
    for (i, column) in cells.iter().enumerate() {
        if !pearson(column, column).is_nan() {
            values[[i, i]] = 1.0;
        }
    }

    let mut strong_pairs = Vec::new();
    let mut total_pairs = 0;
    for pair in combinations(k, 2) {
        let (i, j) = (pair[0], pair[1]);
        let r = pearson(&cells[i], &cells[j]);
        values[[i, j]] = r;
        values[[j, i]] = r;
        total_pairs += 1;
        if r.abs() > STRONG_CORRELATION {
            strong_pairs.push(CorrelatedPair {
                first: names[i].clone(),
                second: names[j].clone(),
                r,
                strength: CorrelationStrength::from_r(r),
            });
        }
    }

    tracing::debug!(
        variables = k,
        total_pairs,
        strong = strong_pairs.len(),
        "correlation matrix computed"
    );

    Ok(CorrelationReport {
        matrix: CorrelationMatrix { names, values },
        strong_pairs,
        total_pairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Level;
    use crate::table::DataTable;

    fn reals(values: &[f64]) -> Vec<Level> {
        values.iter().map(|&v| Level::Real(v)).collect()
    }

    #[test]
    fn test_describe_skips_missing() {
        let table = DataTable::from_columns(vec![
            (
                "x",
                vec![
                    Level::Int(1),
                    Level::Int(2),
                    Level::Missing,
                    Level::Int(3),
                    Level::Int(4),
                ],
            ),
            ("label", vec![Level::from("a"); 5]),
            ("y", reals(&[2.0, 2.0, 2.0, 2.0, 2.0])),
        ])
        .unwrap();
        let summary = describe(&table).unwrap();

        assert_eq!(summary.observations, 5);
        assert_eq!(summary.variables(), 2);
        assert!(summary.column("label").is_none());

        let x = summary.column("x").unwrap();
        assert_eq!((x.count, x.missing), (4, 1));
        assert!((x.mean - 2.5).abs() < 1e-12);
        assert!((x.std - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!((x.min, x.max), (1.0, 4.0));
        assert!((x.q1 - 1.75).abs() < 1e-12);
        assert!((x.median - 2.5).abs() < 1e-12);
        assert!((x.q3 - 3.25).abs() < 1e-12);

        let y = summary.column("y").unwrap();
        assert_eq!(y.std, 0.0);
    }

    #[test]
    fn test_describe_preconditions() {
        let short = DataTable::new().with_numeric_column("y", vec![1.0, 2.0]).unwrap();
        assert_eq!(
            describe(&short),
            Err(Error::InsufficientData {
                required: 3,
                available: 2
            })
        );
        assert_eq!(
            describe(&DataTable::new()),
            Err(Error::InsufficientData {
                required: 3,
                available: 0
            })
        );

        let text = DataTable::from_columns(vec![("g", vec![Level::from("a"); 3])]).unwrap();
        assert!(matches!(
            describe(&text),
            Err(Error::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_single_value_column() {
        let table = DataTable::from_columns(vec![(
            "x",
            vec![Level::Missing, Level::Real(7.0), Level::Missing],
        )])
        .unwrap();
        let x = describe(&table).unwrap().columns.remove(0);
        assert_eq!(x.count, 1);
        assert!(x.std.is_nan());
        assert_eq!((x.min, x.q1, x.median, x.q3, x.max), (7.0, 7.0, 7.0, 7.0, 7.0));
    }

    #[test]
    fn test_correlation_flags_strong_pairs() {
        let table = DataTable::from_columns(vec![
            ("x", reals(&[1.0, 2.0, 3.0, 4.0])),
            ("g", vec![Level::from("a"); 4]),
            ("double", reals(&[2.0, 4.0, 6.0, 8.0])),
            ("neg", reals(&[-1.0, -2.0, -3.0, -4.0])),
            ("wave", reals(&[1.0, -1.0, -1.0, 1.0])),
        ])
        .unwrap();
        let report = correlation(&table).unwrap();

        assert_eq!(report.matrix.names, vec!["x", "double", "neg", "wave"]);
        assert_eq!(report.total_pairs, 6);
        assert_eq!(report.strong_pairs.len(), 3);
        let first = &report.strong_pairs[0];
        assert_eq!((first.first.as_str(), first.second.as_str()), ("x", "double"));
        assert!((first.r - 1.0).abs() < 1e-12);
        assert_eq!(first.strength, CorrelationStrength::VeryStrong);
        assert!((report.matrix.get("neg", "x").unwrap() + 1.0).abs() < 1e-12);
        assert!(report.matrix.get("x", "wave").unwrap().abs() < 1e-12);
        assert_eq!(report.matrix.get("wave", "wave"), Some(1.0));
        assert_eq!(report.matrix.get("x", "g"), None);
    }

    #[test]
    fn test_correlation_pairwise_complete() {
        let x = [Some(1.0), Some(2.0), None, Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(100.0), Some(6.0)];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);

        let constant = [Some(1.0), Some(1.0), Some(1.0), Some(1.0)];
        assert!(pearson(&x, &constant).is_nan());
        assert!(pearson(&[Some(1.0), None], &[Some(1.0), Some(2.0)]).is_nan());
    }

    #[test]
    fn test_correlation_needs_two_columns() {
        let table = DataTable::new().with_numeric_column("y", vec![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(
            correlation(&table),
            Err(Error::InvalidParameters { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_report_serializes() {
        let table = DataTable::from_columns(vec![
            ("x", reals(&[1.0, 2.0, 3.0])),
            ("y", reals(&[3.0, 2.0, 1.0])),
        ])
        .unwrap();
        let report = correlation(&table).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_pairs"], 1);
        assert_eq!(json["strong_pairs"][0]["strength"], "VeryStrong");
        assert_eq!(json["matrix"]["names"][1], "y");
    }

    #[test]
    fn test_strength_grades() {
        assert_eq!(CorrelationStrength::from_r(-0.95), CorrelationStrength::VeryStrong);
        assert_eq!(CorrelationStrength::from_r(0.7), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_r(0.55), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_r(-0.3), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_r(f64::NAN), CorrelationStrength::VeryWeak);
        assert_eq!(CorrelationStrength::Strong.to_string(), "strong");
    }
}
