//! Experimental design generation.
//!
//! This module provides the design matrix type and one generator per design
//! family. Every generator is a pure function of its parameters: it returns a
//! fresh [`DesignMatrix`] or an [`Error`](crate::Error).
//!
//! ## Available Designs
//!
//! | Design | Entry point | Runs |
//! |--------|-------------|------|
//! | Full factorial | [`full_factorial`] | ∏ levels |
//! | Fractional factorial | [`fractional_factorial`] | 2^(base letters) |
//! | Plackett-Burman | [`plackett_burman`] | smallest multiple of 4 > factors |
//! | Box-Behnken | [`box_behnken`] | 4·C(n, 2) + centers |
//! | Central composite | [`central_composite`] | 2^n + 2n + centers |
//! | Taguchi orthogonal array | [`orthogonal_array`] | 4, 8 or 9 |
//! | Simplex-lattice mixture | [`simplex_lattice`] | C(m + q - 1, q - 1) |
//! | Split-plot | [`split_plot`] | whole runs × sub-plot runs |
//! | Custom | [`custom_design`] | caller chosen |
//!
//! ## Usage
//!
//! ```
//! use doekit::design::{generate, DesignSpecification};
//!
//! let spec = DesignSpecification::FullFactorial { levels: vec![2, 3, 2] };
//! let design = generate(&spec).unwrap();
//!
//! assert_eq!(design.runs(), 12);
//! assert_eq!(design.columns(), &["F1", "F2", "F3"]);
//! ```

mod catalogue;
mod custom;
mod factorial;
mod hadamard;
mod mixture;
mod response_surface;
mod screening;
mod split_plot;

pub use catalogue::{list_standard_arrays, orthogonal_array, TaguchiTable};
pub use custom::{custom_design, CustomTemplate};
pub use factorial::{fractional_factorial, full_factorial};
pub use mixture::{check_sum_to_one, simplex_lattice, MIXTURE_SUM_TOLERANCE};
pub use response_surface::{box_behnken, central_composite, Alpha};
pub use screening::{plackett_burman, plackett_burman_runs, MAX_PLACKETT_BURMAN_RUNS};
pub use split_plot::{split_plot, SplitPlotSpec, WHOLE_PLOT_COLUMN};

use std::collections::BTreeSet;
use std::fmt;

use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{Error, Result};

/// A single cell value of a design matrix or data table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Level {
    /// Integer level code (1-based factorial codes, ±1 codes, block ids).
    Int(i64),
    /// Real-valued setting (axial points, mixture proportions, measurements).
    Real(f64),
    /// Category label.
    Label(String),
    /// No value recorded.
    Missing,
}

impl Level {
    /// Numeric value of this cell, if it has one.
    ///
    /// Labels are parsed as `f64`; missing cells and NaN yield `None`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Int(v) => *v as f64,
            Self::Real(v) => *v,
            Self::Label(s) => s.trim().parse::<f64>().ok()?,
            Self::Missing => return None,
        };
        (!value.is_nan()).then_some(value)
    }

    /// Whether this cell counts as missing for analysis.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Real(v) => v.is_nan(),
            Self::Int(_) | Self::Label(_) => false,
        }
    }

    /// Integer code, if this is an integer cell.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Label(s) => f.write_str(s),
            Self::Missing => f.write_str("NA"),
        }
    }
}

impl From<i64> for Level {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Level {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Level {
    fn from(value: &str) -> Self {
        Self::Label(value.to_string())
    }
}

impl From<String> for Level {
    fn from(value: String) -> Self {
        Self::Label(value)
    }
}

/// The closed set of design families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DesignKind {
    /// General mixed-level full factorial.
    FullFactorial,
    /// Two-level fractional factorial from a generator string.
    FractionalFactorial,
    /// Two-level Plackett-Burman screening design.
    PlackettBurman,
    /// Three-level Box-Behnken response surface design.
    BoxBehnken,
    /// Central composite response surface design.
    CentralComposite,
    /// Literal Taguchi orthogonal array.
    OrthogonalArray,
    /// Simplex-lattice mixture design.
    MixtureSimplexLattice,
    /// Split-plot design with nested randomization strata.
    SplitPlot,
    /// Caller-specified template design.
    Custom,
}

impl DesignKind {
    /// Human readable name of the design family.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FullFactorial => "full factorial",
            Self::FractionalFactorial => "fractional factorial",
            Self::PlackettBurman => "Plackett-Burman",
            Self::BoxBehnken => "Box-Behnken",
            Self::CentralComposite => "central composite",
            Self::OrthogonalArray => "orthogonal array",
            Self::MixtureSimplexLattice => "mixture simplex-lattice",
            Self::SplitPlot => "split-plot",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for DesignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What to generate: a design family together with its parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DesignSpecification {
    /// Full factorial over `levels[i]` levels per factor.
    FullFactorial {
        /// Level count per factor.
        levels: Vec<u32>,
    },
    /// Fractional factorial from a generator such as `"a b c abc"`.
    FractionalFactorial {
        /// Whitespace separated generator tokens.
        generator: String,
    },
    /// Plackett-Burman screening design.
    PlackettBurman {
        /// Number of two-level factors (at least 3).
        factors: usize,
    },
    /// Box-Behnken design.
    BoxBehnken {
        /// Number of factors (at least 3).
        factors: usize,
        /// Number of center runs.
        center: usize,
    },
    /// Central composite design.
    CentralComposite {
        /// Number of factors (at least 2).
        factors: usize,
        /// Center runs in the factorial block and in the axial block.
        center: (usize, usize),
        /// Axial distance rule.
        alpha: Alpha,
    },
    /// Taguchi orthogonal array.
    OrthogonalArray {
        /// Number of columns to keep.
        factors: usize,
        /// Source table.
        table: TaguchiTable,
    },
    /// Simplex-lattice mixture design.
    MixtureSimplexLattice {
        /// Number of components (at least 2).
        components: usize,
        /// Lattice degree (at least 2).
        degree: usize,
        /// Optional component names.
        names: Vec<String>,
    },
    /// Split-plot design.
    SplitPlot(SplitPlotSpec),
    /// Template-filled custom design.
    Custom {
        /// Number of factors.
        factors: usize,
        /// Number of runs.
        runs: usize,
        /// Fill template.
        template: CustomTemplate,
    },
}

impl DesignSpecification {
    /// The design family of this specification.
    #[must_use]
    pub fn kind(&self) -> DesignKind {
        match self {
            Self::FullFactorial { .. } => DesignKind::FullFactorial,
            Self::FractionalFactorial { .. } => DesignKind::FractionalFactorial,
            Self::PlackettBurman { .. } => DesignKind::PlackettBurman,
            Self::BoxBehnken { .. } => DesignKind::BoxBehnken,
            Self::CentralComposite { .. } => DesignKind::CentralComposite,
            Self::OrthogonalArray { .. } => DesignKind::OrthogonalArray,
            Self::MixtureSimplexLattice { .. } => DesignKind::MixtureSimplexLattice,
            Self::SplitPlot(_) => DesignKind::SplitPlot,
            Self::Custom { .. } => DesignKind::Custom,
        }
    }
}

/// Generate the design matrix described by `spec`.
///
/// No randomization or replication is applied; see
/// [`DesignBuilder`](crate::DesignBuilder) for that.
///
/// # Errors
///
/// Returns the generator's error for invalid parameters.
pub fn generate(spec: &DesignSpecification) -> Result<DesignMatrix> {
    let design = match spec {
        DesignSpecification::FullFactorial { levels } => full_factorial(levels),
        DesignSpecification::FractionalFactorial { generator } => fractional_factorial(generator),
        DesignSpecification::PlackettBurman { factors } => plackett_burman(*factors),
        DesignSpecification::BoxBehnken { factors, center } => box_behnken(*factors, *center),
        DesignSpecification::CentralComposite {
            factors,
            center,
            alpha,
        } => central_composite(*factors, *center, *alpha),
        DesignSpecification::OrthogonalArray { factors, table } => {
            table.truncated(*factors)
        }
        DesignSpecification::MixtureSimplexLattice {
            components,
            degree,
            names,
        } => simplex_lattice(*components, *degree, names),
        DesignSpecification::SplitPlot(split) => split_plot(split),
        DesignSpecification::Custom {
            factors,
            runs,
            template,
        } => custom_design(*factors, *runs, template),
    }?;

    tracing::debug!(
        kind = %design.kind(),
        runs = design.runs(),
        columns = design.factors(),
        "generated design"
    );
    Ok(design)
}

/// Names `F1..Fn`.
pub(crate) fn numbered_names(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix}{i}")).collect()
}

/// A design matrix: rows are runs, columns are named factors.
///
/// Row order is significant (it is the run order); column names are unique.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DesignMatrix {
    kind: DesignKind,
    columns: Vec<String>,
    data: Array2<Level>,
}

impl DesignMatrix {
    /// Create a design matrix, validating its shape and column names.
    ///
    /// # Errors
    ///
    /// Returns an error if the column count differs from the data width or
    /// if column names repeat.
    pub fn try_new(kind: DesignKind, columns: Vec<String>, data: Array2<Level>) -> Result<Self> {
        if columns.len() != data.ncols() {
            return Err(Error::DimensionMismatch {
                expected: format!("{} columns", columns.len()),
                actual: format!("{} columns", data.ncols()),
            });
        }
        let unique: BTreeSet<&str> = columns.iter().map(String::as_str).collect();
        if unique.len() != columns.len() {
            return Err(Error::invalid_params(format!(
                "column names must be unique, got {columns:?}"
            )));
        }
        Ok(Self {
            kind,
            columns,
            data,
        })
    }

    /// Build a design from row vectors of equal width.
    pub(crate) fn from_rows(
        kind: DesignKind,
        columns: Vec<String>,
        rows: Vec<Vec<Level>>,
    ) -> Result<Self> {
        let width = columns.len();
        let height = rows.len();
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(Error::DimensionMismatch {
                expected: format!("{width} values in row {bad}"),
                actual: format!("{} values", rows[bad].len()),
            });
        }
        let flat: Vec<Level> = rows.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((height, width), flat).map_err(|e| {
            Error::DimensionMismatch {
                expected: format!("{height}x{width} design"),
                actual: e.to_string(),
            }
        })?;
        Self::try_new(kind, columns, data)
    }

    /// The design family that produced this matrix.
    #[must_use]
    pub fn kind(&self) -> DesignKind {
        self.kind
    }

    /// Number of runs (rows).
    #[must_use]
    pub fn runs(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns, including any block column.
    #[must_use]
    pub fn factors(&self) -> usize {
        self.data.ncols()
    }

    /// Column names in display order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a named column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Underlying cell data, shape (runs, columns).
    #[must_use]
    pub fn data(&self) -> &Array2<Level> {
        &self.data
    }

    /// Cell at a specific position.
    ///
    /// # Panics
    ///
    /// Panics if the indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> &Level {
        &self.data[[row, col]]
    }

    /// Cell of a run by column name.
    #[must_use]
    pub fn value(&self, row: usize, name: &str) -> Option<&Level> {
        let col = self.column_index(name)?;
        self.data.get((row, col))
    }

    /// A single run as a name-addressable view.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    #[must_use]
    pub fn run(&self, idx: usize) -> Run<'_> {
        Run {
            columns: &self.columns,
            values: self.data.row(idx),
        }
    }

    /// Iterate over runs in order.
    pub fn iter_runs(&self) -> impl Iterator<Item = Run<'_>> {
        self.data.rows().into_iter().map(|values| Run {
            columns: &self.columns,
            values,
        })
    }

    /// A new design holding the given rows, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            kind: self.kind,
            columns: self.columns.clone(),
            data: self.data.select(Axis(0), indices),
        }
    }

    /// Sum of the numeric cells of each row (non-numeric cells count as 0).
    #[must_use]
    pub fn row_sums(&self) -> Vec<f64> {
        self.data
            .rows()
            .into_iter()
            .map(|row| row.iter().filter_map(Level::as_f64).sum())
            .collect()
    }

    /// Number of distinct values in each column.
    #[must_use]
    pub fn distinct_levels(&self) -> Vec<usize> {
        self.data
            .columns()
            .into_iter()
            .map(|col| {
                let mut seen: Vec<&Level> = Vec::new();
                for v in col {
                    if !seen.contains(&v) {
                        seen.push(v);
                    }
                }
                seen.len()
            })
            .collect()
    }

    /// Rename every column; the new names must be unique and as many as before.
    ///
    /// # Errors
    ///
    /// Returns an error on a count mismatch or duplicate names.
    pub fn with_columns(self, columns: Vec<String>) -> Result<Self> {
        Self::try_new(self.kind, columns, self.data)
    }

    /// Consume the design and return the underlying data.
    #[must_use]
    pub fn into_data(self) -> Array2<Level> {
        self.data
    }
}

impl fmt::Display for DesignMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} design: {} runs x {} columns",
            self.kind,
            self.runs(),
            self.factors()
        )?;
        writeln!(f, "  {}", self.columns.join(" "))?;
        for row in self.data.rows() {
            let row_str: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(f, "  {}", row_str.join(" "))?;
        }
        Ok(())
    }
}

/// One run of a design, addressable by factor name.
#[derive(Debug, Clone)]
pub struct Run<'a> {
    columns: &'a [String],
    values: ArrayView1<'a, Level>,
}

impl<'a> Run<'a> {
    /// Value of a named factor in this run.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a Level> {
        let idx = self.columns.iter().position(|c| c == name)?;
        let values = self.values.clone();
        values.into_iter().nth(idx)
    }

    /// Values in column order.
    #[must_use]
    pub fn values(&self) -> Vec<Level> {
        self.values.to_vec()
    }

    /// `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Level)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_design() -> DesignMatrix {
        DesignMatrix::from_rows(
            DesignKind::Custom,
            vec!["A".into(), "B".into()],
            vec![
                vec![Level::Int(1), Level::Real(0.5)],
                vec![Level::Int(2), Level::Real(0.5)],
                vec![Level::Int(1), Level::Label("x".into())],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_level_coercion() {
        assert_eq!(Level::Int(3).as_f64(), Some(3.0));
        assert_eq!(Level::Real(2.5).as_f64(), Some(2.5));
        assert_eq!(Level::Label(" 4.25 ".into()).as_f64(), Some(4.25));
        assert_eq!(Level::Label("high".into()).as_f64(), None);
        assert_eq!(Level::Missing.as_f64(), None);
        assert_eq!(Level::Real(f64::NAN).as_f64(), None);
        assert!(Level::Real(f64::NAN).is_missing());
        assert!(!Level::Label(String::new()).is_missing());
    }

    #[test]
    fn test_run_access() {
        let design = small_design();
        assert_eq!(design.runs(), 3);
        assert_eq!(design.factors(), 2);

        let run = design.run(1);
        assert_eq!(run.get("A"), Some(&Level::Int(2)));
        assert_eq!(run.get("B"), Some(&Level::Real(0.5)));
        assert_eq!(run.get("C"), None);

        let pairs: Vec<(&str, &Level)> = run.iter().collect();
        assert_eq!(pairs[0], ("A", &Level::Int(2)));
        assert_eq!(design.value(2, "B"), Some(&Level::Label("x".into())));
    }

    #[test]
    fn test_select_rows() {
        let design = small_design();
        let picked = design.select_rows(&[2, 0, 0]);
        assert_eq!(picked.runs(), 3);
        assert_eq!(picked.get(0, 1), &Level::Label("x".into()));
        assert_eq!(picked.get(1, 0), &Level::Int(1));
        assert_eq!(picked.columns(), design.columns());
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = DesignMatrix::from_rows(
            DesignKind::Custom,
            vec!["A".into(), "A".into()],
            vec![vec![Level::Int(1), Level::Int(2)]],
        );
        assert!(matches!(result, Err(Error::InvalidParameters { .. })));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = DesignMatrix::from_rows(
            DesignKind::Custom,
            vec!["A".into(), "B".into()],
            vec![vec![Level::Int(1)]],
        );
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_distinct_levels_and_row_sums() {
        let design = small_design();
        assert_eq!(design.distinct_levels(), vec![2, 2]);
        assert_eq!(design.row_sums(), vec![1.5, 2.5, 1.0]);
    }

    #[test]
    fn test_generate_dispatch() {
        let spec = DesignSpecification::OrthogonalArray {
            factors: 2,
            table: TaguchiTable::L9,
        };
        assert_eq!(spec.kind(), DesignKind::OrthogonalArray);
        let design = generate(&spec).unwrap();
        assert_eq!(design.runs(), 9);
        assert_eq!(design.kind(), DesignKind::OrthogonalArray);
    }
}
