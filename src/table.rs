//! Tabular data consumed by the fitting engine.
//!
//! Analysis reads columns by name through the [`TabularData`] trait, which
//! both [`DataTable`] and [`DesignMatrix`] implement. Tables follow value
//! semantics: adding a column returns a new table.
//!
//! # Example
//!
//! ```
//! use doekit::design::full_factorial;
//! use doekit::table::TabularData;
//!
//! let table = full_factorial(&[2, 2])
//!     .unwrap()
//!     .with_response("y", vec![1.0, 2.0, 3.0, 4.0])
//!     .unwrap();
//!
//! assert_eq!(table.n_rows(), 4);
//! assert_eq!(table.column_names(), vec!["F1", "F2", "y"]);
//! ```

use std::collections::BTreeSet;

use crate::design::{DesignMatrix, Level};
use crate::error::{Error, Result};

/// Broad type of a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnKind {
    /// Only integer (or missing) cells.
    Integer,
    /// Numeric cells with at least one real value.
    Real,
    /// At least one label.
    Text,
    /// Every cell missing.
    Empty,
}

/// Read access to a rectangular table with named columns.
pub trait TabularData {
    /// Number of rows.
    fn n_rows(&self) -> usize;

    /// Column names in order.
    fn column_names(&self) -> Vec<&str>;

    /// Cell at `row` in column `name`, or `None` if the column is absent.
    fn cell(&self, row: usize, name: &str) -> Option<&Level>;

    /// Whether a column exists.
    fn has_column(&self, name: &str) -> bool {
        self.column_names().contains(&name)
    }

    /// Broad type of a column, or `None` if it is absent.
    fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        if !self.has_column(name) {
            return None;
        }
        let mut kind = ColumnKind::Empty;
        for row in 0..self.n_rows() {
            match self.cell(row, name)? {
                Level::Label(_) => return Some(ColumnKind::Text),
                Level::Real(v) if !v.is_nan() => kind = ColumnKind::Real,
                Level::Int(_) if kind == ColumnKind::Empty => kind = ColumnKind::Integer,
                _ => {}
            }
        }
        Some(kind)
    }

    /// Names of the columns whose kind is [`ColumnKind::Integer`] or
    /// [`ColumnKind::Real`], in order.
    fn numeric_columns(&self) -> Vec<&str> {
        self.column_names()
            .into_iter()
            .filter(|name| {
                matches!(
                    self.column_kind(name),
                    Some(ColumnKind::Integer | ColumnKind::Real)
                )
            })
            .collect()
    }

    /// A column coerced cell by cell to numbers, or `None` if it is absent.
    fn numeric_cells(&self, name: &str) -> Option<Vec<Option<f64>>> {
        if !self.has_column(name) {
            return None;
        }
        Some(
            (0..self.n_rows())
                .map(|row| self.cell(row, name).and_then(Level::as_f64))
                .collect(),
        )
    }
}

/// Column-oriented in-memory table.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataTable {
    names: Vec<String>,
    columns: Vec<Vec<Level>>,
    rows: usize,
}

impl DataTable {
    /// An empty table with no columns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the columns differ in length
    /// and [`Error::InvalidParameters`] for repeated names.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<Level>)>) -> Result<Self> {
        columns
            .into_iter()
            .try_fold(Self::new(), |table, (name, values)| {
                table.with_column(name, values)
            })
    }

    /// A new table with one more column appended.
    ///
    /// The first column fixes the row count of the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the length differs from the row count or the
    /// name is already taken.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Level>) -> Result<Self> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(Error::invalid_params(format!(
                "column `{name}` already exists"
            )));
        }
        if self.names.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(Error::DimensionMismatch {
                expected: format!("{} rows", self.rows),
                actual: format!("{} rows in column `{name}`", values.len()),
            });
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(self)
    }

    /// A new table with a numeric column appended.
    ///
    /// # Errors
    ///
    /// See [`with_column`](Self::with_column).
    pub fn with_numeric_column(self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.with_column(name, values.into_iter().map(Level::Real).collect())
    }

    /// Values of a named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Level]> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[idx])
    }

    /// A named column coerced to numbers; uncoercible cells become `None`.
    #[must_use]
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name)
            .map(|values| values.iter().map(Level::as_f64).collect())
    }

    /// Number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    /// Keep only the given rows, in order.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| indices.iter().map(|&i| col[i].clone()).collect())
                .collect(),
            rows: indices.len(),
        }
    }
}

impl TabularData for DataTable {
    fn n_rows(&self) -> usize {
        self.rows
    }

    fn column_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    fn cell(&self, row: usize, name: &str) -> Option<&Level> {
        self.column(name)?.get(row)
    }
}

impl TabularData for DesignMatrix {
    fn n_rows(&self) -> usize {
        self.runs()
    }

    fn column_names(&self) -> Vec<&str> {
        self.columns().iter().map(String::as_str).collect()
    }

    fn cell(&self, row: usize, name: &str) -> Option<&Level> {
        self.value(row, name)
    }
}

impl From<DesignMatrix> for DataTable {
    fn from(design: DesignMatrix) -> Self {
        design.into_table()
    }
}

impl DesignMatrix {
    /// Convert the design into a column-oriented table.
    #[must_use]
    pub fn into_table(self) -> DataTable {
        let names = self.columns().to_vec();
        let rows = self.runs();
        let data = self.into_data();
        let columns = data.columns().into_iter().map(|c| c.to_vec()).collect();
        DataTable {
            names,
            columns,
            rows,
        }
    }

    /// Attach measured responses to the design, one per run.
    ///
    /// # Errors
    ///
    /// Returns an error if the response length differs from the run count
    /// or the name clashes with a factor column.
    pub fn with_response(self, name: impl Into<String>, values: Vec<f64>) -> Result<DataTable> {
        self.into_table().with_numeric_column(name, values)
    }
}

/// Names that appear more than once, in first-seen order.
pub(crate) fn duplicated<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    let mut repeated = Vec::new();
    for name in names {
        if !seen.insert(name) && !repeated.contains(&name) {
            repeated.push(name);
        }
    }
    repeated
}
