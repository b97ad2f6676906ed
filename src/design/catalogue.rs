//! Catalogue of literal Taguchi orthogonal arrays.
//!
//! The tables are reproduced exactly as published, with levels coded as
//! small positive integers. Requesting fewer factors than a table has
//! columns keeps the leftmost columns.

use std::fmt;
use std::str::FromStr;

use super::{numbered_names, DesignKind, DesignMatrix, Level};
use crate::error::{Error, Result};

const L4: [[u8; 3]; 4] = [[1, 1, 1], [1, 2, 2], [2, 1, 2], [2, 2, 1]];

const L8: [[u8; 7]; 8] = [
    [1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 2, 2, 2, 2],
    [1, 2, 2, 1, 1, 2, 2],
    [1, 2, 2, 2, 2, 1, 1],
    [2, 1, 2, 1, 2, 1, 2],
    [2, 1, 2, 2, 1, 2, 1],
    [2, 2, 1, 1, 2, 2, 1],
    [2, 2, 1, 2, 1, 1, 2],
];

const L9: [[u8; 4]; 9] = [
    [1, 1, 1, 1],
    [1, 2, 2, 2],
    [1, 3, 3, 3],
    [2, 1, 2, 3],
    [2, 2, 3, 1],
    [2, 3, 1, 2],
    [3, 1, 3, 2],
    [3, 2, 1, 3],
    [3, 3, 2, 1],
];

/// A standard Taguchi table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaguchiTable {
    /// L4(2^3): 4 runs, 3 two-level columns.
    L4,
    /// L8(2^7): 8 runs, 7 two-level columns.
    L8,
    /// L9(3^4): 9 runs, 4 three-level columns.
    L9,
}

impl TaguchiTable {
    /// Every table in the catalogue.
    pub const ALL: [Self; 3] = [Self::L4, Self::L8, Self::L9];

    /// Standard name of the table.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::L4 => "L4",
            Self::L8 => "L8",
            Self::L9 => "L9",
        }
    }

    /// Number of runs.
    #[must_use]
    pub fn runs(self) -> usize {
        match self {
            Self::L4 => L4.len(),
            Self::L8 => L8.len(),
            Self::L9 => L9.len(),
        }
    }

    /// Number of columns available.
    #[must_use]
    pub fn columns(self) -> usize {
        match self {
            Self::L4 => L4[0].len(),
            Self::L8 => L8[0].len(),
            Self::L9 => L9[0].len(),
        }
    }

    /// Levels per column.
    #[must_use]
    pub fn levels(self) -> u8 {
        match self {
            Self::L4 | Self::L8 => 2,
            Self::L9 => 3,
        }
    }

    fn rows(self) -> Vec<&'static [u8]> {
        match self {
            Self::L4 => L4.iter().map(|r| r.as_slice()).collect(),
            Self::L8 => L8.iter().map(|r| r.as_slice()).collect(),
            Self::L9 => L9.iter().map(|r| r.as_slice()).collect(),
        }
    }

    /// The leftmost `factors` columns of this table as a design.
    ///
    /// # Errors
    ///
    /// Returns an error if `factors` is 0 or exceeds [`columns`](Self::columns).
    pub fn truncated(self, factors: usize) -> Result<DesignMatrix> {
        if factors == 0 || factors > self.columns() {
            return Err(Error::invalid_params(format!(
                "{} has {} columns, cannot assign {factors} factors",
                self.name(),
                self.columns()
            )));
        }

        let rows = self
            .rows()
            .into_iter()
            .map(|row| {
                row[..factors]
                    .iter()
                    .map(|&v| Level::Int(i64::from(v)))
                    .collect()
            })
            .collect();

        DesignMatrix::from_rows(
            DesignKind::OrthogonalArray,
            numbered_names("F", factors),
            rows,
        )
    }
}

impl FromStr for TaguchiTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "L4" => Ok(Self::L4),
            "L8" => Ok(Self::L8),
            "L9" => Ok(Self::L9),
            _ => Err(Error::invalid_params(format!(
                "Unknown standard array: {s}"
            ))),
        }
    }
}

impl fmt::Display for TaguchiTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Retrieve the leftmost `factors` columns of a table by its standard name.
///
/// # Errors
///
/// Returns an error for an unknown table name or a factor count the table
/// cannot hold.
///
/// # Example
///
/// ```
/// use doekit::design::orthogonal_array;
///
/// let design = orthogonal_array(3, "L9").unwrap();
/// assert_eq!(design.runs(), 9);
/// assert_eq!(design.factors(), 3);
/// ```
pub fn orthogonal_array(factors: usize, name: &str) -> Result<DesignMatrix> {
    name.parse::<TaguchiTable>()?.truncated(factors)
}

/// List all available standard arrays.
#[must_use]
pub fn list_standard_arrays() -> Vec<&'static str> {
    TaguchiTable::ALL.iter().map(|t| t.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_rows(design: &DesignMatrix) -> Vec<Vec<i64>> {
        design
            .iter_runs()
            .map(|r| r.values().iter().map(|v| v.as_int().unwrap()).collect())
            .collect()
    }

    #[test]
    fn test_l4_exact() {
        let design = orthogonal_array(3, "L4").unwrap();
        assert_eq!(
            int_rows(&design),
            vec![vec![1, 1, 1], vec![1, 2, 2], vec![2, 1, 2], vec![2, 2, 1]]
        );
        assert_eq!(design.columns(), &["F1", "F2", "F3"]);
    }

    #[test]
    fn test_too_many_factors() {
        assert!(matches!(
            orthogonal_array(4, "L4"),
            Err(Error::InvalidParameters { .. })
        ));
        assert!(orthogonal_array(0, "L8").is_err());
    }

    #[test]
    fn test_unknown_table() {
        assert!(matches!(
            orthogonal_array(2, "L18"),
            Err(Error::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_left_truncation() {
        let full = int_rows(&orthogonal_array(7, "l8").unwrap());
        let part = int_rows(&orthogonal_array(3, "L8").unwrap());
        for (f, p) in full.iter().zip(&part) {
            assert_eq!(&f[..3], p.as_slice());
        }
    }

    #[test]
    fn test_tables_are_orthogonal() {
        for table in TaguchiTable::ALL {
            let rows = int_rows(&table.truncated(table.columns()).unwrap());
            assert_eq!(rows.len(), table.runs());
            let s = i64::from(table.levels());
            let per_pair = table.runs() as i64 / (s * s);

            for i in 0..table.columns() {
                for j in (i + 1)..table.columns() {
                    for a in 1..=s {
                        for b in 1..=s {
                            let count = rows.iter().filter(|r| r[i] == a && r[j] == b).count();
                            assert_eq!(count as i64, per_pair, "{table}: columns {i},{j}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_list() {
        assert_eq!(list_standard_arrays(), vec!["L4", "L8", "L9"]);
    }
}
