//! Error types for the doekit library.
//!
//! This module provides error handling using the `thiserror` crate, with one
//! variant per failure category of design generation and model fitting.

use std::fmt;

use thiserror::Error;

/// A candidate formula that the fitting engine tried and rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateFailure {
    /// Formula text of the rejected candidate.
    pub formula: String,
    /// Why the candidate was rejected.
    pub reason: String,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.formula, self.reason)
    }
}

/// The main error type for the doekit library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ============ Design Errors ============
    /// Design or analysis parameters violate a structural precondition.
    #[error("invalid parameters: {message}")]
    InvalidParameters {
        /// Description of what is invalid.
        message: String,
    },

    /// A generated mixture design has rows that do not sum to one.
    #[error("sum-to-one check failed for rows {rows:?}")]
    SumConstraintViolation {
        /// 0-based indices of the offending rows.
        rows: Vec<usize>,
    },

    // ============ Data Errors ============
    /// A requested response or factor column is absent from the input table.
    #[error("column `{name}` not found in input table")]
    MissingColumn {
        /// Name of the missing column.
        name: String,
    },

    /// Too few complete rows remain after dropping missing values.
    #[error("insufficient data: {available} complete rows, at least {required} required")]
    InsufficientData {
        /// Minimum number of rows needed.
        required: usize,
        /// Rows that survived missing-value filtering.
        available: usize,
    },

    /// Table construction received a column of the wrong length.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension description.
        expected: String,
        /// Actual dimension description.
        actual: String,
    },

    // ============ Fitting Errors ============
    /// Every candidate in the fallback chain failed.
    #[error("no identifiable model: {}", format_attempts(.attempts))]
    ModelUnidentifiable {
        /// Rejected candidates, in the order they were tried.
        attempts: Vec<CandidateFailure>,
    },
}

fn format_attempts(attempts: &[CandidateFailure]) -> String {
    if attempts.is_empty() {
        return "no candidates".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A specialized `Result` type for doekit operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `InvalidParameters` error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a new `MissingColumn` error.
    #[must_use]
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::MissingColumn { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_params("factor count 2 is below 3");
        assert!(err.to_string().contains("invalid parameters"));
        assert!(err.to_string().contains("below 3"));

        let err = Error::InsufficientData {
            required: 3,
            available: 2,
        };
        assert!(err.to_string().contains('2'));
        assert!(err.to_string().contains('3'));

        let err = Error::missing_column("Yield");
        assert!(err.to_string().contains("Yield"));
    }

    #[test]
    fn test_unidentifiable_lists_attempts() {
        let err = Error::ModelUnidentifiable {
            attempts: vec![
                CandidateFailure {
                    formula: "y ~ C(A)".into(),
                    reason: "residual degrees of freedom is 0".into(),
                },
                CandidateFailure {
                    formula: "y ~ C(B)".into(),
                    reason: "residual degrees of freedom is 0".into(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("y ~ C(A)"));
        assert!(text.contains("y ~ C(B)"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = Error::SumConstraintViolation { rows: vec![1, 4] };
        let err2 = Error::SumConstraintViolation { rows: vec![1, 4] };
        let err3 = Error::SumConstraintViolation { rows: vec![2] };

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
