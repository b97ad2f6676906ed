//! Ordinary least squares with rank detection.
//!
//! The [`LeastSquaresSolver`] trait is the seam between the fitting engine
//! and the linear algebra. [`QrSolver`] walks the columns left to right and
//! drops any column that is (numerically) a combination of the ones kept
//! before it. The orthogonalisation is a Householder QR from `faer`. Dropped
//! columns get no coefficient.

use faer::linalg::solvers::Qr;
use faer::Mat;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use thiserror::Error;

/// Why a least-squares problem could not be solved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// No rows or no columns.
    #[error("empty least-squares problem ({rows}x{cols})")]
    Empty {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },
    /// The response length differs from the row count.
    #[error("response has {actual} values, design has {expected} rows")]
    LengthMismatch {
        /// Row count of the design.
        expected: usize,
        /// Response length.
        actual: usize,
    },
    /// NaN or infinity in the inputs.
    #[error("non-finite value in least-squares inputs")]
    NonFinite,
}

/// Solution of a least-squares problem.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresFit {
    /// One entry per design column; `None` where the column was aliased.
    pub coefficients: Vec<Option<f64>>,
    /// Number of estimable columns.
    pub rank: usize,
    /// Fitted values.
    pub fitted: Array1<f64>,
    /// Response minus fitted values.
    pub residuals: Array1<f64>,
    /// Residual sum of squares.
    pub rss: f64,
}

/// Least-squares capability used by the fitting engine.
pub trait LeastSquaresSolver {
    /// Minimise ‖y - Xb‖² over b.
    ///
    /// # Errors
    ///
    /// Returns a [`SolveError`] if the problem is malformed.
    fn solve(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>)
        -> Result<LeastSquaresFit, SolveError>;
}

/// Householder QR solver with in-order rank detection.
///
/// A column is aliased when the diagonal entry of R it would add falls to
/// `tolerance` times its original norm or below. Since the kept columns are
/// always of full rank, that entry is the norm of what remains of the column
/// after projecting out the kept ones.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QrSolver {
    /// Relative rank-detection tolerance.
    pub tolerance: f64,
}

impl Default for QrSolver {
    fn default() -> Self {
        Self { tolerance: 1e-10 }
    }
}

impl QrSolver {
    /// A solver with the given relative tolerance.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

/// Thin Q factor (`rows x cols.len()`) of the selected columns of `x`.
fn thin_q(x: ArrayView2<'_, f64>, cols: &[usize]) -> Array2<f64> {
    let rows = x.nrows();
    let mut a: Mat<f64> = Mat::zeros(rows, cols.len());
    for (k, &j) in cols.iter().enumerate() {
        for i in 0..rows {
            a[(i, k)] = x[[i, j]];
        }
    }
    let q = Qr::new(a.as_ref()).compute_Q();
    Array2::from_shape_fn((rows, cols.len()), |(i, k)| q[(i, k)])
}

impl LeastSquaresSolver for QrSolver {
    fn solve(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
    ) -> Result<LeastSquaresFit, SolveError> {
        let (rows, cols) = x.dim();
        if rows == 0 || cols == 0 {
            return Err(SolveError::Empty { rows, cols });
        }
        if y.len() != rows {
            return Err(SolveError::LengthMismatch {
                expected: rows,
                actual: y.len(),
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(SolveError::NonFinite);
        }

        // Orthonormal basis of the kept columns, in column order
        let mut basis = Array2::<f64>::zeros((rows, 0));
        let mut kept: Vec<usize> = Vec::with_capacity(cols.min(rows));

        for j in 0..cols {
            let column = x.column(j);
            let norm = column.dot(&column).sqrt();
            if norm == 0.0 || kept.len() == rows {
                continue;
            }
            kept.push(j);
            let q = thin_q(x, &kept);
            let diagonal = q.column(kept.len() - 1).dot(&column).abs();
            if diagonal <= self.tolerance * norm {
                kept.pop();
                continue;
            }
            basis = q;
        }

        let rank = kept.len();

        // R = Qᵀ X_kept is upper triangular; solve R b = Qᵀ y
        let mut r = Array2::<f64>::zeros((rank, rank));
        for (i, q) in basis.columns().into_iter().enumerate() {
            for (k, &j) in kept.iter().enumerate().skip(i) {
                r[[i, k]] = q.dot(&x.column(j));
            }
        }
        let qty = basis.t().dot(&y);

        let mut beta = vec![0.0; rank];
        for i in (0..rank).rev() {
            let tail: f64 = ((i + 1)..rank).map(|k| r[[i, k]] * beta[k]).sum();
            beta[i] = (qty[i] - tail) / r[[i, i]];
        }

        let fitted = basis.dot(&qty);
        let residuals = &y - &fitted;
        let rss = residuals.dot(&residuals);

        let mut coefficients = vec![None; cols];
        for (&j, &b) in kept.iter().zip(&beta) {
            coefficients[j] = Some(b);
        }

        Ok(LeastSquaresFit {
            coefficients,
            rank,
            fitted,
            residuals,
            rss,
        })
    }
}
