//! Plackett-Burman screening designs.

use super::hadamard::hadamard;
use super::{numbered_names, DesignKind, DesignMatrix, Level};
use crate::error::{Error, Result};

/// Largest supported Plackett-Burman run count.
pub const MAX_PLACKETT_BURMAN_RUNS: usize = 48;

/// Run count used for `factors` two-level factors: the smallest multiple of
/// 4 that is at least `factors + 1`.
///
/// # Example
///
/// ```
/// use doekit::design::plackett_burman_runs;
///
/// assert_eq!(plackett_burman_runs(3), 4);
/// assert_eq!(plackett_burman_runs(7), 8);
/// assert_eq!(plackett_burman_runs(8), 12);
/// assert_eq!(plackett_burman_runs(11), 12);
/// ```
#[must_use]
pub fn plackett_burman_runs(factors: usize) -> usize {
    (factors / 4 + 1) * 4
}

/// Generate a Plackett-Burman screening design.
///
/// Columns are ±1 coded, each balanced and mutually orthogonal. The design
/// is taken from a Hadamard matrix of order [`plackett_burman_runs`] with its
/// constant column removed and truncated to `factors` columns.
///
/// # Errors
///
/// Returns an error if `factors < 3` or the run count would exceed
/// [`MAX_PLACKETT_BURMAN_RUNS`].
///
/// # Example
///
/// ```
/// use doekit::design::plackett_burman;
///
/// let design = plackett_burman(7).unwrap();
/// assert_eq!(design.runs(), 8);
/// assert_eq!(design.factors(), 7);
/// ```
pub fn plackett_burman(factors: usize) -> Result<DesignMatrix> {
    if factors < 3 {
        return Err(Error::invalid_params(format!(
            "Plackett-Burman requires at least 3 factors, got {factors}"
        )));
    }

    let runs = plackett_burman_runs(factors);
    if runs > MAX_PLACKETT_BURMAN_RUNS {
        return Err(Error::invalid_params(format!(
            "Plackett-Burman supports at most {} factors, got {factors}",
            MAX_PLACKETT_BURMAN_RUNS - 1
        )));
    }

    let h = hadamard(runs).ok_or_else(|| {
        Error::invalid_params(format!("no Plackett-Burman table with {runs} runs"))
    })?;

    let rows: Vec<Vec<Level>> = h
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .skip(1)
                .take(factors)
                .map(|&v| Level::Int(i64::from(v)))
                .collect()
        })
        .collect();

    DesignMatrix::from_rows(
        DesignKind::PlackettBurman,
        numbered_names("F", factors),
        rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(design: &DesignMatrix) -> Vec<Vec<i64>> {
        (0..design.factors())
            .map(|c| {
                (0..design.runs())
                    .map(|r| design.get(r, c).as_int().unwrap())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_run_counts() {
        assert_eq!(plackett_burman(3).unwrap().runs(), 4);
        assert_eq!(plackett_burman(4).unwrap().runs(), 8);
        assert_eq!(plackett_burman(7).unwrap().runs(), 8);
        assert_eq!(plackett_burman(11).unwrap().runs(), 12);
        assert_eq!(plackett_burman(19).unwrap().runs(), 20);
        assert_eq!(plackett_burman(27).unwrap().runs(), 28);
        assert_eq!(plackett_burman(47).unwrap().runs(), 48);
    }

    #[test]
    fn test_balanced_and_orthogonal() {
        for factors in 3..=47 {
            let design = plackett_burman(factors).unwrap();
            assert_eq!(design.factors(), factors);
            let cols = columns(&design);

            for col in &cols {
                assert!(col.iter().all(|v| *v == 1 || *v == -1));
                assert_eq!(col.iter().sum::<i64>(), 0, "{factors} factors: unbalanced");
            }
            for i in 0..cols.len() {
                for j in (i + 1)..cols.len() {
                    let dot: i64 = cols[i].iter().zip(&cols[j]).map(|(a, b)| a * b).sum();
                    assert_eq!(dot, 0, "{factors} factors: columns {i},{j} correlated");
                }
            }
        }
    }

    #[test]
    fn test_invalid_factor_counts() {
        assert!(matches!(
            plackett_burman(2),
            Err(Error::InvalidParameters { .. })
        ));
        assert!(plackett_burman(0).is_err());
        assert!(plackett_burman(48).is_err());
    }
}
