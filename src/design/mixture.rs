//! Simplex-lattice mixture designs.
//!
//! A {q, m} simplex-lattice holds every point whose q proportions are
//! multiples of 1/m and sum to 1. There are C(m + q - 1, q - 1) such points.

use std::collections::BTreeSet;

use super::{numbered_names, DesignKind, DesignMatrix, Level};
use crate::error::{Error, Result};
use crate::utils::binomial;

/// Tolerance used when checking that mixture rows sum to one.
pub const MIXTURE_SUM_TOLERANCE: f64 = 1e-6;

/// Every composition of `total` into `parts` non-negative integers.
///
/// The first part varies slowest: `(0, .., total)` comes first and
/// `(total, 0, ..)` last.
fn compositions(parts: usize, total: usize) -> Vec<Vec<usize>> {
    if parts == 1 {
        return vec![vec![total]];
    }
    let mut out = Vec::new();
    for head in 0..=total {
        for mut tail in compositions(parts - 1, total - head) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

fn component_names(components: usize, names: &[String]) -> Result<Vec<String>> {
    match names {
        [] => Ok(numbered_names("C", components)),
        [prefix] if components > 1 => {
            if prefix.trim().is_empty() {
                return Err(Error::invalid_params("component name prefix is blank"));
            }
            Ok(numbered_names(prefix.trim(), components))
        }
        _ => {
            if names.len() != components {
                return Err(Error::invalid_params(format!(
                    "expected {components} component names, got {}",
                    names.len()
                )));
            }
            let cleaned: Vec<String> = names.iter().map(|n| n.trim().to_string()).collect();
            if cleaned.iter().any(String::is_empty) {
                return Err(Error::invalid_params("component names must not be blank"));
            }
            let unique: BTreeSet<&str> = cleaned.iter().map(String::as_str).collect();
            if unique.len() != cleaned.len() {
                return Err(Error::invalid_params(format!(
                    "component names must be unique, got {cleaned:?}"
                )));
            }
            Ok(cleaned)
        }
    }
}

/// Generate a {`components`, `degree`} simplex-lattice mixture design.
///
/// Names default to `C1..Cq`; a single name is used as a prefix
/// (`["X"]` gives `X1..Xq`); otherwise one unique name per component is
/// required. Every row is checked to sum to one.
///
/// # Errors
///
/// Returns an error if `components < 2`, `degree < 2`, the names are
/// invalid, the run count C(components + degree - 1, degree) overflows, or
/// a row fails the sum check.
///
/// # Example
///
/// ```
/// use doekit::design::simplex_lattice;
///
/// let design = simplex_lattice(3, 2, &[]).unwrap();
/// assert_eq!(design.runs(), 6);
/// assert_eq!(design.columns(), &["C1", "C2", "C3"]);
/// ```
pub fn simplex_lattice(
    components: usize,
    degree: usize,
    names: &[String],
) -> Result<DesignMatrix> {
    if components < 2 {
        return Err(Error::invalid_params(format!(
            "mixture requires at least 2 components, got {components}"
        )));
    }
    if degree < 2 {
        return Err(Error::invalid_params(format!(
            "lattice degree must be at least 2, got {degree}"
        )));
    }
    let columns = component_names(components, names)?;

    let runs = binomial((components + degree - 1) as u64, (components - 1) as u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            Error::invalid_params(format!(
                "simplex lattice {{{components}, {degree}}} has too many runs"
            ))
        })?;

    let m = degree as f64;
    let mut rows: Vec<Vec<Level>> = Vec::with_capacity(runs);
    rows.extend(
        compositions(components, degree)
            .into_iter()
            .map(|parts| parts.into_iter().map(|p| Level::Real(p as f64 / m)).collect()),
    );

    let design = DesignMatrix::from_rows(DesignKind::MixtureSimplexLattice, columns, rows)?;
    check_sum_to_one(&design, MIXTURE_SUM_TOLERANCE)?;
    Ok(design)
}

/// Check that every row of `design` sums to one within `tolerance`.
///
/// # Errors
///
/// Returns [`Error::SumConstraintViolation`] listing the offending rows.
pub fn check_sum_to_one(design: &DesignMatrix, tolerance: f64) -> Result<()> {
    let rows: Vec<usize> = design
        .row_sums()
        .iter()
        .enumerate()
        .filter(|(_, sum)| (*sum - 1.0).abs() > tolerance)
        .map(|(i, _)| i)
        .collect();

    if rows.is_empty() {
        Ok(())
    } else {
        Err(Error::SumConstraintViolation { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_three_component_quadratic() {
        let design = simplex_lattice(3, 2, &[]).unwrap();
        let rows: Vec<Vec<f64>> = design
            .iter_runs()
            .map(|r| r.values().iter().map(|v| v.as_f64().unwrap()).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec![0.0, 0.0, 1.0],
                vec![0.0, 0.5, 0.5],
                vec![0.0, 1.0, 0.0],
                vec![0.5, 0.0, 0.5],
                vec![0.5, 0.5, 0.0],
                vec![1.0, 0.0, 0.0],
            ]
        );
    }

    #[test]
    fn test_naming_rules() {
        let named = simplex_lattice(2, 2, &["water".into(), "oil".into()]).unwrap();
        assert_eq!(named.columns(), &["water", "oil"]);

        let prefixed = simplex_lattice(3, 2, &["X".into()]).unwrap();
        assert_eq!(prefixed.columns(), &["X1", "X2", "X3"]);

        assert!(matches!(
            simplex_lattice(3, 2, &["a".into(), "b".into()]),
            Err(Error::InvalidParameters { .. })
        ));
        assert!(simplex_lattice(2, 2, &["a".into(), "a".into()]).is_err());
        assert!(simplex_lattice(2, 2, &["a".into(), " ".into()]).is_err());
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(simplex_lattice(1, 2, &[]).is_err());
        assert!(simplex_lattice(3, 1, &[]).is_err());
        // C(399, 199) does not fit in 64 bits
        assert!(matches!(
            simplex_lattice(200, 200, &[]),
            Err(Error::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_sum_check_reports_rows() {
        let design = DesignMatrix::from_rows(
            DesignKind::MixtureSimplexLattice,
            vec!["A".into(), "B".into()],
            vec![
                vec![Level::Real(0.5), Level::Real(0.5)],
                vec![Level::Real(0.5), Level::Real(0.6)],
                vec![Level::Real(0.2), Level::Real(0.2)],
            ],
        )
        .unwrap();
        assert_eq!(
            check_sum_to_one(&design, MIXTURE_SUM_TOLERANCE),
            Err(Error::SumConstraintViolation { rows: vec![1, 2] })
        );
    }

    proptest! {
        #[test]
        fn test_rows_sum_to_one(components in 2usize..=5, degree in 2usize..=4) {
            let design = simplex_lattice(components, degree, &[]).unwrap();
            for sum in design.row_sums() {
                prop_assert!((sum - 1.0).abs() <= 1e-6);
            }
        }

        #[test]
        fn test_run_count_is_stars_and_bars(components in 2usize..=5, degree in 2usize..=4) {
            let design = simplex_lattice(components, degree, &[]).unwrap();
            let expected = binomial((degree + components - 1) as u64, (components - 1) as u64);
            prop_assert_eq!(Some(design.runs() as u64), expected);
        }
    }
}
