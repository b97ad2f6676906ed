//! Response surface designs: Box-Behnken and central composite.
//!
//! Both designs are coded around a center of 0 with factorial points at ±1,
//! and are meant for fitting full quadratic models.

use std::fmt;
use std::str::FromStr;

use super::factorial::two_level_factorial;
use super::{numbered_names, DesignKind, DesignMatrix, Level};
use crate::error::{Error, Result};

/// Rule for the axial distance of a central composite design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alpha {
    /// Makes the factorial and axial blocks orthogonal given the center counts.
    #[default]
    Orthogonal,
    /// Constant prediction variance on spheres: α = (2^n)^¼.
    Rotatable,
}

impl Alpha {
    /// Axial distance for `factors` factors and `(factorial, axial)` center runs.
    ///
    /// # Example
    ///
    /// ```
    /// use doekit::design::Alpha;
    ///
    /// let a = Alpha::Rotatable.axial_distance(2, (0, 0));
    /// assert!((a - 2f64.sqrt()).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn axial_distance(self, factors: usize, center: (usize, usize)) -> f64 {
        let n = factors as f64;
        let factorial_runs = 2f64.powi(factors as i32);
        match self {
            Self::Orthogonal => {
                let axial_runs = 2.0 * n;
                let (factorial_centers, axial_centers) = (center.0 as f64, center.1 as f64);
                (n * (1.0 + axial_centers / axial_runs)
                    / (1.0 + factorial_centers / factorial_runs))
                    .sqrt()
            }
            Self::Rotatable => factorial_runs.powf(0.25),
        }
    }
}

impl FromStr for Alpha {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orthogonal" | "o" => Ok(Self::Orthogonal),
            "rotatable" | "r" => Ok(Self::Rotatable),
            other => Err(Error::invalid_params(format!(
                "alpha must be `orthogonal` or `rotatable`, got `{other}`"
            ))),
        }
    }
}

impl fmt::Display for Alpha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Orthogonal => "orthogonal",
            Self::Rotatable => "rotatable",
        })
    }
}

fn center_rows(factors: usize, count: usize) -> impl Iterator<Item = Vec<Level>> {
    (0..count).map(move |_| vec![Level::Real(0.0); factors])
}

/// Generate a Box-Behnken design.
///
/// For every pair of factors (i < j, in lexicographic order) the four
/// combinations of ±1 are run with all other factors at 0, followed by
/// `center` runs at the origin. Total runs: 4·C(n, 2) + center.
///
/// # Errors
///
/// Returns an error if `factors < 3`.
///
/// # Example
///
/// ```
/// use doekit::design::box_behnken;
///
/// let design = box_behnken(3, 1).unwrap();
/// assert_eq!(design.runs(), 13);
/// ```
pub fn box_behnken(factors: usize, center: usize) -> Result<DesignMatrix> {
    if factors < 3 {
        return Err(Error::invalid_params(format!(
            "Box-Behnken requires at least 3 factors, got {factors}"
        )));
    }

    let pair_block = two_level_factorial(2);
    let mut rows = Vec::with_capacity(2 * factors * (factors - 1) + center);
    for i in 0..factors {
        for j in (i + 1)..factors {
            for signs in &pair_block {
                let mut row = vec![Level::Real(0.0); factors];
                row[i] = Level::Real(f64::from(signs[0]));
                row[j] = Level::Real(f64::from(signs[1]));
                rows.push(row);
            }
        }
    }
    rows.extend(center_rows(factors, center));

    DesignMatrix::from_rows(DesignKind::BoxBehnken, numbered_names("F", factors), rows)
}

/// Generate a circumscribed central composite design.
///
/// Runs, in order: the 2^n factorial points (±1), `center.0` center runs,
/// the 2n axial points (`-α` then `+α` for each factor in turn) and
/// `center.1` center runs. α comes from [`Alpha::axial_distance`].
///
/// # Errors
///
/// Returns an error if `factors < 2`.
///
/// # Example
///
/// ```
/// use doekit::design::{central_composite, Alpha};
///
/// let design = central_composite(3, (4, 4), Alpha::Rotatable).unwrap();
/// assert_eq!(design.runs(), 8 + 4 + 6 + 4);
/// ```
pub fn central_composite(
    factors: usize,
    center: (usize, usize),
    alpha: Alpha,
) -> Result<DesignMatrix> {
    if factors < 2 {
        return Err(Error::invalid_params(format!(
            "central composite requires at least 2 factors, got {factors}"
        )));
    }
    if factors >= usize::BITS as usize - 1 {
        return Err(Error::invalid_params(format!(
            "{factors} factors is too many for a central composite design"
        )));
    }

    let a = alpha.axial_distance(factors, center);
    let mut rows: Vec<Vec<Level>> = two_level_factorial(factors)
        .into_iter()
        .map(|row| row.into_iter().map(|v| Level::Real(f64::from(v))).collect())
        .collect();
    rows.extend(center_rows(factors, center.0));

    for i in 0..factors {
        for sign in [-1.0, 1.0] {
            let mut row = vec![Level::Real(0.0); factors];
            row[i] = Level::Real(sign * a);
            rows.push(row);
        }
    }
    rows.extend(center_rows(factors, center.1));

    DesignMatrix::from_rows(
        DesignKind::CentralComposite,
        numbered_names("F", factors),
        rows,
    )
}
