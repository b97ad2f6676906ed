//! Template-filled custom designs.

use super::{numbered_names, DesignKind, DesignMatrix, Level};
use crate::error::{Error, Result};

/// How the cells of a custom design are pre-filled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CustomTemplate {
    /// Every cell missing, to be filled in by hand.
    #[default]
    Blank,
    /// Cycle through -1, 1.
    TwoLevel,
    /// Cycle through -1, 0, 1.
    ThreeLevel,
    /// Cycle through `min`, `max`.
    Range {
        /// Low setting.
        min: f64,
        /// High setting.
        max: f64,
    },
}

impl CustomTemplate {
    fn levels(self) -> Result<Vec<Level>> {
        match self {
            Self::Blank => Ok(vec![Level::Missing]),
            Self::TwoLevel => Ok(vec![Level::Int(-1), Level::Int(1)]),
            Self::ThreeLevel => Ok(vec![Level::Int(-1), Level::Int(0), Level::Int(1)]),
            Self::Range { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(Error::invalid_params(format!(
                        "range bounds must be finite, got [{min}, {max}]"
                    )));
                }
                if min == max {
                    return Err(Error::invalid_params(format!(
                        "range min and max must differ, both are {min}"
                    )));
                }
                Ok(vec![Level::Real(min), Level::Real(max)])
            }
        }
    }
}

/// Generate a `runs x factors` design pre-filled from a template.
///
/// Cell `(r, i)` holds `levels[(r + i) % levels.len()]`, so neighbouring
/// columns start at different levels.
///
/// # Errors
///
/// Returns an error if `factors` or `runs` is 0, or for an invalid range.
///
/// # Example
///
/// ```
/// use doekit::design::{custom_design, CustomTemplate, Level};
///
/// let design = custom_design(2, 3, &CustomTemplate::TwoLevel).unwrap();
/// assert_eq!(design.get(0, 0), &Level::Int(-1));
/// assert_eq!(design.get(0, 1), &Level::Int(1));
/// ```
pub fn custom_design(factors: usize, runs: usize, template: &CustomTemplate) -> Result<DesignMatrix> {
    if factors == 0 || runs == 0 {
        return Err(Error::invalid_params(format!(
            "custom design needs at least one factor and one run, got {factors} x {runs}"
        )));
    }
    let levels = template.levels()?;

    let rows = (0..runs)
        .map(|r| {
            (0..factors)
                .map(|i| levels[(r + i) % levels.len()].clone())
                .collect()
        })
        .collect();

    DesignMatrix::from_rows(DesignKind::Custom, numbered_names("F", factors), rows)
}
