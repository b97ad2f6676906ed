//! Split-plot designs with two randomization strata.
//!
//! Hard-to-change factors form the whole plots (`W1..Wk`), easy-to-change
//! factors the sub-plots (`S1..Sm`). Every whole-plot run carries a complete
//! copy of the sub-plot factorial, and each row records its whole plot in
//! the [`WHOLE_PLOT_COLUMN`] column.

use super::factorial::{factorial_size, odometer};
use super::{numbered_names, DesignKind, DesignMatrix, Level};
use crate::error::{Error, Result};
use crate::postprocess::permutation;

/// Name of the whole-plot block identifier column.
pub const WHOLE_PLOT_COLUMN: &str = "WholePlot";

/// Parameters of a split-plot design.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitPlotSpec {
    /// Level counts of the whole-plot factors.
    pub whole_levels: Vec<u32>,
    /// Level counts of the sub-plot factors.
    pub subplot_levels: Vec<u32>,
    /// Shuffle the order of whole-plot runs.
    pub randomize_whole: bool,
    /// Shuffle the sub-plot runs inside each whole plot.
    pub randomize_subplot: bool,
    /// Base seed; `None` randomizes nondeterministically.
    pub seed: Option<u64>,
    /// Use `seed + block` for the sub-plots of block `block` instead of `seed`.
    pub seed_per_block: bool,
}

impl SplitPlotSpec {
    /// An unrandomized split-plot over the given level lists.
    #[must_use]
    pub fn new(whole_levels: Vec<u32>, subplot_levels: Vec<u32>) -> Self {
        Self {
            whole_levels,
            subplot_levels,
            randomize_whole: false,
            randomize_subplot: false,
            seed: None,
            seed_per_block: false,
        }
    }

    /// Enable or disable randomization of each stratum.
    #[must_use]
    pub fn randomized(mut self, whole: bool, subplot: bool) -> Self {
        self.randomize_whole = whole;
        self.randomize_subplot = subplot;
        self
    }

    /// Set the base seed and whether each block gets its own offset seed.
    #[must_use]
    pub fn seeded(mut self, seed: u64, per_block: bool) -> Self {
        self.seed = Some(seed);
        self.seed_per_block = per_block;
        self
    }

    fn subplot_seed(&self, block: usize) -> Option<u64> {
        self.seed.map(|seed| {
            if self.seed_per_block {
                seed.wrapping_add(block as u64)
            } else {
                seed
            }
        })
    }
}

fn stratum(levels: &[u32], label: &str) -> Result<Vec<Vec<Level>>> {
    factorial_size(levels)
        .map_err(|e| Error::invalid_params(format!("{label} factors: {e}")))?;
    Ok(odometer(levels)
        .into_iter()
        .map(|row| row.into_iter().map(|d| Level::Int(i64::from(d) + 1)).collect())
        .collect())
}

/// Generate a split-plot design.
///
/// Rows are grouped by whole plot: the `WholePlot` value is the 1-based
/// position of the whole-plot run after whole-plot randomization, and each
/// group holds every sub-plot run exactly once.
///
/// # Errors
///
/// Returns an error if either level list is empty, any level count is below
/// 1, or the run count overflows.
///
/// # Example
///
/// ```
/// use doekit::design::{split_plot, SplitPlotSpec};
///
/// let spec = SplitPlotSpec::new(vec![2, 2], vec![3]).randomized(true, true).seeded(1, true);
/// let design = split_plot(&spec).unwrap();
/// assert_eq!(design.runs(), 12);
/// assert_eq!(design.columns(), &["W1", "W2", "S1", "WholePlot"]);
/// ```
pub fn split_plot(spec: &SplitPlotSpec) -> Result<DesignMatrix> {
    let whole = stratum(&spec.whole_levels, "whole-plot")?;
    let sub = stratum(&spec.subplot_levels, "sub-plot")?;
    whole
        .len()
        .checked_mul(sub.len())
        .ok_or_else(|| Error::invalid_params("split-plot run count overflows"))?;

    let whole_order: Vec<usize> = if spec.randomize_whole {
        permutation(whole.len(), spec.seed)
    } else {
        (0..whole.len()).collect()
    };

    let mut rows = Vec::with_capacity(whole.len() * sub.len());
    for (block, &w) in whole_order.iter().enumerate() {
        let sub_order: Vec<usize> = if spec.randomize_subplot {
            permutation(sub.len(), spec.subplot_seed(block))
        } else {
            (0..sub.len()).collect()
        };
        for s in sub_order {
            let mut row = whole[w].clone();
            row.extend(sub[s].iter().cloned());
            row.push(Level::Int(block as i64 + 1));
            rows.push(row);
        }
    }

    let mut columns = numbered_names("W", spec.whole_levels.len());
    columns.extend(numbered_names("S", spec.subplot_levels.len()));
    columns.push(WHOLE_PLOT_COLUMN.to_string());

    DesignMatrix::from_rows(DesignKind::SplitPlot, columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn block_of(design: &DesignMatrix, row: usize) -> i64 {
        design.value(row, WHOLE_PLOT_COLUMN).and_then(Level::as_int).unwrap()
    }

    #[test]
    fn test_run_count_and_blocks() {
        let design = split_plot(&SplitPlotSpec::new(vec![2, 2], vec![2, 2])).unwrap();
        assert_eq!(design.runs(), 16);
        assert_eq!(design.columns(), &["W1", "W2", "S1", "S2", "WholePlot"]);

        for block in 1..=4 {
            let members: Vec<usize> = (0..16).filter(|&r| block_of(&design, r) == block).collect();
            assert_eq!(members.len(), 4);

            // Whole-plot settings are constant inside a block
            let whole: HashSet<String> = members
                .iter()
                .map(|&r| format!("{}-{}", design.get(r, 0), design.get(r, 1)))
                .collect();
            assert_eq!(whole.len(), 1);

            let sub: HashSet<String> = members
                .iter()
                .map(|&r| format!("{}-{}", design.get(r, 2), design.get(r, 3)))
                .collect();
            assert_eq!(sub.len(), 4);
        }
    }

    #[test]
    fn test_blocks_are_contiguous() {
        let spec = SplitPlotSpec::new(vec![3], vec![2]).randomized(true, true);
        let design = split_plot(&spec).unwrap();
        let blocks: Vec<i64> = (0..design.runs()).map(|r| block_of(&design, r)).collect();
        assert_eq!(blocks, vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let spec = SplitPlotSpec::new(vec![2, 3], vec![2, 2])
            .randomized(true, true)
            .seeded(11, true);
        assert_eq!(split_plot(&spec).unwrap(), split_plot(&spec).unwrap());
    }

    #[test]
    fn test_subplots_are_complete() {
        let spec = SplitPlotSpec::new(vec![2], vec![3, 2])
            .randomized(false, true)
            .seeded(5, false);
        let design = split_plot(&spec).unwrap();
        for block in 0..2 {
            let subs: HashSet<String> = (block * 6..block * 6 + 6)
                .map(|r| format!("{}-{}", design.get(r, 1), design.get(r, 2)))
                .collect();
            assert_eq!(subs.len(), 6);
        }
        // Shared seed: both blocks use the same sub-plot order
        for r in 0..6 {
            assert_eq!(design.get(r, 1), design.get(r + 6, 1));
            assert_eq!(design.get(r, 2), design.get(r + 6, 2));
        }
    }

    #[test]
    fn test_invalid_levels() {
        assert!(matches!(
            split_plot(&SplitPlotSpec::new(vec![], vec![2])),
            Err(Error::InvalidParameters { .. })
        ));
        assert!(split_plot(&SplitPlotSpec::new(vec![2], vec![0])).is_err());
    }
}
