//! Run-order randomization and replication.
//!
//! Both operations act on rows only: they reorder or repeat runs and never
//! touch the values inside a run. They are applied after generation, with
//! randomization first and replication second.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::design::DesignMatrix;

/// Post-processing options applied to a generated design.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PostProcessing {
    /// Number of contiguous copies of each run (values below 2 do nothing).
    pub replicates: usize,
    /// Whether to shuffle the run order.
    pub randomize: bool,
    /// Seed for the shuffle; `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for PostProcessing {
    fn default() -> Self {
        Self {
            replicates: 1,
            randomize: false,
            seed: None,
        }
    }
}

impl PostProcessing {
    /// Randomize (if enabled) and then replicate `design`.
    #[must_use]
    pub fn apply(&self, design: &DesignMatrix) -> DesignMatrix {
        let shuffled = if self.randomize {
            randomize(design, self.seed)
        } else {
            design.clone()
        };
        replicate(&shuffled, self.replicates)
    }
}

/// A uniformly random row permutation of `len` rows.
pub(crate) fn permutation(len: usize, seed: Option<u64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    match seed {
        Some(seed) => order.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => order.shuffle(&mut rand::thread_rng()),
    }
    order
}

/// Shuffle the runs of `design`.
///
/// A seeded call is reproducible: the same design and seed always give the
/// same order. Without a seed the order differs from call to call.
///
/// # Example
///
/// ```
/// use doekit::design::full_factorial;
/// use doekit::postprocess::randomize;
///
/// let design = full_factorial(&[2, 2, 2]).unwrap();
/// let a = randomize(&design, Some(7));
/// let b = randomize(&design, Some(7));
/// assert_eq!(a, b);
/// assert_eq!(a.runs(), 8);
/// ```
#[must_use]
pub fn randomize(design: &DesignMatrix, seed: Option<u64>) -> DesignMatrix {
    design.select_rows(&permutation(design.runs(), seed))
}

/// Repeat every run `repeats` times in place.
///
/// Row `i` appears `repeats` times before row `i + 1`. `repeats <= 1`
/// returns an unchanged copy.
///
/// # Example
///
/// ```
/// use doekit::design::full_factorial;
/// use doekit::postprocess::replicate;
///
/// let design = full_factorial(&[3]).unwrap();
/// let rep = replicate(&design, 2);
/// assert_eq!(rep.runs(), 6);
/// assert_eq!(rep.get(0, 0), rep.get(1, 0));
/// ```
#[must_use]
pub fn replicate(design: &DesignMatrix, repeats: usize) -> DesignMatrix {
    if repeats <= 1 {
        return design.clone();
    }
    let indices: Vec<usize> = (0..design.runs())
        .flat_map(|i| std::iter::repeat(i).take(repeats))
        .collect();
    design.select_rows(&indices)
}
