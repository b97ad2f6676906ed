//! Builder pattern for generating post-processed designs.
//!
//! The builder couples a [`DesignSpecification`] with the
//! [`PostProcessing`] options, so a design can be generated, shuffled and
//! replicated in one call.
//!
//! # Example
//!
//! ```
//! use doekit::DesignBuilder;
//!
//! let design = DesignBuilder::new()
//!     .full_factorial(vec![2, 3])
//!     .replicates(2)
//!     .randomize(Some(42))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(design.runs(), 12);
//! assert_eq!(design.factors(), 2);
//! ```
//!
//! # Post-processing order
//!
//! Randomization is applied before replication, so replicates of a run stay
//! next to each other. Split-plot designs randomize inside each stratum
//! through [`SplitPlotSpec`] and reject the global shuffle.

use crate::design::{
    generate, Alpha, CustomTemplate, DesignMatrix, DesignSpecification, SplitPlotSpec,
    TaguchiTable,
};
use crate::error::{Error, Result};
use crate::postprocess::PostProcessing;

/// Builder for generating designs.
#[derive(Debug, Clone, Default)]
pub struct DesignBuilder {
    spec: Option<DesignSpecification>,
    post: PostProcessing,
}

impl DesignBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the design to generate.
    #[must_use]
    pub fn spec(mut self, spec: DesignSpecification) -> Self {
        self.spec = Some(spec);
        self
    }

    /// Full factorial over the given level counts.
    #[must_use]
    pub fn full_factorial(self, levels: Vec<u32>) -> Self {
        self.spec(DesignSpecification::FullFactorial { levels })
    }

    /// Two-level fractional factorial from a generator string.
    #[must_use]
    pub fn fractional_factorial(self, generator: impl Into<String>) -> Self {
        self.spec(DesignSpecification::FractionalFactorial {
            generator: generator.into(),
        })
    }

    /// Plackett-Burman screening design.
    #[must_use]
    pub fn plackett_burman(self, factors: usize) -> Self {
        self.spec(DesignSpecification::PlackettBurman { factors })
    }

    /// Box-Behnken design with `center` center runs.
    #[must_use]
    pub fn box_behnken(self, factors: usize, center: usize) -> Self {
        self.spec(DesignSpecification::BoxBehnken { factors, center })
    }

    /// Central composite design.
    #[must_use]
    pub fn central_composite(self, factors: usize, center: (usize, usize), alpha: Alpha) -> Self {
        self.spec(DesignSpecification::CentralComposite {
            factors,
            center,
            alpha,
        })
    }

    /// Leftmost `factors` columns of a Taguchi table.
    #[must_use]
    pub fn orthogonal_array(self, factors: usize, table: TaguchiTable) -> Self {
        self.spec(DesignSpecification::OrthogonalArray { factors, table })
    }

    /// Simplex-lattice mixture design.
    #[must_use]
    pub fn mixture(self, components: usize, degree: usize, names: Vec<String>) -> Self {
        self.spec(DesignSpecification::MixtureSimplexLattice {
            components,
            degree,
            names,
        })
    }

    /// Split-plot design.
    #[must_use]
    pub fn split_plot(self, split: SplitPlotSpec) -> Self {
        self.spec(DesignSpecification::SplitPlot(split))
    }

    /// Template-filled custom design.
    #[must_use]
    pub fn custom(self, factors: usize, runs: usize, template: CustomTemplate) -> Self {
        self.spec(DesignSpecification::Custom {
            factors,
            runs,
            template,
        })
    }

    /// Repeat every run `replicates` times.
    #[must_use]
    pub fn replicates(mut self, replicates: usize) -> Self {
        self.post.replicates = replicates;
        self
    }

    /// Shuffle the run order, reproducibly when a seed is given.
    #[must_use]
    pub fn randomize(mut self, seed: Option<u64>) -> Self {
        self.post.randomize = true;
        self.post.seed = seed;
        self
    }

    /// Replace all post-processing options at once.
    #[must_use]
    pub fn post_processing(mut self, post: PostProcessing) -> Self {
        self.post = post;
        self
    }

    /// Generate and post-process the design.
    ///
    /// # Errors
    ///
    /// Returns an error if no design was set, if the generator rejects its
    /// parameters, or if global randomization is requested for a
    /// split-plot design.
    pub fn build(self) -> Result<DesignMatrix> {
        let spec = self
            .spec
            .ok_or_else(|| Error::invalid_params("design must be specified"))?;

        if self.post.randomize && matches!(spec, DesignSpecification::SplitPlot(_)) {
            return Err(Error::invalid_params(
                "split-plot designs randomize per stratum; use SplitPlotSpec::randomized",
            ));
        }

        let design = generate(&spec)?;
        Ok(self.post.apply(&design))
    }
}
