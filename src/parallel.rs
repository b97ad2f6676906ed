//! Batch generation and analysis on the rayon thread pool.
//!
//! Enable with the `parallel` feature flag. Every job is independent: no
//! state is shared between designs or fits, and results come back in input
//! order.
//!
//! # Usage
//!
//! ```ignore
//! use doekit::design::DesignSpecification;
//! use doekit::parallel::par_generate;
//!
//! let specs = vec![
//!     DesignSpecification::FullFactorial { levels: vec![2, 3] },
//!     DesignSpecification::PlackettBurman { factors: 5 },
//! ];
//! let designs = par_generate(&specs);
//! assert_eq!(designs[0].as_ref().unwrap().runs(), 6);
//! ```
//!
//! For a handful of small designs the sequential functions are faster.

use rayon::prelude::*;

use crate::analysis::{AnalysisRequest, FitResult};
use crate::builder::DesignBuilder;
use crate::design::{generate, DesignMatrix, DesignSpecification};
use crate::error::Result;

/// Generate every specification in parallel.
#[must_use]
pub fn par_generate(specs: &[DesignSpecification]) -> Vec<Result<DesignMatrix>> {
    specs.par_iter().map(generate).collect()
}

/// Build every configured builder in parallel, post-processing included.
#[must_use]
pub fn par_build(builders: Vec<DesignBuilder>) -> Vec<Result<DesignMatrix>> {
    builders.into_par_iter().map(DesignBuilder::build).collect()
}

/// Run every analysis request in parallel with the default engine.
#[must_use]
pub fn par_analyze(requests: &[AnalysisRequest]) -> Vec<Result<FitResult>> {
    let results: Vec<Result<FitResult>> = requests.par_iter().map(AnalysisRequest::run).collect();
    tracing::debug!(
        jobs = requests.len(),
        failed = results.iter().filter(|r| r.is_err()).count(),
        "batch analysis finished"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{full_factorial, TaguchiTable};
    use crate::error::Error;
    use crate::model::AnalysisKind;

    #[test]
    fn test_par_generate_matches_sequential() {
        let specs = vec![
            DesignSpecification::FullFactorial { levels: vec![2, 3] },
            DesignSpecification::PlackettBurman { factors: 11 },
            DesignSpecification::OrthogonalArray {
                factors: 4,
                table: TaguchiTable::L9,
            },
            DesignSpecification::PlackettBurman { factors: 0 },
        ];
        let parallel = par_generate(&specs);
        assert_eq!(parallel.len(), 4);
        for (spec, result) in specs.iter().zip(&parallel) {
            assert_eq!(result, &generate(spec));
        }
        assert!(parallel[3].is_err());
    }

    #[test]
    fn test_par_build_seeded() {
        let builders: Vec<DesignBuilder> = (0..4)
            .map(|seed| {
                DesignBuilder::new()
                    .full_factorial(vec![2, 2, 2])
                    .randomize(Some(seed))
                    .replicates(2)
            })
            .collect();
        let again: Vec<DesignBuilder> = (0..4)
            .map(|seed| {
                DesignBuilder::new()
                    .full_factorial(vec![2, 2, 2])
                    .randomize(Some(seed))
                    .replicates(2)
            })
            .collect();
        let first = par_build(builders);
        assert_eq!(first, par_build(again));
        assert!(first.iter().all(|d| d.as_ref().map(DesignMatrix::runs) == Ok(16)));
    }

    #[test]
    fn test_par_analyze_keeps_order() {
        let table = full_factorial(&[2, 2])
            .unwrap()
            .with_response("y", vec![1.0, 2.0, 3.0, 5.0])
            .unwrap();
        let requests = vec![
            AnalysisRequest::new(table.clone(), AnalysisKind::DoeAnova, "y", ["F1", "F2"])
                .with_label("first"),
            AnalysisRequest::new(table.clone(), AnalysisKind::MainEffects, "y", ["F1", "Z"]),
            AnalysisRequest::new(table, AnalysisKind::MainEffects, "y", ["F2"]).with_label("third"),
        ];
        let results = par_analyze(&requests);
        assert_eq!(results[0].as_ref().unwrap().label.as_deref(), Some("first"));
        assert_eq!(results[1], Err(Error::missing_column("Z")));
        assert_eq!(results[2].as_ref().unwrap().formula, "y ~ C(F2)");
    }
}
