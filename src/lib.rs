//! # doekit
//!
//! Design of Experiments for Rust: generate experimental designs and fit
//! linear models to their results with Type-II ANOVA.
//!
//! ## Overview
//!
//! The crate has two halves joined by a tabular data model:
//! - **Design generation**: full and fractional factorials, Plackett-Burman
//!   screening, Box-Behnken and central composite response surfaces,
//!   Taguchi orthogonal arrays, simplex-lattice mixtures, split-plot and
//!   custom templates, with seeded randomization and replication.
//! - **Analysis**: treatment-coded least squares with aliasing detection,
//!   Type-II ANOVA with F-test p-values, and a fallback chain that moves to
//!   simpler models when the data cannot identify a richer one. Any table
//!   can also be summarised, correlated, compared across the levels of one
//!   factor, or regressed on numeric predictors.
//!
//! ## Quick Start
//!
//! Generate a design with the builder:
//!
//! ```rust
//! use doekit::DesignBuilder;
//!
//! let design = DesignBuilder::new()
//!     .full_factorial(vec![2, 3])
//!     .replicates(2)
//!     .randomize(Some(7))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(design.runs(), 12);
//! assert_eq!(design.columns(), ["F1", "F2"]);
//! ```
//!
//! Attach measurements and analyse them:
//!
//! ```rust
//! use doekit::analysis::{doe_anova, FallbackLevel};
//! use doekit::design::full_factorial;
//!
//! let table = full_factorial(&[2, 2])
//!     .unwrap()
//!     .with_response("yield", vec![61.0, 68.0, 64.0, 75.0])
//!     .unwrap();
//!
//! let result = doe_anova(&table, "yield", &["F1", "F2"]).unwrap();
//! assert_eq!(result.fallback, FallbackLevel::MainOnly);
//! assert!(result.r_squared > 0.9);
//! ```
//!
//! ## Design Families
//!
//! | Family | Function | Runs |
//! |--------|----------|------|
//! | Full factorial | [`design::full_factorial`] | product of levels |
//! | Fractional factorial | [`design::fractional_factorial`] | 2^base |
//! | Plackett-Burman | [`design::plackett_burman`] | next multiple of 4 |
//! | Box-Behnken | [`design::box_behnken`] | 4·C(n,2) + centers |
//! | Central composite | [`design::central_composite`] | 2^n + 2n + centers |
//! | Taguchi array | [`design::orthogonal_array`] | 4, 8 or 9 |
//! | Simplex lattice | [`design::simplex_lattice`] | C(m+q-1, q-1) |
//! | Split-plot | [`design::split_plot`] | whole × sub |
//!
//! ## Features
//!
//! - `serde`: Serialize designs, tables, configurations and results
//! - `parallel`: Batch generation and analysis using rayon

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod analysis;
pub mod builder;
pub mod design;
pub mod error;
pub mod model;
pub mod postprocess;
pub mod table;
pub mod utils;

#[cfg(feature = "parallel")]
pub mod parallel;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analysis::{
        correlation, describe, doe_anova, fit, linear_regression, main_effects_anova,
        one_way_anova, rsm_quadratic, AnalysisRequest, AnovaRow, AnovaTable, CorrelationReport,
        DescriptiveSummary, FallbackLevel, FitEngine, FitResult, OneWayAnova, RegressionResult,
    };
    pub use crate::builder::DesignBuilder;
    pub use crate::design::{
        generate, Alpha, CustomTemplate, DesignKind, DesignMatrix, DesignSpecification, Level,
        SplitPlotSpec, TaguchiTable,
    };
    pub use crate::error::{Error, Result};
    pub use crate::model::{AnalysisKind, FormulaClass, ModelSpec};
    pub use crate::postprocess::PostProcessing;
    pub use crate::table::{DataTable, TabularData};

    #[cfg(feature = "parallel")]
    pub use crate::parallel::{par_analyze, par_build, par_generate};
}

// Re-export commonly used items at crate root
pub use analysis::{doe_anova, main_effects_anova, rsm_quadratic, FitEngine, FitResult};
pub use builder::DesignBuilder;
pub use design::{generate, DesignMatrix, DesignSpecification, Level};
pub use error::{Error, Result};
pub use table::DataTable;

#[cfg(feature = "parallel")]
pub use parallel::{par_analyze, par_build, par_generate};
