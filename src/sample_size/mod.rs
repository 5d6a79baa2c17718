//! Sample size determination for bioequivalence studies
//!
//! Computes the number of subjects to enrol from a drug's within-subject
//! variability (CVintra) using log-normal equivalence-margin theory.
//!
//! # Method
//!
//! All regimens share one statistical core:
//!
//! | Step | Formula |
//! |------|---------|
//! | Log-scale variance | σ² = ln(CV² + 1) |
//! | Base size | N = 2(Zα + Zβ)² × σ² / (ln 0.80)² |
//! | Replicate correction | N / sqrt(periods / 2) |
//! | Dropout inflation | N / (1 - dropout) |
//!
//! followed by design-specific rounding: an even count for the 2×2
//! cross-over, a multiple of the period count for replicate designs.
//!
//! Quantiles are fixed at Zα = 1.96 and Zβ = 0.842. The `power` and `alpha`
//! options are reported alongside the result but are not used to pick
//! quantiles.
//!
//! # Usage
//!
//! ```rust
//! use bedesign::design::{classify, DesignRegimen};
//! use bedesign::sample_size::{compute, SampleSizeOptions};
//!
//! let cv = 20.0;
//! let regimen = classify(cv);
//! let result = compute(regimen, cv, &SampleSizeOptions::default()).unwrap();
//!
//! assert_eq!(regimen, DesignRegimen::TwoByTwoCrossover);
//! assert_eq!(result.final_n % 2, 0);
//! assert_eq!(result.steps.len(), 5);
//! ```

mod batch;
mod calc;
mod error;
mod types;


pub use batch::{cv_grid, sample_size_table};
pub use calc::{
    compute, compute_for_choice, compute_replicate, inflate_for_dropout, log_variance,
    raw_crossover_n, replicate_correction, round_up_to_even, round_up_to_multiple, size_for,
};
pub use error::SampleSizeError;
pub use types::{SampleSizeOptions, SampleSizeResult, Z_ALPHA, Z_BETA};
