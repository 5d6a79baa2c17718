//! Sample size sweeps over many CVintra values
//!
//! Each value is classified and sized independently, in parallel. Results
//! keep the order of the input values.

use rayon::prelude::*;

use super::calc::size_for;
use super::error::SampleSizeError;
use super::types::{SampleSizeOptions, SampleSizeResult};

/// Classify and size every CVintra value
///
/// # Example
///
/// ```rust
/// use bedesign::sample_size::{cv_grid, sample_size_table, SampleSizeOptions};
///
/// let rows = sample_size_table(&cv_grid(10.0, 60.0, 10.0), &SampleSizeOptions::default());
/// assert_eq!(rows.len(), 6);
/// ```
pub fn sample_size_table(
    cv_values: &[f64],
    options: &SampleSizeOptions,
) -> Vec<Result<SampleSizeResult, SampleSizeError>> {
    cv_values
        .par_iter()
        .map(|&cv| size_for(cv, options))
        .collect()
}

/// Evenly spaced CVintra values from `from` to `to` inclusive
///
/// Returns an empty grid for a non-positive step or an inverted range.
pub fn cv_grid(from: f64, to: f64, step: f64) -> Vec<f64> {
    if step.is_nan() || step <= 0.0 || to < from {
        return Vec::new();
    }
    let n = ((to - from) / step + 1e-9).floor() as usize;
    (0..=n).map(|i| from + i as f64 * step).collect()
}
