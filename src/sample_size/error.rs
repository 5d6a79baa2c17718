//! Sample size engine error types

use thiserror::Error;

/// Faults raised inside the sample size engine
///
/// None of these occur for finite CVintra values with default options; they
/// guard against malformed values reaching the formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleSizeError {
    /// CVintra is NaN or infinite
    #[error("CVintra must be finite, got {0}")]
    NonFiniteCv(f64),

    /// Invalid option value
    #[error("Invalid parameter: {param} = {value}")]
    InvalidParameter { param: String, value: String },

    /// CVintra so large the subject count cannot be represented
    #[error("Sample size for CVintra {0}% exceeds the representable subject count")]
    Overflow(f64),

    /// Replicate sizing was asked for an unsupported period count
    #[error("Replicate designs use 3 or 4 periods, got {0}")]
    UnsupportedPeriods(usize),
}
