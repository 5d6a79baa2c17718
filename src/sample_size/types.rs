//! Sample size types: options and results

use serde::{Deserialize, Serialize};

use crate::design::DesignRegimen;

use super::error::SampleSizeError;

/// Two-sided normal quantile for α = 0.05
pub const Z_ALPHA: f64 = 1.96;

/// Normal quantile for power = 0.80
pub const Z_BETA: f64 = 0.842;

// ============================================================================
// Configuration Types
// ============================================================================

/// Sample size engine options
///
/// `power` and `alpha` are carried through to the result for reporting but
/// do not change the quantiles: the engine always uses [`Z_ALPHA`] and
/// [`Z_BETA`], which correspond to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeOptions {
    /// Target power (default: 0.80)
    pub power: f64,
    /// Significance level (default: 0.05)
    pub alpha: f64,
    /// Expected dropout fraction in `[0, 1)` (default: 0.20)
    pub dropout: f64,
}

impl Default for SampleSizeOptions {
    fn default() -> Self {
        Self {
            power: 0.80,
            alpha: 0.05,
            dropout: 0.20,
        }
    }
}

impl SampleSizeOptions {
    /// Set target power
    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    /// Set significance level
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set expected dropout fraction
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Check that the dropout fraction leaves a positive completion rate
    pub fn validate(&self) -> Result<(), SampleSizeError> {
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(SampleSizeError::InvalidParameter {
                param: "dropout".to_string(),
                value: self.dropout.to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Outcome of a sample size calculation
///
/// `final_n >= adjusted_n >= base_n` always holds, and `final_n` satisfies
/// the regimen's divisibility rule (even for a cross-over, a multiple of
/// the period count for replicate designs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeResult {
    pub regimen: DesignRegimen,
    /// CVintra (percent) the calculation was run with
    pub cvintra: f64,
    /// Statistical sample size before dropout inflation
    pub base_n: usize,
    /// Dropout fraction applied
    pub dropout: f64,
    /// `base_n / (1 - dropout)`, unrounded
    pub adjusted_n: f64,
    /// Enrolment size after design-compliant rounding
    pub final_n: usize,
    /// Power recorded from the options
    pub power: f64,
    /// Alpha recorded from the options
    pub alpha: f64,
    /// Ordered explanation of each computation step
    pub steps: Vec<String>,
    /// Method description
    pub formula: String,
}

impl SampleSizeResult {
    /// Dropout expressed as a percentage
    pub fn dropout_pct(&self) -> f64 {
        self.dropout * 100.0
    }
}
