//! Pure sample size formulas
//!
//! These functions take primitive inputs and return primitive outputs, with
//! the exception of [`compute`] which assembles the full
//! [`SampleSizeResult`] including its explanatory trace.

use tracing::debug;

use crate::design::{classify, DesignChoice, DesignRegimen, THETA1};

use super::error::SampleSizeError;
use super::types::{SampleSizeOptions, SampleSizeResult, Z_ALPHA, Z_BETA};

/// Largest enrolment the engine will report
const MAX_SUBJECTS: f64 = u32::MAX as f64;

/// Variance on the log scale from a CVintra percentage
///
/// σ² = ln(CV² + 1), with CV as a decimal fraction
#[inline]
pub fn log_variance(cvintra: f64) -> f64 {
    let cv = cvintra / 100.0;
    (cv.powi(2) + 1.0).ln()
}

/// Unrounded two-period sample size
///
/// N = 2(Zα + Zβ)² × σ² / (ln θ₁)²
#[inline]
pub fn raw_crossover_n(sigma_sq: f64, ln_theta1: f64) -> f64 {
    2.0 * (Z_ALPHA + Z_BETA).powi(2) * sigma_sq / ln_theta1.powi(2)
}

/// Information gain from repeated periods, `sqrt(periods / 2)`
#[inline]
pub fn replicate_correction(periods: usize) -> f64 {
    (periods as f64 / 2.0).sqrt()
}

/// Inflate a subject count for the expected dropout fraction
#[inline]
pub fn inflate_for_dropout(base_n: usize, dropout: f64) -> f64 {
    base_n as f64 / (1.0 - dropout)
}

/// Smallest even integer ≥ `n`
#[inline]
pub fn round_up_to_even(n: usize) -> usize {
    if n % 2 != 0 {
        n + 1
    } else {
        n
    }
}

/// Smallest multiple of `periods` ≥ `n`
#[inline]
pub fn round_up_to_multiple(n: usize, periods: usize) -> usize {
    let remainder = n % periods;
    if remainder != 0 {
        n + (periods - remainder)
    } else {
        n
    }
}

/// Compute the sample size for a regimen
///
/// Runs the shared log-normal core, applies the regimen-specific correction,
/// inflates for dropout and rounds to a design-compliant count.
///
/// A CVintra of 0 is a legitimate degenerate input: σ² = 0 gives a base of
/// 0 subjects and the result is the smallest compliant size, one subject per
/// sequence block (2 for a cross-over, the period count for a replicate).
///
/// # Errors
/// [`SampleSizeError::NonFiniteCv`] for NaN/infinite CVintra and
/// [`SampleSizeError::InvalidParameter`] for dropout outside `[0, 1)`,
/// [`SampleSizeError::Overflow`] when the enrolment is not representable.
///
/// # Example
///
/// ```rust
/// use bedesign::design::DesignRegimen;
/// use bedesign::sample_size::{compute, SampleSizeOptions};
///
/// let result = compute(DesignRegimen::ThreeWayReplicate, 50.0, &SampleSizeOptions::default()).unwrap();
/// assert_eq!(result.final_n % 3, 0);
/// ```
pub fn compute(
    regimen: DesignRegimen,
    cvintra: f64,
    options: &SampleSizeOptions,
) -> Result<SampleSizeResult, SampleSizeError> {
    if !cvintra.is_finite() {
        return Err(SampleSizeError::NonFiniteCv(cvintra));
    }
    options.validate()?;

    let projected =
        raw_crossover_n(log_variance(cvintra), THETA1.ln()).ceil() / (1.0 - options.dropout);
    if !projected.is_finite() || projected > MAX_SUBJECTS {
        return Err(SampleSizeError::Overflow(cvintra));
    }

    let result = match regimen {
        DesignRegimen::TwoByTwoCrossover => crossover(cvintra, options),
        DesignRegimen::ThreeWayReplicate | DesignRegimen::FourWayReplicate => {
            replicate(cvintra, regimen, options)
        }
    };

    debug!(
        design = %result.regimen,
        cvintra = result.cvintra,
        base_n = result.base_n,
        final_n = result.final_n,
        "sample size computed"
    );

    Ok(result)
}

/// Classify CVintra and compute the matching sample size
pub fn size_for(
    cvintra: f64,
    options: &SampleSizeOptions,
) -> Result<SampleSizeResult, SampleSizeError> {
    compute(classify(cvintra), cvintra, options)
}

/// Compute for an explicit or automatic design choice
pub fn compute_for_choice(
    choice: DesignChoice,
    cvintra: f64,
    options: &SampleSizeOptions,
) -> Result<SampleSizeResult, SampleSizeError> {
    compute(choice.regimen_for(cvintra), cvintra, options)
}

/// Size a replicate design from a bare period count
pub fn compute_replicate(
    periods: usize,
    cvintra: f64,
    options: &SampleSizeOptions,
) -> Result<SampleSizeResult, SampleSizeError> {
    let regimen = match periods {
        3 => DesignRegimen::ThreeWayReplicate,
        4 => DesignRegimen::FourWayReplicate,
        other => return Err(SampleSizeError::UnsupportedPeriods(other)),
    };
    compute(regimen, cvintra, options)
}

fn crossover(cvintra: f64, options: &SampleSizeOptions) -> SampleSizeResult {
    let regimen = DesignRegimen::TwoByTwoCrossover;
    let cv = cvintra / 100.0;
    let sigma_sq = log_variance(cvintra);
    let ln_theta1 = regimen.ln_theta1();

    let base_n = raw_crossover_n(sigma_sq, ln_theta1).ceil() as usize;
    let adjusted_n = inflate_for_dropout(base_n, options.dropout);
    let final_n = round_up_to_even(adjusted_n.ceil() as usize).max(regimen.periods());

    let steps = vec![
        format!("1. σ² = ln(CV² + 1) = ln({}² + 1) = {:.4}", cv, sigma_sq),
        format!("2. ln(θ₁) = ln({}) = {:.4}", THETA1, ln_theta1),
        format!(
            "3. N_base = 2 × ({} + {})² × {:.4} / {:.4}² = {}",
            Z_ALPHA, Z_BETA, sigma_sq, ln_theta1, base_n
        ),
        format!(
            "4. N_adjusted = {} / (1 - {}) = {:.1}",
            base_n, options.dropout, adjusted_n
        ),
        format!("5. N_final (rounded up to even) = {}", final_n),
    ];

    SampleSizeResult {
        regimen,
        cvintra,
        base_n,
        dropout: options.dropout,
        adjusted_n,
        final_n,
        power: options.power,
        alpha: options.alpha,
        steps,
        formula: "N = 2(Zα + Zβ)² × σ² / (ln θ₁)²".to_string(),
    }
}

fn replicate(
    cvintra: f64,
    regimen: DesignRegimen,
    options: &SampleSizeOptions,
) -> SampleSizeResult {
    let periods = regimen.periods();
    let sigma_sq = log_variance(cvintra);
    let correction = replicate_correction(periods);

    // Same fixed ln(0.80) margin as the cross-over, scaled down by the
    // per-subject information gain of the extra periods.
    let raw_n = raw_crossover_n(sigma_sq, THETA1.ln()) / correction;
    let base_n = raw_n.ceil() as usize;
    let adjusted_n = inflate_for_dropout(base_n, options.dropout);
    let final_n = round_up_to_multiple(adjusted_n.ceil() as usize, periods).max(periods);

    let steps = vec![
        format!("1. σ² = ln(CV² + 1) = {:.4}", sigma_sq),
        format!("2. Correction factor for {} periods = {:.2}", periods, correction),
        format!("3. N_base = {}", base_n),
        format!(
            "4. N_adjusted for {}% dropout = {:.1}",
            options.dropout * 100.0,
            adjusted_n
        ),
        format!(
            "5. N_final (rounded up to a multiple of {}) = {}",
            periods, final_n
        ),
    ];

    SampleSizeResult {
        regimen,
        cvintra,
        base_n,
        dropout: options.dropout,
        adjusted_n,
        final_n,
        power: options.power,
        alpha: options.alpha,
        steps,
        formula: format!("Replicate design with {} periods", periods),
    }
}
