//! Study design regimens and CVintra-based classification
//!
//! Three regimens are supported:
//!
//! | CVintra (%) | Regimen | Periods |
//! |-------------|---------|---------|
//! | ≤ 30 | 2×2 cross-over | 2 |
//! | 30 < CV ≤ 50 | 3-way replicate | 3 |
//! | > 50 | 4-way replicate | 4 |
//!
//! Boundaries are inclusive on the lower regimen, so a CVintra of exactly 30
//! stays a cross-over and exactly 50 stays a 3-way replicate.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::InputError;

/// Lower bound of the bioequivalence acceptance range (80%)
pub const THETA1: f64 = 0.80;

/// Upper CVintra bound (inclusive) for a 2×2 cross-over
pub const CROSSOVER_MAX_CV: f64 = 30.0;

/// Upper CVintra bound (inclusive) for a 3-way replicate
pub const THREE_WAY_MAX_CV: f64 = 50.0;

/// A bioequivalence study design regimen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignRegimen {
    /// Classic two-sequence, two-period cross-over
    TwoByTwoCrossover,
    /// Partial replicate, three periods
    ThreeWayReplicate,
    /// Full replicate, four periods
    FourWayReplicate,
}

impl DesignRegimen {
    /// Number of dosing periods per subject
    pub fn periods(&self) -> usize {
        match self {
            DesignRegimen::TwoByTwoCrossover => 2,
            DesignRegimen::ThreeWayReplicate => 3,
            DesignRegimen::FourWayReplicate => 4,
        }
    }

    /// Natural log of the lower equivalence margin, `ln(0.80)`
    ///
    /// All regimens share the same margin; it is applied symmetrically.
    pub fn ln_theta1(&self) -> f64 {
        THETA1.ln()
    }

    /// Whether this is one of the replicate designs
    pub fn is_replicate(&self) -> bool {
        !matches!(self, DesignRegimen::TwoByTwoCrossover)
    }

    /// Human-readable design name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            DesignRegimen::TwoByTwoCrossover => "2×2 Cross-over",
            DesignRegimen::ThreeWayReplicate => "3-way Replicate",
            DesignRegimen::FourWayReplicate => "4-way Replicate",
        }
    }
}

impl fmt::Display for DesignRegimen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Map a CVintra (percent) to its design regimen
///
/// Total over every input; zero and negative values fall into the
/// cross-over branch. Rejecting those is left to the request boundary.
///
/// # Example
///
/// ```rust
/// use bedesign::design::{classify, DesignRegimen};
///
/// assert_eq!(classify(30.0), DesignRegimen::TwoByTwoCrossover);
/// assert_eq!(classify(30.1), DesignRegimen::ThreeWayReplicate);
/// assert_eq!(classify(50.0), DesignRegimen::ThreeWayReplicate);
/// assert_eq!(classify(62.0), DesignRegimen::FourWayReplicate);
/// ```
pub fn classify(cvintra: f64) -> DesignRegimen {
    if cvintra <= CROSSOVER_MAX_CV {
        DesignRegimen::TwoByTwoCrossover
    } else if cvintra <= THREE_WAY_MAX_CV {
        DesignRegimen::ThreeWayReplicate
    } else {
        DesignRegimen::FourWayReplicate
    }
}

/// Design selection requested by a caller
///
/// `Auto` classifies from CVintra; `Fixed` forces a regimen regardless of
/// variability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DesignChoice {
    #[default]
    Auto,
    Fixed(DesignRegimen),
}

impl DesignChoice {
    /// Resolve the choice into a concrete regimen for the given CVintra
    pub fn regimen_for(&self, cvintra: f64) -> DesignRegimen {
        match self {
            DesignChoice::Auto => classify(cvintra),
            DesignChoice::Fixed(regimen) => *regimen,
        }
    }
}

impl FromStr for DesignChoice {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(DesignChoice::Auto),
            "2x2" | "2×2" => Ok(DesignChoice::Fixed(DesignRegimen::TwoByTwoCrossover)),
            "3way" | "3-way" => Ok(DesignChoice::Fixed(DesignRegimen::ThreeWayReplicate)),
            "4way" | "4-way" => Ok(DesignChoice::Fixed(DesignRegimen::FourWayReplicate)),
            other => Err(InputError::UnknownDesign(other.to_string())),
        }
    }
}
