//! Within-subject variability (CVintra) estimation
//!
//! Produces the CVintra used to pick a study design, together with a tag
//! recording where the value came from. Sources are ranked:
//!
//! 1. a value supplied by the caller ([`CvSource::UserInput`])
//! 2. a value mined from published literature, if it lies in 5–100%
//!    ([`CvSource::LiteratureExtracted`])
//! 3. the reference table entry for the drug, or the table's fallback
//!    ([`CvSource::ReferenceTable`])
//!
//! The [`Resolver`] performs no I/O; literature values are mined elsewhere
//! (see [`extract_pk_parameters`]) and handed in.

mod extract;
mod resolver;
mod table;

pub use extract::{extract_cvintra, extract_pk_parameters, Article, ExtractedValue, PkParameters};
pub use resolver::{is_sane_extracted_cv, Resolver, MAX_SANE_CV, MIN_SANE_CV};
pub use table::{ReferenceTable, ReferenceTableError, DEFAULT_FALLBACK_CV};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provenance of a CVintra value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvSource {
    UserInput,
    LiteratureExtracted,
    ReferenceTable,
}

impl CvSource {
    /// Precedence rank, higher wins
    pub fn rank(&self) -> u8 {
        match self {
            CvSource::UserInput => 2,
            CvSource::LiteratureExtracted => 1,
            CvSource::ReferenceTable => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CvSource::UserInput => "user_input",
            CvSource::LiteratureExtracted => "literature_extracted",
            CvSource::ReferenceTable => "reference_table",
        }
    }
}

impl fmt::Display for CvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CVintra value (percent) and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariabilityEstimate {
    pub value: f64,
    pub source: CvSource,
}

impl VariabilityEstimate {
    pub fn new(value: f64, source: CvSource) -> Self {
        Self { value, source }
    }

    /// Whether `other` comes from a strictly higher-precedence source
    pub fn is_upgraded_by(&self, other: &VariabilityEstimate) -> bool {
        other.source.rank() > self.source.rank()
    }
}
