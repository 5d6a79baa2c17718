//! CVintra precedence: caller value, plausible literature value, reference table

use tracing::debug;

use super::{CvSource, ReferenceTable, VariabilityEstimate};

/// Lowest literature CVintra accepted (inclusive)
pub const MIN_SANE_CV: f64 = 5.0;

/// Highest literature CVintra accepted (inclusive)
pub const MAX_SANE_CV: f64 = 100.0;

/// Whether a mined CVintra is plausible enough to use
#[inline]
pub fn is_sane_extracted_cv(value: f64) -> bool {
    (MIN_SANE_CV..=MAX_SANE_CV).contains(&value)
}

/// Picks a CVintra by source precedence
///
/// Holds its reference table by value; the table is never modified after
/// construction, so a resolver can be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    table: ReferenceTable,
}

impl Resolver {
    pub fn new(table: ReferenceTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    /// Resolve a CVintra estimate for a drug
    ///
    /// - A caller value always wins, whatever it is (0 and negatives
    ///   included).
    /// - Otherwise an extracted value wins if it lies in `[5, 100]`.
    /// - Otherwise the table entry (case-insensitive) or the table fallback
    ///   is used.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bedesign::variability::{CvSource, ReferenceTable, Resolver};
    ///
    /// let resolver = Resolver::new(ReferenceTable::builtin());
    ///
    /// let estimate = resolver.resolve("aspirin", Some(40.0), Some(22.0));
    /// assert_eq!(estimate.value, 40.0);
    /// assert_eq!(estimate.source, CvSource::UserInput);
    ///
    /// let estimate = resolver.resolve("unknownium", None, None);
    /// assert_eq!(estimate.value, 25.0);
    /// assert_eq!(estimate.source, CvSource::ReferenceTable);
    /// ```
    pub fn resolve(
        &self,
        drug_id: &str,
        user_cv: Option<f64>,
        extracted_cv: Option<f64>,
    ) -> VariabilityEstimate {
        let estimate = if let Some(value) = user_cv {
            VariabilityEstimate::new(value, CvSource::UserInput)
        } else if let Some(value) = extracted_cv.filter(|&v| is_sane_extracted_cv(v)) {
            VariabilityEstimate::new(value, CvSource::LiteratureExtracted)
        } else {
            if let Some(rejected) = extracted_cv {
                debug!(drug = drug_id, cvintra = rejected, "extracted CVintra outside sane range");
            }
            VariabilityEstimate::new(self.table.get_or_fallback(drug_id), CvSource::ReferenceTable)
        };

        debug!(
            drug = drug_id,
            cvintra = estimate.value,
            source = %estimate.source,
            "CVintra resolved"
        );
        estimate
    }
}
