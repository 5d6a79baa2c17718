//! Study design recommendation
//!
//! Ties the pieces together: resolve a CVintra for the drug, classify it
//! into a design regimen, size the study, and refine the answer once if the
//! literature supplies a better CVintra than the reference table.
//!
//! The flow is explicit and two-phased:
//!
//! 1. [`Recommender::provisional`] uses whatever is known up front (the
//!    caller's CVintra or the table) and returns a [`Phase::Provisional`]
//!    recommendation.
//! 2. [`Recommender::refine`] takes a literature CVintra, if one arrived,
//!    and returns a [`Phase::Final`] recommendation. The design is only
//!    recomputed when the estimate moves from the reference table to the
//!    literature; refining a final recommendation returns it unchanged.
//!
//! [`Recommender::recommend`] runs both phases around the external lookups
//! and assembles an [`AnalysisReport`].
//!
//! # Example
//!
//! ```rust
//! use bedesign::recommend::{AnalysisRequest, Phase, Recommender};
//! use bedesign::variability::CvSource;
//!
//! let recommender = Recommender::default();
//! let request = AnalysisRequest::new("metformin");
//!
//! let provisional = recommender.provisional(&request, None).unwrap();
//! assert_eq!(provisional.phase, Phase::Provisional);
//! assert_eq!(provisional.estimate.source, CvSource::ReferenceTable);
//!
//! let refined = recommender.refine(&request, provisional, Some(62.0)).unwrap();
//! assert_eq!(refined.phase, Phase::Final);
//! assert_eq!(refined.estimate.source, CvSource::LiteratureExtracted);
//! assert_eq!(refined.sample_size.final_n % 4, 0);
//! ```

mod report;

pub use report::{
    AnalysisReport, DesignRecommendation, RegulatoryCheck, RegulatoryStatement, ReportOutput,
    SampleSizeSummary,
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::design::{classify, DesignRegimen};
use crate::error::{BeDesignError, InputError};
use crate::lookup::{run_lookups, LookupSet};
use crate::sample_size::{compute, SampleSizeOptions, SampleSizeResult};
use crate::variability::{ReferenceTable, Resolver, VariabilityEstimate};

/// A request for a design recommendation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// International non-proprietary name of the drug
    #[serde(alias = "inn")]
    pub drug_identifier: String,
    #[serde(default)]
    pub dosage_form: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub administration_mode: Option<String>,
    /// Caller-supplied CVintra (percent)
    #[serde(default)]
    pub cvintra: Option<f64>,
}

impl AnalysisRequest {
    pub fn new(drug_identifier: impl Into<String>) -> Self {
        Self {
            drug_identifier: drug_identifier.into(),
            ..Default::default()
        }
    }

    pub fn with_cvintra(mut self, cvintra: f64) -> Self {
        self.cvintra = Some(cvintra);
        self
    }

    pub fn with_dosage_form(mut self, dosage_form: impl Into<String>) -> Self {
        self.dosage_form = Some(dosage_form.into());
        self
    }

    pub fn with_dosage(mut self, dosage: impl Into<String>) -> Self {
        self.dosage = Some(dosage.into());
        self
    }

    pub fn with_administration_mode(mut self, mode: impl Into<String>) -> Self {
        self.administration_mode = Some(mode.into());
        self
    }

    /// Boundary checks applied before any computation
    ///
    /// The drug identifier must be non-blank. A caller CVintra must be
    /// finite and non-negative; zero is allowed and yields the smallest
    /// compliant design.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.drug_identifier.trim().is_empty() {
            return Err(InputError::MissingDrugIdentifier);
        }
        if let Some(cv) = self.cvintra {
            if !cv.is_finite() || cv < 0.0 {
                return Err(InputError::InvalidCvIntra(cv));
            }
        }
        Ok(())
    }
}

/// Whether a recommendation may still be refined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Provisional,
    Final,
}

/// A sized design recommendation for one drug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub phase: Phase,
    pub estimate: VariabilityEstimate,
    pub regimen: DesignRegimen,
    pub sample_size: SampleSizeResult,
}

impl Recommendation {
    /// One-line justification for the chosen design
    pub fn rationale(&self) -> String {
        format!("CV={}% → {} is optimal", self.estimate.value, self.regimen)
    }
}

/// Runs the resolve → classify → size pipeline
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    resolver: Resolver,
    options: SampleSizeOptions,
}

impl Recommender {
    pub fn new(table: ReferenceTable, options: SampleSizeOptions) -> Self {
        Self {
            resolver: Resolver::new(table),
            options,
        }
    }

    /// Build a recommender from configuration, loading any table CSV
    pub fn from_config(config: &Config) -> Result<Self, BeDesignError> {
        let table = config.reference_table.build()?;
        Ok(Self::new(table, config.sample_size_options()))
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn options(&self) -> &SampleSizeOptions {
        &self.options
    }

    /// First-phase recommendation from the information available now
    pub fn provisional(
        &self,
        request: &AnalysisRequest,
        extracted_cv: Option<f64>,
    ) -> Result<Recommendation, BeDesignError> {
        request.validate()?;
        let estimate =
            self.resolver
                .resolve(&request.drug_identifier, request.cvintra, extracted_cv);
        self.size(estimate, Phase::Provisional)
    }

    /// Second-phase recommendation
    ///
    /// Recomputes only when `previous` came from the reference table and
    /// `extracted_cv` passes the sanity filter. Always returns
    /// [`Phase::Final`].
    pub fn refine(
        &self,
        request: &AnalysisRequest,
        previous: Recommendation,
        extracted_cv: Option<f64>,
    ) -> Result<Recommendation, BeDesignError> {
        if previous.phase == Phase::Final {
            return Ok(previous);
        }

        let candidate =
            self.resolver
                .resolve(&request.drug_identifier, request.cvintra, extracted_cv);

        if previous.estimate.is_upgraded_by(&candidate) {
            info!(
                drug = %request.drug_identifier,
                from = previous.estimate.value,
                to = candidate.value,
                "CVintra refined from literature"
            );
            return self.size(candidate, Phase::Final);
        }

        debug!(drug = %request.drug_identifier, "no refinement applied");
        Ok(Recommendation {
            phase: Phase::Final,
            ..previous
        })
    }

    /// Provisional recommendations for many requests, in parallel
    pub fn provisional_batch(
        &self,
        requests: &[AnalysisRequest],
    ) -> Vec<Result<Recommendation, BeDesignError>> {
        requests
            .par_iter()
            .map(|request| self.provisional(request, None))
            .collect()
    }

    /// Full analysis: provisional design, concurrent lookups, refinement
    pub async fn recommend(
        &self,
        request: &AnalysisRequest,
        lookups: &LookupSet,
    ) -> Result<AnalysisReport, BeDesignError> {
        self.recommend_with_cancel(request, lookups, &CancellationToken::new())
            .await
    }

    /// [`recommend`](Self::recommend) with a caller-controlled cancellation
    /// token for the external lookups
    ///
    /// Cancelling the token does not fail the request; pending lookups are
    /// reported as cancelled and the report is built from what is known.
    pub async fn recommend_with_cancel(
        &self,
        request: &AnalysisRequest,
        lookups: &LookupSet,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport, BeDesignError> {
        let provisional = self.provisional(request, None)?;
        info!(
            drug = %request.drug_identifier,
            cvintra = provisional.estimate.value,
            source = %provisional.estimate.source,
            design = %provisional.regimen,
            "provisional design"
        );

        let literature = run_lookups(lookups, &request.drug_identifier, cancel).await;
        let recommendation = self.refine(request, provisional, literature.extracted_cv())?;

        info!(
            drug = %request.drug_identifier,
            design = %recommendation.regimen,
            final_n = recommendation.sample_size.final_n,
            "analysis complete"
        );

        Ok(AnalysisReport::new(request.clone(), recommendation, literature))
    }

    fn size(
        &self,
        estimate: VariabilityEstimate,
        phase: Phase,
    ) -> Result<Recommendation, BeDesignError> {
        let regimen = classify(estimate.value);
        let sample_size = compute(regimen, estimate.value, &self.options)?;
        Ok(Recommendation {
            phase,
            estimate,
            regimen,
            sample_size,
        })
    }
}
