//! Report assembly and the serialized response shape

use serde::{Deserialize, Serialize};

use super::{AnalysisRequest, Phase, Recommendation};
use crate::lookup::LookupResults;
use crate::variability::PkParameters;

const DEFAULT_ADMINISTRATION_MODE: &str = "fasted";

/// Everything produced for one [`AnalysisRequest`]
///
/// Holds the typed recommendation and lookup outcomes. [`to_output`]
/// flattens it into the serialized report shape.
///
/// [`to_output`]: AnalysisReport::to_output
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub request: AnalysisRequest,
    pub recommendation: Recommendation,
    pub literature: LookupResults,
}

impl AnalysisReport {
    pub fn new(
        request: AnalysisRequest,
        recommendation: Recommendation,
        literature: LookupResults,
    ) -> Self {
        Self {
            request,
            recommendation,
            literature,
        }
    }

    pub fn phase(&self) -> Phase {
        self.recommendation.phase
    }

    /// PK parameters mined from a completed literature lookup
    pub fn pk_parameters(&self) -> Option<&PkParameters> {
        self.literature
            .literature
            .completed()
            .and_then(|lit| lit.pk_parameters.as_ref())
    }

    pub fn to_output(&self) -> ReportOutput {
        let rec = &self.recommendation;
        let size = &rec.sample_size;

        ReportOutput {
            inn: self.request.drug_identifier.clone(),
            dosage_form: self.request.dosage_form.clone().unwrap_or_default(),
            dosage: self.request.dosage.clone().unwrap_or_default(),
            administration_mode: self
                .request
                .administration_mode
                .clone()
                .unwrap_or_else(|| DEFAULT_ADMINISTRATION_MODE.to_string()),
            phase: rec.phase,
            design_recommendation: DesignRecommendation {
                recommended_design: rec.regimen.name().to_string(),
                rationale: rec.rationale(),
                cvintra: rec.estimate.value,
                cvintra_source: rec.estimate.source.as_str().to_string(),
            },
            sample_size: SampleSizeSummary {
                design: size.regimen.name().to_string(),
                cvintra: size.cvintra,
                base_sample_size: size.base_n,
                dropout_rate: size.dropout_pct(),
                final_sample_size: size.final_n,
                calculation_steps: size.steps.clone(),
            },
            literature: self.literature.clone(),
            pk_parameters: self.pk_parameters().cloned(),
            regulatory_check: RegulatoryCheck::default(),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.to_output())
    }
}

/// Serialized report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOutput {
    pub inn: String,
    pub dosage_form: String,
    pub dosage: String,
    pub administration_mode: String,
    pub phase: Phase,
    pub design_recommendation: DesignRecommendation,
    pub sample_size: SampleSizeSummary,
    pub literature: LookupResults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk_parameters: Option<PkParameters>,
    pub regulatory_check: RegulatoryCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRecommendation {
    pub recommended_design: String,
    pub rationale: String,
    pub cvintra: f64,
    pub cvintra_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeSummary {
    pub design: String,
    pub cvintra: f64,
    pub base_sample_size: usize,
    /// Percent
    pub dropout_rate: f64,
    pub final_sample_size: usize,
    pub calculation_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryStatement {
    pub compliant: bool,
    pub requirements: String,
}

impl RegulatoryStatement {
    fn compliant(requirements: &str) -> Self {
        Self {
            compliant: true,
            requirements: requirements.to_string(),
        }
    }
}

/// Fixed compliance statements attached to every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryCheck {
    pub decision_85: RegulatoryStatement,
    pub ema: RegulatoryStatement,
    pub fda: RegulatoryStatement,
}

impl Default for RegulatoryCheck {
    fn default() -> Self {
        Self {
            decision_85: RegulatoryStatement::compliant(
                "EAEU Decision No. 85 requires the product to meet bioequivalence standards",
            ),
            ema: RegulatoryStatement::compliant(
                "EMA guideline requires an approved bioequivalence study design",
            ),
            fda: RegulatoryStatement::compliant(
                "FDA guidance requires confirmation of bioequivalence",
            ),
        }
    }
}
