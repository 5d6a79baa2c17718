//! External data collaborators and their concurrent execution
//!
//! Three independent, slow and fallible sources feed a recommendation:
//!
//! - a literature search ([`LiteratureSource`]), which may report a mined
//!   CVintra
//! - a product registry search ([`RegistrySource`])
//! - a vendor drug database ([`VendorSource`])
//!
//! Implementations live outside this crate; the orchestrator only needs the
//! shapes defined here. [`run_lookups`] runs all configured sources at once,
//! each on its own task with its own deadline, and turns every result into a
//! [`LookupOutcome`].

mod fanout;
mod outcome;

pub use fanout::{run_lookups, LookupResults, LookupSet, LookupTimeouts};
pub use outcome::LookupOutcome;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::variability::{extract_pk_parameters, Article, PkParameters};

/// Errors reported by collaborator implementations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

// ============================================================================
// Payloads
// ============================================================================

/// Articles found for a drug, with any mined PK parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiteratureResult {
    pub articles: Vec<Article>,
    pub count: usize,
    pub search_url: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pk_parameters: Option<PkParameters>,
}

impl LiteratureResult {
    pub fn new(articles: Vec<Article>, search_url: impl Into<String>) -> Self {
        Self {
            count: articles.len(),
            articles,
            search_url: search_url.into(),
            message: None,
            pk_parameters: None,
        }
    }

    /// Mine PK parameters from the articles if the source did not
    pub fn with_mined_parameters(mut self) -> Self {
        if self.pk_parameters.is_none() && !self.articles.is_empty() {
            self.pk_parameters = Some(extract_pk_parameters(&self.articles));
        }
        self
    }

    /// CVintra reported by the literature, if any
    pub fn extracted_cv(&self) -> Option<f64> {
        self.pk_parameters.as_ref().and_then(|pk| pk.cvintra.value)
    }
}

/// A registered medicinal product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredProduct {
    pub name: String,
    pub dosage_form: String,
    pub manufacturer: String,
}

/// Registry search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryResult {
    pub registered_drugs: Vec<RegisteredProduct>,
    pub count: usize,
    pub search_url: String,
}

impl RegistryResult {
    pub fn new(registered_drugs: Vec<RegisteredProduct>, search_url: impl Into<String>) -> Self {
        Self {
            count: registered_drugs.len(),
            registered_drugs,
            search_url: search_url.into(),
        }
    }
}

/// Descriptive drug metadata from a vendor database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrugMetadata {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    pub search_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pharmacokinetics: Option<String>,
    #[serde(default)]
    pub half_life: Option<String>,
    #[serde(default)]
    pub absorption: Option<String>,
}

// ============================================================================
// Collaborator traits
// ============================================================================

#[async_trait]
pub trait LiteratureSource: Send + Sync {
    async fn search(&self, inn: &str) -> Result<LiteratureResult, LookupError>;
}

#[async_trait]
pub trait RegistrySource: Send + Sync {
    async fn search(&self, inn: &str) -> Result<RegistryResult, LookupError>;
}

#[async_trait]
pub trait VendorSource: Send + Sync {
    async fn drug_info(&self, inn: &str) -> Result<DrugMetadata, LookupError>;
}
