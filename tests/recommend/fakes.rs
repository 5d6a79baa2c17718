//! In-memory collaborators with controllable latency and failures

use async_trait::async_trait;
use bedesign::lookup::{
    DrugMetadata, LiteratureResult, LiteratureSource, LookupError, RegisteredProduct,
    RegistryResult, RegistrySource, VendorSource,
};
use bedesign::variability::{Article, PkParameters};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct FakeLiterature {
    pub articles: Vec<Article>,
    pub pk_parameters: Option<PkParameters>,
    pub delay: Duration,
}

impl FakeLiterature {
    /// One article whose abstract reports `cv`
    pub fn reporting_cv(cv: f64) -> Self {
        Self {
            articles: vec![Article::new(
                "Bioequivalence of two formulations",
                format!("The intra-subject CV: {cv}% for Cmax. Tmax 1.5 h."),
                "https://pubmed.example/1",
            )],
            pk_parameters: None,
            delay: Duration::ZERO,
        }
    }

    /// Parameters supplied by the source itself, no mining needed
    pub fn with_supplied_cv(cv: f64) -> Self {
        let mut pk = PkParameters::default();
        pk.cvintra.value = Some(cv);
        Self {
            articles: Vec::new(),
            pk_parameters: Some(pk),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl LiteratureSource for FakeLiterature {
    async fn search(&self, inn: &str) -> Result<LiteratureResult, LookupError> {
        tokio::time::sleep(self.delay).await;
        let mut result = LiteratureResult::new(
            self.articles.clone(),
            format!("https://pubmed.example/?term={inn}"),
        );
        result.pk_parameters = self.pk_parameters.clone();
        Ok(result)
    }
}

pub struct FakeRegistry {
    pub delay: Duration,
}

#[async_trait]
impl RegistrySource for FakeRegistry {
    async fn search(&self, inn: &str) -> Result<RegistryResult, LookupError> {
        tokio::time::sleep(self.delay).await;
        Ok(RegistryResult::new(
            vec![RegisteredProduct {
                name: format!("{inn} 500 mg"),
                dosage_form: "tablet".to_string(),
                manufacturer: "Acme".to_string(),
            }],
            "https://registry.example/",
        ))
    }
}

pub struct FailingRegistry;

#[async_trait]
impl RegistrySource for FailingRegistry {
    async fn search(&self, _inn: &str) -> Result<RegistryResult, LookupError> {
        Err(LookupError::Unavailable("registry down".to_string()))
    }
}

pub struct FakeVendor {
    pub delay: Duration,
}

#[async_trait]
impl VendorSource for FakeVendor {
    async fn drug_info(&self, inn: &str) -> Result<DrugMetadata, LookupError> {
        tokio::time::sleep(self.delay).await;
        Ok(DrugMetadata {
            name: inn.to_string(),
            search_url: format!("https://vendor.example/search?q={inn}"),
            half_life: Some("6 h".to_string()),
            ..Default::default()
        })
    }
}

/// Sets its flag when dropped
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A literature source that never answers and records when its work is
/// torn down
pub struct HangingLiterature {
    pub dropped: Arc<AtomicBool>,
}

impl HangingLiterature {
    pub fn tracked() -> (Self, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        (
            Self {
                dropped: Arc::clone(&dropped),
            },
            dropped,
        )
    }
}

#[async_trait]
impl LiteratureSource for HangingLiterature {
    async fn search(&self, _inn: &str) -> Result<LiteratureResult, LookupError> {
        let _guard = DropFlag(Arc::clone(&self.dropped));
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(LiteratureResult::default())
    }
}
