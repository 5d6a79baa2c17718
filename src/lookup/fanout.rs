//! Concurrent execution of the configured lookups

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{
    DrugMetadata, LiteratureResult, LiteratureSource, LookupError, LookupOutcome, RegistryResult,
    RegistrySource, VendorSource,
};

/// Per-source deadlines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookupTimeouts {
    pub literature: Duration,
    pub registry: Duration,
    pub vendor: Duration,
}

impl Default for LookupTimeouts {
    fn default() -> Self {
        Self {
            literature: Duration::from_secs(20),
            registry: Duration::from_secs(15),
            vendor: Duration::from_secs(15),
        }
    }
}

/// The configured collaborators for a request
///
/// Any source may be left out; it is then reported as
/// [`LookupOutcome::Skipped`].
#[derive(Clone)]
pub struct LookupSet {
    literature: Option<Arc<dyn LiteratureSource>>,
    registry: Option<Arc<dyn RegistrySource>>,
    vendor: Option<Arc<dyn VendorSource>>,
    timeouts: LookupTimeouts,
    workers: usize,
}

impl Default for LookupSet {
    fn default() -> Self {
        Self {
            literature: None,
            registry: None,
            vendor: None,
            timeouts: LookupTimeouts::default(),
            workers: 3,
        }
    }
}

impl LookupSet {
    /// A set with no sources configured
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_literature(mut self, source: impl LiteratureSource + 'static) -> Self {
        self.literature = Some(Arc::new(source));
        self
    }

    pub fn with_registry(mut self, source: impl RegistrySource + 'static) -> Self {
        self.registry = Some(Arc::new(source));
        self
    }

    pub fn with_vendor(mut self, source: impl VendorSource + 'static) -> Self {
        self.vendor = Some(Arc::new(source));
        self
    }

    pub fn with_timeouts(mut self, timeouts: LookupTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Maximum number of lookups running at once (at least 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

/// Outcomes of one fan-out, one per source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResults {
    pub literature: LookupOutcome<LiteratureResult>,
    pub registry: LookupOutcome<RegistryResult>,
    pub vendor: LookupOutcome<DrugMetadata>,
}

impl LookupResults {
    /// Every source skipped
    pub fn skipped() -> Self {
        Self {
            literature: LookupOutcome::Skipped,
            registry: LookupOutcome::Skipped,
            vendor: LookupOutcome::Skipped,
        }
    }

    /// CVintra mined from a completed literature lookup
    pub fn extracted_cv(&self) -> Option<f64> {
        self.literature.completed().and_then(|lit| lit.extracted_cv())
    }
}

/// Run every configured lookup concurrently
///
/// Each lookup waits for a worker, then runs as its own task raced against
/// its deadline. The deadline starts once the lookup holds a worker. A
/// lookup that misses its deadline has its cancellation token fired and its
/// task aborted. Dropping the returned future does the same for every lookup
/// still in flight, so no work is left running in the background.
/// Cancelling `cancel` stops all lookups still in flight. This function
/// returns once every lookup has settled.
pub async fn run_lookups(
    set: &LookupSet,
    inn: &str,
    cancel: &CancellationToken,
) -> LookupResults {
    let permits = Arc::new(Semaphore::new(set.workers));

    let literature = async {
        let Some(source) = set.literature.clone() else {
            return LookupOutcome::Skipped;
        };
        let inn = inn.to_string();
        run_bounded(
            "literature",
            async move { source.search(&inn).await.map(|r| r.with_mined_parameters()) },
            set.timeouts.literature,
            cancel,
            Arc::clone(&permits),
        )
        .await
    };

    let registry = async {
        let Some(source) = set.registry.clone() else {
            return LookupOutcome::Skipped;
        };
        let inn = inn.to_string();
        run_bounded(
            "registry",
            async move { source.search(&inn).await },
            set.timeouts.registry,
            cancel,
            Arc::clone(&permits),
        )
        .await
    };

    let vendor = async {
        let Some(source) = set.vendor.clone() else {
            return LookupOutcome::Skipped;
        };
        let inn = inn.to_string();
        run_bounded(
            "vendor",
            async move { source.drug_info(&inn).await },
            set.timeouts.vendor,
            cancel,
            Arc::clone(&permits),
        )
        .await
    };

    let (literature, registry, vendor) = tokio::join!(literature, registry, vendor);

    LookupResults {
        literature,
        registry,
        vendor,
    }
}

/// Aborts the wrapped task when dropped
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn run_bounded<T, F>(
    name: &'static str,
    lookup: F,
    timeout: Duration,
    parent: &CancellationToken,
    permits: Arc<Semaphore>,
) -> LookupOutcome<T>
where
    F: Future<Output = Result<T, LookupError>> + Send + 'static,
    T: Send + 'static,
{
    // The deadline covers the lookup itself, not time spent queued for a worker.
    let permit = tokio::select! {
        biased;
        _ = parent.cancelled() => {
            warn!(lookup = name, "lookup cancelled before start");
            return LookupOutcome::Cancelled;
        }
        permit = permits.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(e) => return LookupOutcome::Failed(e.to_string()),
        },
    };

    let token = parent.child_token();
    let task_token = token.clone();
    // Fires on every exit path, including the caller dropping this future.
    let _cancel_on_exit = token.clone().drop_guard();

    let mut handle = AbortOnDrop(tokio::spawn(async move {
        let _permit = permit;
        tokio::select! {
            _ = task_token.cancelled() => None,
            result = lookup => Some(result),
        }
    }));

    match tokio::time::timeout(timeout, &mut handle.0).await {
        Ok(Ok(Some(Ok(value)))) => {
            debug!(lookup = name, "lookup completed");
            LookupOutcome::Completed(value)
        }
        Ok(Ok(Some(Err(e)))) => {
            warn!(lookup = name, error = %e, "lookup failed");
            LookupOutcome::Failed(e.to_string())
        }
        Ok(Ok(None)) => {
            warn!(lookup = name, "lookup cancelled");
            LookupOutcome::Cancelled
        }
        Ok(Err(e)) => {
            warn!(lookup = name, error = %e, "lookup task panicked");
            LookupOutcome::Failed(e.to_string())
        }
        Err(_) => {
            token.cancel();
            warn!(
                lookup = name,
                timeout_secs = timeout.as_secs_f64(),
                "lookup timed out"
            );
            LookupOutcome::Timeout
        }
    }
}
