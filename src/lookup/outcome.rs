//! Status of an external lookup

use serde::{Deserialize, Serialize};

/// Result of one external lookup
///
/// Lookups never fail a request: a slow collaborator becomes `Timeout`, a
/// failing one becomes `Failed` with its message, and an unconfigured one is
/// `Skipped`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum LookupOutcome<T> {
    #[serde(rename = "ok")]
    Completed(T),
    Timeout,
    #[serde(rename = "error")]
    Failed(String),
    Cancelled,
    Skipped,
}

impl<T> LookupOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, LookupOutcome::Completed(_))
    }

    /// The payload, if the lookup completed
    pub fn completed(&self) -> Option<&T> {
        match self {
            LookupOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            LookupOutcome::Completed(_) => "ok",
            LookupOutcome::Timeout => "timeout",
            LookupOutcome::Failed(_) => "error",
            LookupOutcome::Cancelled => "cancelled",
            LookupOutcome::Skipped => "skipped",
        }
    }
}
