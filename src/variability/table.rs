//! Reference table of typical CVintra values
//!
//! A read-only mapping from drug name to a default CVintra, used when no
//! better estimate is available. Tables are plain values: build one with
//! [`ReferenceTable::builtin`], [`ReferenceTable::from_csv`] or by hand, and
//! pass it to the [`Resolver`](super::Resolver).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// CVintra used for drugs that are not in the table
pub const DEFAULT_FALLBACK_CV: f64 = 25.0;

/// Errors raised while building a reference table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReferenceTableError {
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("Invalid CVintra {value} for '{drug}': must be a positive percentage")]
    InvalidValue { drug: String, value: f64 },
    #[error("Empty drug name in reference table")]
    EmptyName,
}

// Built-in typical CVintra values (percent)
const BUILTIN: [(&str, f64); 20] = [
    ("aspirin", 15.0),
    ("metformin", 35.0),
    ("ibuprofen", 20.0),
    ("paracetamol", 18.0),
    ("amlodipine", 22.0),
    ("simvastatin", 30.0),
    ("atorvastatin", 28.0),
    ("omeprazole", 40.0),
    ("warfarin", 45.0),
    ("levothyroxine", 50.0),
    ("propranolol", 55.0),
    ("phenytoin", 30.0),
    ("digoxin", 25.0),
    ("theophylline", 20.0),
    ("carbamazepine", 25.0),
    ("valproic acid", 18.0),
    ("lithium", 22.0),
    ("cyclosporine", 35.0),
    ("tacrolimus", 30.0),
    ("sirolimus", 28.0),
];

/// Drug name → typical CVintra, with a fallback for unknown drugs
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    entries: HashMap<String, f64>,
    fallback: f64,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    drug: String,
    cvintra: f64,
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReferenceTable {
    /// Create an empty table with the default fallback
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: DEFAULT_FALLBACK_CV,
        }
    }

    /// Create a table with the built-in drug list
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (drug, cv) in BUILTIN {
            table.entries.insert(drug.to_string(), cv);
        }
        table
    }

    /// Load a table from a CSV file with `drug,cvintra` columns
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, ReferenceTableError> {
        let mut table = Self::new();
        table.load_csv(path)?;
        Ok(table)
    }

    /// Load CSV entries into this table, overriding existing drugs
    pub fn load_csv(&mut self, path: impl AsRef<Path>) -> Result<(), ReferenceTableError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| ReferenceTableError::Csv(e.to_string()))?;

        for row in reader.deserialize() {
            let row: TableRow = row.map_err(|e| ReferenceTableError::Csv(e.to_string()))?;
            self.insert(row.drug, row.cvintra)?;
        }
        Ok(())
    }

    /// Add or replace a drug entry
    ///
    /// Names are stored lowercase. Values must be finite and positive.
    pub fn insert(
        &mut self,
        drug: impl Into<String>,
        cvintra: f64,
    ) -> Result<(), ReferenceTableError> {
        let drug = drug.into();
        let key = drug.trim().to_lowercase();
        if key.is_empty() {
            return Err(ReferenceTableError::EmptyName);
        }
        if !cvintra.is_finite() || cvintra <= 0.0 {
            return Err(ReferenceTableError::InvalidValue {
                drug,
                value: cvintra,
            });
        }
        self.entries.insert(key, cvintra);
        Ok(())
    }

    /// Set the CVintra returned for unknown drugs
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Case-insensitive exact lookup
    pub fn get(&self, drug: &str) -> Option<f64> {
        self.entries.get(&drug.to_lowercase()).copied()
    }

    /// Table value for a drug, or the fallback
    pub fn get_or_fallback(&self, drug: &str) -> f64 {
        self.get(drug).unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    /// List all drug names, sorted
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
