//! Runtime configuration
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration:
//!
//! ```toml
//! [engine]
//! power = 0.80
//! alpha = 0.05
//! dropout = 0.20
//!
//! [lookups]
//! literature_timeout_secs = 20
//! registry_timeout_secs = 15
//! vendor_timeout_secs = 15
//! workers = 3
//!
//! [reference_table]
//! path = "cv_table.csv"
//! fallback_cv = 25.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::lookup::LookupTimeouts;
use crate::sample_size::SampleSizeOptions;
use crate::variability::{ReferenceTable, ReferenceTableError, DEFAULT_FALLBACK_CV};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value {field} = {value}")]
    Invalid { field: String, value: String },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub lookups: LookupConfig,
    #[serde(default)]
    pub reference_table: TableConfig,
}

/// Sample size engine defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_power")]
    pub power: f64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_dropout")]
    pub dropout: f64,
}

fn default_power() -> f64 {
    0.80
}

fn default_alpha() -> f64 {
    0.05
}

fn default_dropout() -> f64 {
    0.20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            power: default_power(),
            alpha: default_alpha(),
            dropout: default_dropout(),
        }
    }
}

impl From<&EngineConfig> for SampleSizeOptions {
    fn from(config: &EngineConfig) -> Self {
        SampleSizeOptions::default()
            .with_power(config.power)
            .with_alpha(config.alpha)
            .with_dropout(config.dropout)
    }
}

/// External lookup limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_literature_timeout")]
    pub literature_timeout_secs: u64,
    #[serde(default = "default_lookup_timeout")]
    pub registry_timeout_secs: u64,
    #[serde(default = "default_lookup_timeout")]
    pub vendor_timeout_secs: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_literature_timeout() -> u64 {
    20
}

fn default_lookup_timeout() -> u64 {
    15
}

fn default_workers() -> usize {
    3
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            literature_timeout_secs: default_literature_timeout(),
            registry_timeout_secs: default_lookup_timeout(),
            vendor_timeout_secs: default_lookup_timeout(),
            workers: default_workers(),
        }
    }
}

impl From<&LookupConfig> for LookupTimeouts {
    fn from(config: &LookupConfig) -> Self {
        LookupTimeouts {
            literature: Duration::from_secs(config.literature_timeout_secs),
            registry: Duration::from_secs(config.registry_timeout_secs),
            vendor: Duration::from_secs(config.vendor_timeout_secs),
        }
    }
}

/// Reference table source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Optional CSV merged over the built-in table
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_fallback_cv")]
    pub fallback_cv: f64,
}

fn default_fallback_cv() -> f64 {
    DEFAULT_FALLBACK_CV
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            path: None,
            fallback_cv: default_fallback_cv(),
        }
    }
}

impl TableConfig {
    /// Build the reference table this configuration describes
    pub fn build(&self) -> Result<ReferenceTable, ReferenceTableError> {
        let mut table = ReferenceTable::builtin().with_fallback(self.fallback_cv);
        if let Some(path) = &self.path {
            table.load_csv(path)?;
        }
        Ok(table)
    }
}

impl Config {
    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.engine.dropout) {
            return Err(invalid("engine.dropout", self.engine.dropout));
        }
        if self.lookups.workers == 0 {
            return Err(invalid("lookups.workers", self.lookups.workers));
        }
        for (field, secs) in [
            ("lookups.literature_timeout_secs", self.lookups.literature_timeout_secs),
            ("lookups.registry_timeout_secs", self.lookups.registry_timeout_secs),
            ("lookups.vendor_timeout_secs", self.lookups.vendor_timeout_secs),
        ] {
            if secs == 0 {
                return Err(invalid(field, secs));
            }
        }
        if !self.reference_table.fallback_cv.is_finite() || self.reference_table.fallback_cv <= 0.0
        {
            return Err(invalid(
                "reference_table.fallback_cv",
                self.reference_table.fallback_cv,
            ));
        }
        Ok(())
    }

    pub fn sample_size_options(&self) -> SampleSizeOptions {
        SampleSizeOptions::from(&self.engine)
    }

    pub fn lookup_timeouts(&self) -> LookupTimeouts {
        LookupTimeouts::from(&self.lookups)
    }
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        value: value.to_string(),
    }
}
