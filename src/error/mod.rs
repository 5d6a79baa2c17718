//! Crate error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::sample_size::SampleSizeError;
use crate::variability::ReferenceTableError;

/// Invalid caller input, rejected before any computation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Drug identifier (INN) is required")]
    MissingDrugIdentifier,
    #[error("CVintra must be a finite, non-negative percentage, got {0}")]
    InvalidCvIntra(f64),
    #[error("Unknown design '{0}'. Expected one of: auto, 2x2, 3way, 4way")]
    UnknownDesign(String),
}

#[derive(Error, Debug)]
pub enum BeDesignError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),
    #[error("Sample size computation failed: {0}")]
    Computation(#[from] SampleSizeError),
    #[error("Reference table error: {0}")]
    ReferenceTable(#[from] ReferenceTableError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
