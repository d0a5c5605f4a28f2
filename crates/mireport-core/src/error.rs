//! Error types for conversion
//!
//! Data-quality problems are [`Diagnostics`], not errors. The types here
//! cover unreadable configuration and input, and the single fatal gate.

use mireport_adapters::AdapterError;
use mireport_model::Diagnostics;
use mireport_taxonomy::TaxonomyError;

/// Errors loading a configuration profile
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Profile is not valid JSON
    #[error("invalid profile JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Profile is not valid YAML
    #[error("invalid profile YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Complex unit has no numerator or denominator
    #[error("complex unit '{0}' needs at least one numerator and one denominator measure")]
    InvalidComplexUnit(String),

    /// Currency code is not three letters
    #[error("invalid default currency '{0}'")]
    InvalidCurrency(String),
}

/// Errors returned by a conversion
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Input document could not be adapted
    #[error("input error: {0}")]
    Adapter(#[from] AdapterError),

    /// Taxonomy could not be loaded
    #[error("taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    /// Profile could not be loaded
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Report lacks facts or required metadata
    #[error("incomplete report: {}", .reasons.join("; "))]
    IncompleteReport {
        /// Why the report is incomplete
        reasons: Vec<String>,
        /// Everything found during the conversion
        diagnostics: Diagnostics,
    },
}

impl ConversionError {
    /// Diagnostics gathered before the conversion was abandoned
    #[must_use]
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::IncompleteReport { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}
