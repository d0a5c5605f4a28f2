//! Error types for input adapters

/// Errors that prevent an input document from being adapted at all
///
/// Problems with individual values are diagnostics, not errors.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Input is not valid JSON
    #[error("invalid JSON input: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Input is not valid YAML
    #[error("invalid YAML input: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Input shape matches no adapter
    #[error("unsupported input shape: {0}")]
    UnsupportedShape(String),

    /// Metadata section has the wrong shape
    #[error("invalid metadata section: {0}")]
    InvalidMetadata(String),

    /// Named range is structurally broken
    #[error("invalid named range '{name}': {reason}")]
    InvalidRange {
        /// Range name
        name: String,
        /// What is wrong
        reason: String,
    },
}

impl AdapterError {
    /// Create invalid range error
    pub fn invalid_range(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
