//! Error types for taxonomy loading

/// Errors raised while loading or validating a taxonomy snapshot
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    /// Snapshot JSON could not be parsed
    #[error("invalid taxonomy JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Snapshot YAML could not be parsed
    #[error("invalid taxonomy YAML: {0}")]
    InvalidYaml(#[source] serde_yaml::Error),

    /// Snapshot has no entry point
    #[error("taxonomy snapshot has no entry point")]
    MissingEntryPoint,

    /// Concept requires a unit the registry does not know
    #[error("concept '{concept}' requires unknown unit '{unit}'")]
    UnknownUnit { concept: String, unit: String },

    /// Axis default is not one of the axis members
    #[error("default member '{member}' is not a member of axis '{axis}'")]
    InvalidAxisDefault { axis: String, member: String },

    /// Snapshot source could not be read
    #[error("taxonomy load failed: {0}")]
    LoadFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TaxonomyError::UnknownUnit {
            concept: "Energy".to_string(),
            unit: "parsec".to_string(),
        };
        assert_eq!(err.to_string(), "concept 'Energy' requires unknown unit 'parsec'");
        assert_eq!(
            TaxonomyError::LoadFailed("x.json: not found".to_string()).to_string(),
            "taxonomy load failed: x.json: not found"
        );
    }
}
