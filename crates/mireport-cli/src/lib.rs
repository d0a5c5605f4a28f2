//! Command-line front end
//!
//! File loading and the conversion outcome live here so the binary stays a
//! thin argument parser.

use anyhow::{bail, Context, Result};
use mireport_adapters::InputFormat;
use mireport_core::{Conversion, ConversionError, Converter, Profile};
use mireport_model::Diagnostics;
use mireport_taxonomy::{Taxonomy, TaxonomyCache, TaxonomyError};
use serde_json::{json, Value};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Exit status for a written report
pub const EXIT_OK: i32 = 0;
/// Exit status when the report failed the completeness gate
pub const EXIT_INCOMPLETE: i32 = 1;
/// Exit status for unreadable input or configuration
pub const EXIT_FAILURE: i32 = 2;

/// Result of one conversion run
#[derive(Debug)]
pub enum Outcome {
    /// Report assembled
    Converted(Box<Conversion>),
    /// Report withheld; diagnostics explain why
    Incomplete {
        /// Gate failures
        reasons: Vec<String>,
        /// Everything found along the way
        diagnostics: Diagnostics,
    },
}

impl Outcome {
    /// Process exit status for this outcome
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Converted(_) => EXIT_OK,
            Self::Incomplete { .. } => EXIT_INCOMPLETE,
        }
    }

    /// JSON written to stdout
    ///
    /// # Errors
    /// Returns error if the report cannot be serialized
    pub fn to_json(&self) -> serde_json::Result<Value> {
        Ok(match self {
            Self::Converted(conversion) => serde_json::to_value(conversion)?,
            Self::Incomplete { reasons, diagnostics } => json!({
                "report": Value::Null,
                "reasons": reasons.clone(),
                "diagnostics": serde_json::to_value(diagnostics)?,
            }),
        })
    }
}

fn format_of(path: &Path) -> InputFormat {
    InputFormat::from_path(path).unwrap_or(InputFormat::Json)
}

fn read_text(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Load a taxonomy snapshot through the cache, keyed by path
///
/// # Errors
/// Returns error if the file cannot be read or is not a valid snapshot
pub fn load_taxonomy(cache: &TaxonomyCache, path: &Path) -> Result<Arc<Taxonomy>> {
    let key = path.display().to_string();
    let taxonomy = cache
        .get_or_load(&key, || {
            let text = std::fs::read_to_string(path)
                .map_err(|e| TaxonomyError::LoadFailed(format!("{key}: {e}")))?;
            match format_of(path) {
                InputFormat::Json => Taxonomy::from_json(&text),
                InputFormat::Yaml => Taxonomy::from_yaml(&text),
            }
        })
        .with_context(|| format!("failed to load taxonomy {key}"))?;
    Ok(taxonomy)
}

/// Load a conversion profile; no path means the default profile
///
/// # Errors
/// Returns error if the file cannot be read or is not a valid profile
pub fn load_profile(path: Option<&Path>) -> Result<Profile> {
    let Some(path) = path else {
        return Ok(Profile::default());
    };
    let text = read_text(path)?;
    let profile = match format_of(path) {
        InputFormat::Json => Profile::from_json(&text),
        InputFormat::Yaml => Profile::from_yaml(&text),
    }
    .with_context(|| format!("failed to load profile {}", path.display()))?;
    Ok(profile)
}

/// Read an input document; `-` reads standard input as JSON
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn read_document(path: &Path) -> Result<Value> {
    let text = read_text(path)?;
    format_of(path)
        .parse(&text)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Convert one input document
///
/// # Errors
/// Returns error for anything other than a failed completeness gate
pub fn run_convert(taxonomy: Arc<Taxonomy>, profile: Profile, input: &Path) -> Result<Outcome> {
    let document = read_document(input)?;
    let converter = Converter::new(taxonomy, Arc::new(profile));
    match converter.convert_document(document) {
        Ok(conversion) => Ok(Outcome::Converted(Box::new(conversion))),
        Err(ConversionError::IncompleteReport { reasons, diagnostics }) => {
            Ok(Outcome::Incomplete { reasons, diagnostics })
        }
        Err(e) => Err(e).with_context(|| format!("failed to convert {}", input.display())),
    }
}

/// Describe a taxonomy, or one of its concepts
///
/// # Errors
/// Returns error if `concept` is given but unknown
pub fn describe(taxonomy: &Taxonomy, concept: Option<&str>) -> Result<Value> {
    if let Some(name) = concept {
        let Some(concept) = taxonomy.lookup(name).or_else(|| taxonomy.lookup_by_label(name)) else {
            bail!("'{name}' is not a concept of {}", taxonomy.entry_point());
        };
        return Ok(serde_json::to_value(concept)?);
    }
    let mut names: Vec<&str> = taxonomy
        .concepts()
        .filter(|c| c.is_reportable())
        .map(|c| c.name.as_str())
        .collect();
    names.sort_unstable();
    Ok(json!({
        "entryPoint": taxonomy.entry_point(),
        "prefix": taxonomy.prefix(),
        "concepts": taxonomy.len(),
        "units": taxonomy.units().len(),
        "reportable": Value::from(names),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mireport_test_utils::vsme_taxonomy;

    #[test]
    fn describe_lists_reportable_concepts() {
        let summary = describe(&vsme_taxonomy(), None).unwrap();
        let names = summary["reportable"].as_array().unwrap();
        assert!(names.iter().any(|n| n == "NumberOfEmployees"));
        assert!(!names.iter().any(|n| n == "EnvironmentalMetricsAbstract"));
    }

    #[test]
    fn describe_one_concept() {
        let concept = describe(&vsme_taxonomy(), Some("vsme:Revenue")).unwrap();
        assert_eq!(concept["dataType"], "monetary");
        assert!(describe(&vsme_taxonomy(), Some("Nope")).is_err());
    }

    #[test]
    fn default_profile_without_path() {
        assert_eq!(load_profile(None).unwrap(), Profile::default());
    }
}
