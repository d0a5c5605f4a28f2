//! Conversion entry point
//!
//! Ties the stages together: metadata resolution, named values, tables and
//! assembly. Each call owns its engine state; the taxonomy and profile are
//! shared read-only.

use crate::assembler::{assemble, Conversion};
use crate::engine::Engine;
use crate::error::ConversionError;
use crate::metadata::MetadataResolver;
use crate::profile::Profile;
use crate::table;
use mireport_adapters::{adapter_for, AdaptedInput, InputAdapter};
use mireport_model::Severity;
use mireport_taxonomy::Taxonomy;
use serde_json::Value;
use std::sync::Arc;

/// Converts adapted input against one taxonomy and profile
///
/// Cheap to clone; clones share the taxonomy and profile.
#[derive(Debug, Clone)]
pub struct Converter {
    taxonomy: Arc<Taxonomy>,
    profile: Arc<Profile>,
}

impl Converter {
    /// Create converter
    #[inline]
    #[must_use]
    pub fn new(taxonomy: Arc<Taxonomy>, profile: Arc<Profile>) -> Self {
        Self { taxonomy, profile }
    }

    /// Taxonomy in use
    #[inline]
    #[must_use]
    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Profile in use
    #[inline]
    #[must_use]
    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    /// Convert adapted input into a report
    ///
    /// # Errors
    /// Returns [`ConversionError::IncompleteReport`] when the report fails
    /// the completeness gate
    pub fn convert(&self, input: AdaptedInput) -> Result<Conversion, ConversionError> {
        let _span = tracing::info_span!("convert", entry_point = %self.taxonomy.entry_point()).entered();
        tracing::info!(
            values = input.values.len(),
            tables = input.tables.len(),
            "Starting conversion"
        );

        let AdaptedInput {
            metadata: raw_metadata,
            values,
            tables,
            mut diagnostics,
        } = input;

        let metadata = MetadataResolver::new(&self.taxonomy, &self.profile).resolve(&raw_metadata, &mut diagnostics);
        let mut engine = Engine::new(&self.taxonomy, &self.profile, &metadata, diagnostics);
        engine.resolve_all(&values);
        table::flatten(&mut engine, &tables);
        let output = engine.finish();

        let result = assemble(&self.taxonomy, metadata, output);
        match &result {
            Ok(conversion) => tracing::info!(
                facts = conversion.report.facts.len(),
                contexts = conversion.report.contexts.len(),
                units = conversion.report.units.len(),
                errors = conversion.diagnostics.count(Severity::Error),
                warnings = conversion.diagnostics.count(Severity::Warning),
                "Conversion completed"
            ),
            Err(e) => tracing::error!("Conversion failed: {}", e),
        }
        result
    }

    /// Adapt a parsed document and convert it
    ///
    /// # Errors
    /// Returns error if no adapter accepts the document or the report is
    /// incomplete
    pub fn convert_document(&self, document: Value) -> Result<Conversion, ConversionError> {
        let adapter = adapter_for(document)?;
        tracing::debug!(adapter = adapter.kind(), "Selected input adapter");
        self.convert(adapter.adapt()?)
    }
}

/// Convert adapted input with a shared taxonomy and profile
///
/// # Errors
/// See [`Converter::convert`]
pub fn convert(
    input: AdaptedInput,
    taxonomy: Arc<Taxonomy>,
    profile: Arc<Profile>,
) -> Result<Conversion, ConversionError> {
    Converter::new(taxonomy, profile).convert(input)
}
