//! Report assembler
//!
//! Collects the engine's output into an [`InlineReport`] behind the single
//! completeness gate: at least one fact, a known entity and a principal
//! period.

use crate::engine::EngineOutput;
use crate::error::ConversionError;
use crate::metadata::ResolvedMetadata;
use mireport_model::{Category, Diagnostic, Diagnostics, InlineReport, ReportMetadata};
use mireport_taxonomy::Taxonomy;
use serde::Serialize;

/// A successful conversion
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// The assembled report
    pub report: InlineReport,
    /// Everything found along the way
    pub diagnostics: Diagnostics,
}

/// Assemble the report or fail the completeness gate
///
/// # Errors
/// Returns [`ConversionError::IncompleteReport`] when no fact was produced
/// or the entity or principal period is missing
pub fn assemble(
    taxonomy: &Taxonomy,
    metadata: ResolvedMetadata,
    output: EngineOutput,
) -> Result<Conversion, ConversionError> {
    let EngineOutput {
        contexts,
        units,
        facts,
        mut diagnostics,
        unused,
    } = output;

    if !unused.is_empty() {
        diagnostics.push(Diagnostic::new(
            Category::UnusedNamedValue,
            format!("{} named value(s) produced no fact: {}", unused.len(), unused.join(", ")),
        ));
    }
    diagnostics.push(Diagnostic::new(
        Category::Summary,
        format!(
            "{} fact(s) in {} context(s) with {} unit(s)",
            facts.len(),
            contexts.len(),
            units.len()
        ),
    ));

    let mut reasons = Vec::new();
    if facts.is_empty() {
        reasons.push("no facts were produced".to_string());
    }
    if metadata.entity.is_none() {
        reasons.push("entity identifier or scheme is missing".to_string());
    }
    let principal = metadata.periods.principal();
    if principal.is_none() {
        reasons.push("principal reporting period is missing".to_string());
    }

    let (Some(entity), Some((period_start, period_end)), false) = (metadata.entity, principal, facts.is_empty())
    else {
        diagnostics.push(Diagnostic::new(Category::IncompleteReport, reasons.join("; ")));
        return Err(ConversionError::IncompleteReport { reasons, diagnostics });
    };

    let report = InlineReport {
        metadata: ReportMetadata {
            entry_point: taxonomy.entry_point().to_string(),
            entity,
            entity_name: metadata.entity_name,
            period_start,
            period_end,
            title: metadata.title,
            subtitle: metadata.subtitle,
            currency: metadata.currency,
            locale: metadata.locale,
        },
        periods: metadata.periods.to_vec(),
        contexts: contexts.iter().map(|(id, c)| (id, c.clone())).collect(),
        units: units.iter().map(|(id, u)| (id, u.clone())).collect(),
        facts: facts.into_vec(),
    };
    Ok(Conversion { report, diagnostics })
}
