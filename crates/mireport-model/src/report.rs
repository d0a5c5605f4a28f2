//! The assembled report

use crate::context::{Context, EntityIdentifier};
use crate::fact::Fact;
use crate::intern::{ContextId, UnitId};
use crate::period::Period;
use crate::unit::Unit;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

/// Document-level metadata of a complete report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Taxonomy entry point the report conforms to
    pub entry_point: String,
    /// Reporting entity
    pub entity: EntityIdentifier,
    /// Entity display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    /// First day of the principal period
    pub period_start: NaiveDate,
    /// Last day of the principal period
    pub period_end: NaiveDate,
    /// Report title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Report subtitle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// ISO 4217 report currency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// BCP 47 locale (`en-GB`)
    pub locale: String,
}

/// Facts with the contexts, units and periods they reference
///
/// Every context and unit id used by a fact is present in `contexts` and
/// `units`, and every period named by a context is present in `periods`.
#[derive(Debug, Clone, Serialize)]
pub struct InlineReport {
    /// Document metadata
    pub metadata: ReportMetadata,
    /// Registered periods
    pub periods: Vec<Period>,
    /// Interned contexts by id
    pub contexts: IndexMap<ContextId, Context>,
    /// Interned units by id
    pub units: IndexMap<UnitId, Unit>,
    /// Facts in resolution order
    pub facts: Vec<Fact>,
}

impl InlineReport {
    /// Facts of one concept
    pub fn facts_for<'a>(&'a self, concept: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts.iter().filter(move |f| f.concept == concept)
    }

    /// Context of a fact
    #[must_use]
    pub fn context_of(&self, fact: &Fact) -> Option<&Context> {
        self.contexts.get(&fact.context)
    }

    /// Unit of a fact
    #[must_use]
    pub fn unit_of(&self, fact: &Fact) -> Option<&Unit> {
        fact.unit.and_then(|id| self.units.get(&id))
    }
}
