//! Facts and the conflict-checked fact set

use crate::diagnostics::Provenance;
use crate::intern::{ContextId, UnitId};
use crate::value::FactValue;
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Serialize;

/// A typed value of one concept in one context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fact {
    /// Concept local name
    pub concept: String,
    /// Typed value
    pub value: FactValue,
    /// Interned context
    pub context: ContextId,
    /// Interned unit (numeric and monetary facts only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitId>,
    /// Decimal accuracy (numeric facts only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<i32>,
    /// Where the value came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl Fact {
    /// Identity key: two facts with the same key must agree on the value
    #[inline]
    #[must_use]
    pub fn key(&self) -> FactKey {
        (self.concept.clone(), self.context, self.unit)
    }
}

/// (concept, context, unit)
pub type FactKey = (String, ContextId, Option<UnitId>);

/// Outcome of adding a fact to a [`FactSet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactInsert {
    /// New fact stored
    Added,
    /// Same key and value already present; nothing stored
    Duplicate,
    /// Same key with a different value; the first fact is kept
    Conflict {
        /// The fact that was kept
        existing: Box<Fact>,
    },
}

/// Facts keyed by (concept, context, unit), in insertion order
#[derive(Debug, Clone, Default)]
pub struct FactSet {
    facts: IndexMap<FactKey, Fact>,
}

impl FactSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fact unless its key is taken
    pub fn insert(&mut self, fact: Fact) -> FactInsert {
        match self.facts.entry(fact.key()) {
            Entry::Vacant(slot) => {
                slot.insert(fact);
                FactInsert::Added
            }
            Entry::Occupied(existing) if existing.get().value.same_as(&fact.value) => FactInsert::Duplicate,
            Entry::Occupied(existing) => FactInsert::Conflict {
                existing: Box::new(existing.get().clone()),
            },
        }
    }

    /// Whether any fact of `concept` was stored
    #[must_use]
    pub fn has_concept(&self, concept: &str) -> bool {
        self.facts.keys().any(|(c, _, _)| c == concept)
    }

    /// Number of facts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether no facts were stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Facts in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    /// Consume into facts in insertion order
    #[must_use]
    pub fn into_vec(self) -> Vec<Fact> {
        self.facts.into_values().collect()
    }
}
