//! Resolution engine
//!
//! A fold over raw values: each value either becomes a fact or leaves
//! diagnostics behind, and nothing stops the pass. Values are processed in
//! (name, provenance) order so the interned ids do not depend on input order.
//!
//! Per value:
//! 1. concept lookup (unmapped, abstract and empty values are dropped)
//! 2. type coercion
//! 3. unit cascade (numeric concepts only)
//! 4. period resolution
//! 5. dimension resolution
//! 6. context and unit interning
//! 7. conflict check against facts already resolved

use crate::coerce::{infer_decimals, is_empty, Coercer};
use crate::metadata::ResolvedMetadata;
use crate::profile::{InvalidMemberPolicy, Profile};
use crate::unit_resolution::UnitResolver;
use mireport_adapters::RawValue;
use mireport_model::{
    Category, Context, ContextInterner, Diagnostic, Diagnostics, EntityIdentifier, Fact, FactInsert, FactSet,
    PeriodRegistry, Provenance, UnitInterner,
};
use mireport_taxonomy::{Concept, Taxonomy};
use std::collections::{BTreeMap, BTreeSet};

/// What happened to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// New fact stored
    Added,
    /// Identical fact already present
    Duplicate,
    /// Value dropped; see diagnostics
    Dropped,
}

impl Resolution {
    /// Whether the value is represented by a fact
    #[inline]
    #[must_use]
    pub fn produced_fact(self) -> bool {
        matches!(self, Self::Added | Self::Duplicate)
    }
}

/// Everything the engine produced
#[derive(Debug)]
pub struct EngineOutput {
    /// Interned contexts
    pub contexts: ContextInterner,
    /// Interned units
    pub units: UnitInterner,
    /// Resolved facts
    pub facts: FactSet,
    /// Diagnostics in the order found
    pub diagnostics: Diagnostics,
    /// Names of raw values that produced no fact, sorted
    pub unused: Vec<String>,
}

/// Per-conversion resolution state
#[derive(Debug)]
pub struct Engine<'a> {
    taxonomy: &'a Taxonomy,
    profile: &'a Profile,
    metadata: &'a ResolvedMetadata,
    entity: EntityIdentifier,
    contexts: ContextInterner,
    units: UnitInterner,
    facts: FactSet,
    diagnostics: Diagnostics,
    seen: BTreeSet<String>,
    productive: BTreeSet<String>,
}

impl<'a> Engine<'a> {
    /// Create engine; `diagnostics` holds findings from earlier stages
    #[must_use]
    pub fn new(
        taxonomy: &'a Taxonomy,
        profile: &'a Profile,
        metadata: &'a ResolvedMetadata,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            taxonomy,
            profile,
            metadata,
            // a missing entity fails the completeness gate; contexts still
            // need one meanwhile
            entity: metadata.entity.clone().unwrap_or_default(),
            contexts: ContextInterner::new(),
            units: UnitInterner::new(),
            facts: FactSet::new(),
            diagnostics,
            seen: BTreeSet::new(),
            productive: BTreeSet::new(),
        }
    }

    /// Taxonomy in use
    #[inline]
    #[must_use]
    pub fn taxonomy(&self) -> &'a Taxonomy {
        self.taxonomy
    }

    /// Profile in use
    #[inline]
    #[must_use]
    pub fn profile(&self) -> &'a Profile {
        self.profile
    }

    /// Diagnostics so far
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Record a diagnostic
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Resolve all values in (name, provenance) order
    pub fn resolve_all(&mut self, values: &[RawValue]) {
        let mut ordered: Vec<&RawValue> = values.iter().collect();
        ordered.sort_by_cached_key(|v| (v.name.clone(), v.provenance.clone(), v.payload.to_string()));
        for value in ordered {
            self.resolve(value);
        }
    }

    /// Resolve one named value
    pub fn resolve(&mut self, raw: &RawValue) -> Resolution {
        let name = raw.name.trim().to_string();
        self.seen.insert(name.clone());
        let outcome = match self.concept_for(&name, raw.provenance.as_ref()) {
            Some(concept) => self.resolve_as(concept, raw, &BTreeMap::new()),
            None => Resolution::Dropped,
        };
        if outcome.produced_fact() {
            self.productive.insert(name);
        }
        outcome
    }

    /// Look up the reportable concept for a name
    pub fn concept_for(&mut self, name: &str, provenance: Option<&Provenance>) -> Option<&'a Concept> {
        let taxonomy = self.taxonomy;
        let Some(concept) = taxonomy.lookup(name) else {
            self.diagnostics.push(
                Diagnostic::new(Category::UnmappedConcept, format!("'{name}' does not name a taxonomy concept"))
                    .with_provenance(provenance.cloned()),
            );
            return None;
        };
        if !concept.is_reportable() {
            self.diagnostics.push(
                Diagnostic::new(Category::NonReportableConcept, format!("{} is abstract", concept.name))
                    .with_provenance(provenance.cloned())
                    .with_concept(&concept.name),
            );
            return None;
        }
        Some(concept)
    }

    /// Resolve a value of a known concept within extra `scope` dimensions
    pub fn resolve_as(
        &mut self,
        concept: &Concept,
        raw: &RawValue,
        scope: &BTreeMap<String, String>,
    ) -> Resolution {
        let provenance = raw.provenance.as_ref();
        if is_empty(&raw.payload, self.profile) {
            self.flag(Category::EmptyValue, concept, provenance, format!("{} has no value", raw.name));
            return Resolution::Dropped;
        }

        let coerced = match Coercer::new(self.taxonomy, self.profile).coerce(concept, &raw.payload) {
            Ok(coerced) => coerced,
            Err(e) => {
                self.flag(Category::TypeCoercionFailed, concept, provenance, e.to_string());
                return Resolution::Dropped;
            }
        };
        for note in coerced.workarounds {
            self.flag(Category::EnumerationLabelWorkaround, concept, provenance, note);
        }
        let value = coerced.value;

        let unit = if concept.data_type.is_numeric() {
            let resolver = UnitResolver::new(self.taxonomy, self.profile, self.metadata.currency.as_deref());
            match resolver.resolve(concept, raw.unit.as_deref(), provenance, &mut self.diagnostics) {
                Some((unit, source)) => {
                    tracing::trace!(concept = %concept.name, unit = %unit, %source, "Resolved unit");
                    Some(unit)
                }
                None => {
                    self.flag(
                        Category::UnresolvedUnit,
                        concept,
                        provenance,
                        format!("no unit could be determined for {}", concept.name),
                    );
                    return Resolution::Dropped;
                }
            }
        } else {
            None
        };

        let Some(period) = self.period(concept, raw) else {
            return Resolution::Dropped;
        };
        let Some(dimensions) = self.dimensions(concept, raw, scope) else {
            return Resolution::Dropped;
        };

        let context = self.contexts.intern(Context {
            entity: self.entity.clone(),
            period,
            dimensions,
        });
        let unit = unit.map(|u| self.units.intern(u));
        let decimals = if unit.is_some() { infer_decimals(&value, self.profile) } else { None };

        let fact = Fact {
            concept: concept.name.clone(),
            value,
            context,
            unit,
            decimals,
            provenance: raw.provenance.clone(),
        };
        let value_text = fact.value.to_string();
        match self.facts.insert(fact) {
            FactInsert::Added => {
                tracing::debug!(concept = %concept.name, %context, value = %value_text, "Resolved fact");
                Resolution::Added
            }
            FactInsert::Duplicate => {
                tracing::debug!(concept = %concept.name, %context, "Duplicate fact ignored");
                Resolution::Duplicate
            }
            FactInsert::Conflict { existing } => {
                let origin = existing
                    .provenance
                    .as_ref()
                    .map_or_else(String::new, |p| format!(" from {p}"));
                self.flag(
                    Category::ConflictingFact,
                    concept,
                    provenance,
                    format!(
                        "{} in context {context} is {value_text}, but {}{origin} was already reported",
                        concept.name, existing.value
                    ),
                );
                Resolution::Dropped
            }
        }
    }

    fn flag(&mut self, category: Category, concept: &Concept, provenance: Option<&Provenance>, message: String) {
        self.diagnostics.push(
            Diagnostic::new(category, message)
                .with_provenance(provenance.cloned())
                .with_concept(&concept.name),
        );
    }

    /// Local part of a name carrying the taxonomy prefix
    fn local<'s>(&self, name: &'s str) -> &'s str {
        let name = name.trim();
        name.strip_prefix(self.taxonomy.prefix())
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(name)
    }

    fn period(&mut self, concept: &Concept, raw: &RawValue) -> Option<String> {
        let metadata = self.metadata;
        let periods = &metadata.periods;
        let Some(name) = raw.period.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
            return Some(PeriodRegistry::default_for(concept.period_type).to_string());
        };
        let provenance = raw.provenance.as_ref();
        match periods.get(name) {
            None => {
                self.flag(
                    Category::UnknownNamedPeriod,
                    concept,
                    provenance,
                    format!("period '{name}' is not defined"),
                );
                None
            }
            Some(span) if span.period_type() != concept.period_type => {
                self.flag(
                    Category::PeriodTypeMismatch,
                    concept,
                    provenance,
                    format!(
                        "period '{name}' is {} but {} needs {}",
                        span.period_type(),
                        concept.name,
                        concept.period_type
                    ),
                );
                None
            }
            Some(_) => Some(name.to_string()),
        }
    }

    fn dimensions(
        &mut self,
        concept: &Concept,
        raw: &RawValue,
        scope: &BTreeMap<String, String>,
    ) -> Option<BTreeMap<String, String>> {
        let provenance = raw.provenance.as_ref();
        let mut requested = self.profile.concept_dimensions.get(&concept.name).cloned().unwrap_or_default();
        requested.extend(scope.iter().map(|(a, m)| (a.clone(), m.clone())));
        requested.extend(raw.dimensions.iter().map(|(a, m)| (a.clone(), m.clone())));

        let mut resolved = BTreeMap::new();
        for (axis, member) in &requested {
            let axis = self.local(axis).to_string();
            let member = self.local(member).to_string();
            match concept.axis(&axis) {
                Some(constraint) if constraint.allows(&member) => {
                    if constraint.default_member.as_deref() != Some(member.as_str()) {
                        resolved.insert(axis, member);
                    }
                }
                constraint => {
                    let message = match constraint {
                        None => format!("{} does not take axis '{axis}'", concept.name),
                        Some(_) => format!("'{member}' is not a member of axis '{axis}' for {}", concept.name),
                    };
                    self.flag(Category::InvalidDimensionMember, concept, provenance, message);
                    if self.profile.invalid_member_policy == InvalidMemberPolicy::DropValue {
                        return None;
                    }
                }
            }
        }

        if let Some(axis) = concept
            .dimensions
            .iter()
            .find(|(axis, c)| c.default_member.is_none() && !resolved.contains_key(*axis))
            .map(|(axis, _)| axis.clone())
        {
            self.flag(
                Category::MissingDimension,
                concept,
                provenance,
                format!("{} needs a member on axis '{axis}', which has no default", concept.name),
            );
            return None;
        }
        Some(resolved)
    }

    /// Number of facts so far
    #[inline]
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Finish the pass
    #[must_use]
    pub fn finish(self) -> EngineOutput {
        let unused = self.seen.difference(&self.productive).cloned().collect();
        EngineOutput {
            contexts: self.contexts,
            units: self.units,
            facts: self.facts,
            diagnostics: self.diagnostics,
            unused,
        }
    }
}
