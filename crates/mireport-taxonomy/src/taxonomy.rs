//! Taxonomy registry
//!
//! Provides [`Taxonomy`], the immutable concept lookup shared by every
//! conversion, and [`TaxonomySnapshot`], the serialized form produced by the
//! external schema loader.

use crate::concept::{AxisConstraint, Concept};
use crate::error::TaxonomyError;
use crate::units::{UnitDefinition, UnitRegistry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Serialized taxonomy as produced by the schema loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomySnapshot {
    /// Entry point the taxonomy was loaded from
    pub entry_point: String,

    /// Namespace prefix of the concepts (`vsme`)
    #[serde(default)]
    pub prefix: String,

    /// Default label language
    #[serde(default)]
    pub default_language: Option<String>,

    /// Concepts by local name
    #[serde(default)]
    pub concepts: BTreeMap<String, Concept>,

    /// Units by short id
    #[serde(default)]
    pub units: BTreeMap<String, UnitDefinition>,
}

/// Read-only concept metadata registry
///
/// Safe to share between concurrent conversions: nothing is mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    entry_point: String,
    prefix: String,
    default_language: Option<String>,
    concepts: BTreeMap<String, Concept>,
    /// Normalised label -> concept names carrying it
    labels: HashMap<String, Vec<String>>,
    /// Axis name -> concepts using it
    axes: BTreeMap<String, BTreeSet<String>>,
    units: UnitRegistry,
}

impl Taxonomy {
    /// Start building a taxonomy programmatically
    #[inline]
    #[must_use]
    pub fn builder(entry_point: impl Into<String>) -> TaxonomyBuilder {
        TaxonomyBuilder::new(entry_point)
    }

    /// Build from snapshot, checking internal references
    ///
    /// # Errors
    /// Returns error if a concept refers to an unknown unit, an axis default
    /// is not one of its members, or the entry point is empty.
    pub fn from_snapshot(snapshot: TaxonomySnapshot) -> Result<Self, TaxonomyError> {
        if snapshot.entry_point.trim().is_empty() {
            return Err(TaxonomyError::MissingEntryPoint);
        }

        let mut units = UnitRegistry::new();
        for (id, definition) in &snapshot.units {
            units.insert(id, definition);
        }

        let mut concepts = BTreeMap::new();
        for (name, mut concept) in snapshot.concepts {
            concept.name.clone_from(&name);
            Self::check_concept(&concept, &units)?;
            concepts.insert(name, concept);
        }

        let mut labels: HashMap<String, Vec<String>> = HashMap::new();
        let mut axes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for concept in concepts.values() {
            for label in &concept.labels {
                labels
                    .entry(normalise_label(label))
                    .or_default()
                    .push(concept.name.clone());
            }
            for axis in concept.dimensions.keys() {
                axes.entry(axis.clone())
                    .or_default()
                    .insert(concept.name.clone());
            }
        }

        tracing::debug!(
            entry_point = %snapshot.entry_point,
            concepts = concepts.len(),
            units = units.len(),
            "taxonomy loaded"
        );

        Ok(Self {
            entry_point: snapshot.entry_point,
            prefix: snapshot.prefix,
            default_language: snapshot.default_language,
            concepts,
            labels,
            axes,
            units,
        })
    }

    fn check_concept(concept: &Concept, units: &UnitRegistry) -> Result<(), TaxonomyError> {
        for unit in &concept.required_units {
            if units.lookup(unit).is_none() {
                return Err(TaxonomyError::UnknownUnit {
                    concept: concept.name.clone(),
                    unit: unit.clone(),
                });
            }
        }
        for (axis, constraint) in &concept.dimensions {
            if let (Some(default), Some(_)) = (&constraint.default_member, &constraint.members) {
                if !constraint.allows(default) {
                    return Err(TaxonomyError::InvalidAxisDefault {
                        axis: axis.clone(),
                        member: default.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Parse snapshot from JSON
    ///
    /// # Errors
    /// Returns error if JSON is invalid or the snapshot is inconsistent
    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        let snapshot: TaxonomySnapshot = serde_json::from_str(json).map_err(TaxonomyError::InvalidJson)?;
        Self::from_snapshot(snapshot)
    }

    /// Parse snapshot from YAML
    ///
    /// # Errors
    /// Returns error if YAML is invalid or the snapshot is inconsistent
    pub fn from_yaml(yaml: &str) -> Result<Self, TaxonomyError> {
        let snapshot: TaxonomySnapshot = serde_yaml::from_str(yaml).map_err(TaxonomyError::InvalidYaml)?;
        Self::from_snapshot(snapshot)
    }

    /// Look up a concept by local or prefixed name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Concept> {
        let name = name.trim();
        if let Some(concept) = self.concepts.get(name) {
            return Some(concept);
        }
        match name.split_once(':') {
            Some((prefix, local)) if prefix == self.prefix => self.concepts.get(local),
            _ => None,
        }
    }

    /// Look up a concept by one of its labels
    ///
    /// Returns `None` when the label is unknown or shared by several concepts.
    #[must_use]
    pub fn lookup_by_label(&self, label: &str) -> Option<&Concept> {
        match self.labels.get(&normalise_label(label)).map(Vec::as_slice) {
            Some([single]) => self.concepts.get(single),
            _ => None,
        }
    }

    /// Whether `name` is a dimension axis used by any concept
    #[inline]
    #[must_use]
    pub fn is_axis(&self, name: &str) -> bool {
        self.axes.contains_key(name)
    }

    /// Default member of an axis for a concept
    #[must_use]
    pub fn dimension_default<'a>(&self, concept: &'a Concept, axis: &str) -> Option<&'a str> {
        concept
            .axis(axis)
            .and_then(|c: &AxisConstraint| c.default_member.as_deref())
    }

    /// Unit registry and alias table
    #[inline]
    #[must_use]
    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    /// Entry point
    #[inline]
    #[must_use]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Concept namespace prefix
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Default label language
    #[inline]
    #[must_use]
    pub fn default_language(&self) -> Option<&str> {
        self.default_language.as_deref()
    }

    /// Iterate concepts in name order
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    /// Number of concepts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Whether the taxonomy has no concepts
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

/// Collapse whitespace, unify dashes and ignore case
fn normalise_label(label: &str) -> String {
    label
        .replace(['\u{2013}', '\u{2014}'], "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Builder for programmatic taxonomies (tests, fixtures)
#[derive(Debug, Clone)]
pub struct TaxonomyBuilder {
    snapshot: TaxonomySnapshot,
}

impl TaxonomyBuilder {
    /// Create builder
    #[must_use]
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self {
            snapshot: TaxonomySnapshot {
                entry_point: entry_point.into(),
                ..TaxonomySnapshot::default()
            },
        }
    }

    /// With concept prefix
    #[inline]
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.snapshot.prefix = prefix.into();
        self
    }

    /// Add concept
    #[inline]
    #[must_use]
    pub fn concept(mut self, concept: Concept) -> Self {
        self.snapshot.concepts.insert(concept.name.clone(), concept);
        self
    }

    /// Add unit
    #[inline]
    #[must_use]
    pub fn unit(mut self, id: impl Into<String>, definition: UnitDefinition) -> Self {
        self.snapshot.units.insert(id.into(), definition);
        self
    }

    /// Finish
    ///
    /// # Errors
    /// Same as [`Taxonomy::from_snapshot`]
    pub fn build(self) -> Result<Taxonomy, TaxonomyError> {
        Taxonomy::from_snapshot(self.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::{DataType, PeriodType};
    use proptest::prelude::*;

    fn sample() -> Taxonomy {
        Taxonomy::builder("https://example.com/vsme.xsd")
            .prefix("vsme")
            .unit("MWh", UnitDefinition::new("energy"))
            .concept(
                Concept::new("EnergyConsumption", DataType::Decimal, PeriodType::Duration)
                    .with_unit_type("energy")
                    .with_required_unit("MWh")
                    .with_label("Total energy consumption"),
            )
            .concept(
                Concept::new("Scope1Member", DataType::Text, PeriodType::Duration)
                    .abstract_item()
                    .with_label("Scope 1 \u{2013} direct"),
            )
            .concept(
                Concept::new("Emissions", DataType::Decimal, PeriodType::Duration)
                    .with_axis("ScopeAxis", AxisConstraint::explicit(["Scope1Member"]).with_default("Scope1Member")),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn lookup_by_local_and_prefixed_name() {
        let t = sample();
        assert!(t.lookup("EnergyConsumption").is_some());
        assert!(t.lookup("vsme:EnergyConsumption").is_some());
        assert!(t.lookup("other:EnergyConsumption").is_none());
        assert!(t.lookup("Missing").is_none());
    }

    #[test]
    fn lookup_by_label_normalises() {
        let t = sample();
        let c = t.lookup_by_label("  total ENERGY   consumption ").unwrap();
        assert_eq!(c.name, "EnergyConsumption");
        assert_eq!(t.lookup_by_label("Scope 1 - direct").unwrap().name, "Scope1Member");
    }

    #[test]
    fn axes_and_defaults() {
        let t = sample();
        assert!(t.is_axis("ScopeAxis"));
        assert!(!t.is_axis("Emissions"));
        let c = t.lookup("Emissions").unwrap();
        assert_eq!(t.dimension_default(c, "ScopeAxis"), Some("Scope1Member"));
    }

    #[test]
    fn unknown_required_unit_rejected() {
        let result = Taxonomy::builder("ep")
            .concept(Concept::new("X", DataType::Decimal, PeriodType::Instant).with_required_unit("parsec"))
            .build();
        assert!(matches!(result, Err(TaxonomyError::UnknownUnit { .. })));
    }

    #[test]
    fn invalid_axis_default_rejected() {
        let result = Taxonomy::builder("ep")
            .concept(
                Concept::new("X", DataType::Decimal, PeriodType::Instant)
                    .with_axis("A", AxisConstraint::explicit(["M1"]).with_default("M2")),
            )
            .build();
        assert!(matches!(result, Err(TaxonomyError::InvalidAxisDefault { .. })));
    }

    #[test]
    fn empty_entry_point_rejected() {
        assert!(matches!(
            Taxonomy::builder("  ").build(),
            Err(TaxonomyError::MissingEntryPoint)
        ));
    }

    #[test]
    fn from_json_snapshot() {
        let json = r#"{
            "entryPoint": "vsme-all.xsd",
            "prefix": "vsme",
            "units": { "MWh": { "unitType": "energy" } },
            "concepts": {
                "NumberOfEmployees": { "dataType": "integer", "periodType": "duration", "unitType": "pure" }
            }
        }"#;
        let t = Taxonomy::from_json(json).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.lookup("NumberOfEmployees").unwrap().name, "NumberOfEmployees");
        assert!(t.units().lookup("utr:MWh").is_some());
    }

    #[test]
    fn from_yaml_snapshot() {
        let yaml = "entryPoint: vsme-all.xsd\nconcepts:\n  Flag:\n    dataType: boolean\n    periodType: instant\n";
        let t = Taxonomy::from_yaml(yaml).unwrap();
        assert_eq!(t.lookup("Flag").unwrap().data_type, DataType::Boolean);
    }

    proptest! {
        #[test]
        fn prefixed_and_local_names_resolve_alike(name in "[A-Z][A-Za-z0-9]{0,24}", pad in " {0,3}") {
            let t = Taxonomy::builder("vsme-all.xsd")
                .prefix("vsme")
                .concept(Concept::new(name.clone(), DataType::Decimal, PeriodType::Duration))
                .build()
                .unwrap();

            let local = t.lookup(&format!("{pad}{name}{pad}")).map(|c| c.name.clone());
            let prefixed = t.lookup(&format!("vsme:{name}")).map(|c| c.name.clone());
            prop_assert_eq!(local.as_deref(), Some(name.as_str()));
            prop_assert_eq!(prefixed, local);
            let foreign = format!("esrs:{name}");
            prop_assert!(t.lookup(&foreign).is_none());
        }
    }
}
