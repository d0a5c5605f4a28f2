//! Testing utilities for the mireport workspace
//!
//! Shared fixtures: a small sustainability taxonomy, a matching profile and
//! complete report metadata.

#![allow(missing_docs)]

use mireport_adapters::{AdaptedInput, RawMetadata, RawTable, RawValue};
use mireport_core::{Converter, Profile};
use mireport_taxonomy::{AxisConstraint, Concept, DataType, PeriodType, Taxonomy, TaxonomySnapshot, UnitDefinition};
use serde_json::{json, Value};
use std::sync::Arc;

pub const ENTRY_POINT: &str = "https://xbrl.efrag.org/taxonomy/vsme/2024-12-17/vsme-all.xsd";
pub const LEI: &str = "5493001KJTIIGC8Y1R12";
pub const LEI_SCHEME: &str = "http://standards.iso.org/iso/17442";
pub const WORKFORCE_AXIS: &str = "WorkforceRowAxis";

fn concepts() -> Vec<Concept> {
    vec![
        Concept::new("NumberOfEmployees", DataType::Integer, PeriodType::Instant)
            .with_unit_type("pure")
            .with_label("Number of employees"),
        Concept::new("EnergyConsumption", DataType::Decimal, PeriodType::Duration)
            .with_unit_type("energy")
            .with_axis("SiteAxis", AxisConstraint::typed().with_default("AllSites")),
        Concept::new("Scope1Emissions", DataType::Decimal, PeriodType::Duration)
            .with_unit_type("ghgEmissions")
            .with_required_unit("tCO2e"),
        Concept::new("EmissionsByScope", DataType::Decimal, PeriodType::Duration)
            .with_unit_type("ghgEmissions")
            .with_required_unit("tCO2e")
            .with_axis("ScopeAxis", AxisConstraint::explicit(["Scope1", "Scope2", "Scope3"])),
        Concept::new("Revenue", DataType::Monetary, PeriodType::Duration),
        Concept::new("Category", DataType::Text, PeriodType::Duration)
            .with_axis(WORKFORCE_AXIS, AxisConstraint::typed()),
        Concept::new("TotalEmployees", DataType::Integer, PeriodType::Duration)
            .with_unit_type("pure")
            .with_axis(WORKFORCE_AXIS, AxisConstraint::typed()),
        Concept::new("SiteArea", DataType::Decimal, PeriodType::Instant)
            .with_axis("SiteAxis", AxisConstraint::typed().with_default("AllSites")),
        Concept::new("ReportingBasis", DataType::Enumeration, PeriodType::Duration)
            .with_enumeration(["BasicModule", "ComprehensiveModule"]),
        Concept::new("SustainabilityPolicies", DataType::EnumerationSet, PeriodType::Duration)
            .with_enumeration(["ClimatePolicy", "PollutionPolicy", "WaterPolicy"]),
        Concept::new("HasTransitionPlan", DataType::Boolean, PeriodType::Duration),
        Concept::new("ReportPublicationDate", DataType::Date, PeriodType::Instant),
        Concept::new("EnvironmentalMetricsAbstract", DataType::Text, PeriodType::Duration).abstract_item(),
        Concept::new("BasicModule", DataType::Text, PeriodType::Duration)
            .abstract_item()
            .with_label("Basic module only"),
        Concept::new("ComprehensiveModule", DataType::Text, PeriodType::Duration)
            .abstract_item()
            .with_label("Basic and comprehensive module"),
    ]
}

/// Snapshot of the fixture taxonomy
pub fn vsme_snapshot() -> TaxonomySnapshot {
    TaxonomySnapshot {
        entry_point: ENTRY_POINT.to_string(),
        prefix: "vsme".to_string(),
        default_language: Some("en".to_string()),
        concepts: concepts().into_iter().map(|c| (c.name.clone(), c)).collect(),
        units: [
            ("MWh", UnitDefinition::new("energy")),
            ("GJ", UnitDefinition::new("energy")),
            ("tCO2e", UnitDefinition::new("ghgEmissions")),
            ("m2", UnitDefinition::new("area").with_alias("sqm")),
        ]
        .into_iter()
        .map(|(id, def)| (id.to_string(), def))
        .collect(),
    }
}

/// Fixture taxonomy
pub fn vsme_taxonomy() -> Taxonomy {
    Taxonomy::from_snapshot(vsme_snapshot()).unwrap()
}

/// Profile matching the fixture taxonomy
pub fn vsme_profile() -> Profile {
    Profile::default()
        .with_default_currency("EUR")
        .with_concept_unit("EnergyConsumption", "MWh")
        .with_table_axis("Workforce", WORKFORCE_AXIS)
}

/// Complete metadata for calendar year 2024
pub fn metadata_json() -> Value {
    json!({
        "entryPoint": ENTRY_POINT,
        "entity": {"name": "ACME Widgets Ltd", "identifier": LEI, "identifierScheme": "LEI"},
        "currency": "EUR",
        "reportingPeriod": {"start": "2024-01-01", "end": "2024-12-31"},
        "title": "Sustainability Report 2024",
        "periods": [{"name": "prev", "year": 2023}]
    })
}

pub fn metadata() -> RawMetadata {
    serde_json::from_value(metadata_json()).unwrap()
}

/// Input with complete metadata
pub fn input(values: Vec<RawValue>) -> AdaptedInput {
    AdaptedInput::from_values(values).with_metadata(metadata())
}

/// Two-row workforce table keyed by position
pub fn workforce_table() -> RawTable {
    RawTable::new("Workforce")
        .with_row([("Category", json!("Permanent")), ("TotalEmployees", json!(120))])
        .with_row([("Category", json!("Temporary")), ("TotalEmployees", json!(30))])
}

pub fn converter() -> Converter {
    converter_with(vsme_profile())
}

pub fn converter_with(profile: Profile) -> Converter {
    Converter::new(Arc::new(vsme_taxonomy()), Arc::new(profile))
}
