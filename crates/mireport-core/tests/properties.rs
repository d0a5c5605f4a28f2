//! Property tests: conversion output does not depend on input order

use mireport_adapters::RawValue;
use mireport_test_utils::{converter, input, workforce_table};
use proptest::prelude::*;
use serde_json::json;

fn values() -> Vec<RawValue> {
    vec![
        RawValue::new("NumberOfEmployees", json!(250)),
        RawValue::new("EnergyConsumption", json!(5400)),
        RawValue::new("EnergyConsumption", json!(300)).with_unit("GJ").with_period("prev"),
        RawValue::new("Scope1Emissions", json!("120.5")).with_unit("tCO2e"),
        RawValue::new("EmissionsByScope", json!(45)).with_dimension("ScopeAxis", "Scope2"),
        RawValue::new("EmissionsByScope", json!(12)),
        RawValue::new("Revenue", json!(1000)),
        RawValue::new("Revenue", json!(2000)),
        RawValue::new("HasTransitionPlan", json!("no")),
        RawValue::new("FavouriteColour", json!("blue")),
        RawValue::new("SiteArea", json!("n/a")),
    ]
}

fn render(values: Vec<RawValue>) -> serde_json::Value {
    let conversion = converter()
        .convert(input(values).with_table(workforce_table()))
        .unwrap();
    serde_json::to_value(&conversion).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn shuffled_input_gives_identical_output(shuffled in Just(values()).prop_shuffle()) {
        prop_assert_eq!(render(shuffled), render(values()));
    }

    #[test]
    fn repeated_values_change_nothing(extra in 0usize..11) {
        let mut doubled = values();
        doubled.push(values()[extra].clone());
        let baseline = render(values());
        let doubled = render(doubled);
        prop_assert_eq!(&doubled["report"], &baseline["report"]);
    }
}
