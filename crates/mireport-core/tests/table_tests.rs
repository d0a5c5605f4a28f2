//! Table flattening through the converter

use mireport_adapters::{RawRow, RawTable, RawValue};
use mireport_core::Profile;
use mireport_model::{Category, FactValue, Severity};
use mireport_test_utils::{converter, converter_with, input, workforce_table, WORKFORCE_AXIS};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::json;

#[test]
fn two_row_table_yields_one_context_per_row() {
    let conversion = converter().convert(input(vec![]).with_table(workforce_table())).unwrap();
    let report = &conversion.report;

    assert_eq!(report.facts.len(), 4);
    assert_eq!(report.contexts.len(), 2);

    let members: Vec<_> = report
        .contexts
        .values()
        .map(|c| c.dimensions.get(WORKFORCE_AXIS).cloned().unwrap_or_default())
        .collect();
    assert_eq!(members, vec!["1".to_string(), "2".to_string()]);

    for fact in report.facts_for("Category") {
        let total = report
            .facts_for("TotalEmployees")
            .find(|t| t.context == fact.context)
            .unwrap();
        match fact.value.to_string().as_str() {
            "Permanent" => assert_eq!(total.value, FactValue::Number(Decimal::from(120))),
            "Temporary" => assert_eq!(total.value, FactValue::Number(Decimal::from(30))),
            other => panic!("unexpected category {other}"),
        }
    }
}

#[test]
fn row_keying_is_reported() {
    let conversion = converter().convert(input(vec![]).with_table(workforce_table())).unwrap();
    let summary: Vec<_> = conversion
        .diagnostics
        .by_category(Category::Summary)
        .map(|d| d.message.as_str())
        .collect();
    assert!(summary
        .iter()
        .any(|m| m.contains("Workforce") && m.contains("row number") && m.contains(WORKFORCE_AXIS)));
}

#[test]
fn table_cells_carry_provenance() {
    let conversion = converter().convert(input(vec![]).with_table(workforce_table())).unwrap();
    let fact = conversion
        .report
        .facts
        .iter()
        .find(|f| f.value.to_string() == "Temporary")
        .unwrap();
    assert_eq!(fact.provenance.as_ref().unwrap().to_string(), "Workforce[2].Category");
}

#[test]
fn axis_header_keys_rows_by_member() {
    let table = RawTable::new("ScopeBreakdown")
        .with_row([("ScopeAxis", json!("Scope1")), ("EmissionsByScope", json!(100))])
        .with_row([("ScopeAxis", json!("Scope2")), ("EmissionsByScope", json!(40))]);
    let conversion = converter().convert(input(vec![]).with_table(table)).unwrap();
    let report = &conversion.report;

    assert_eq!(report.facts.len(), 2);
    let scopes: Vec<_> = report
        .facts
        .iter()
        .map(|f| report.context_of(f).unwrap().dimensions["ScopeAxis"].clone())
        .collect();
    assert_eq!(scopes, vec!["Scope1".to_string(), "Scope2".to_string()]);
    assert_eq!(report.units.len(), 1);
}

#[test]
fn declared_dimension_column_wins_over_row_axis() {
    let table = RawTable::new("Workforce")
        .with_dimension_column(WORKFORCE_AXIS)
        .with_row([(WORKFORCE_AXIS, json!("Permanent")), ("TotalEmployees", json!(120))]);
    let conversion = converter().convert(input(vec![]).with_table(table)).unwrap();
    let report = &conversion.report;

    let context = report.context_of(&report.facts[0]).unwrap();
    assert_eq!(context.dimensions[WORKFORCE_AXIS], "Permanent");
}

#[test]
fn table_without_axis_is_skipped() {
    let conversion = converter_with(Profile::default())
        .convert(
            input(vec![RawValue::new("Revenue", json!(10))]).with_table(workforce_table()),
        )
        .unwrap();
    let skipped: Vec<_> = conversion.diagnostics.by_category(Category::UnknownTableAxis).collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].severity, Severity::Error);
    assert_eq!(conversion.report.facts.len(), 1);
}

#[test]
fn input_axis_overrides_profile() {
    let table = RawTable::new("Other")
        .with_axis(WORKFORCE_AXIS)
        .with_row([("TotalEmployees", json!(7))]);
    let conversion = converter().convert(input(vec![]).with_table(table)).unwrap();
    let report = &conversion.report;
    assert_eq!(report.facts.len(), 1);
    assert_eq!(report.context_of(&report.facts[0]).unwrap().dimensions[WORKFORCE_AXIS], "1");
}

#[test]
fn malformed_rows_and_bad_cells_do_not_stop_the_table() {
    let mut table = workforce_table();
    table.rows.insert(
        1,
        RawRow::Malformed {
            reason: "row has 3 cells but the header has 2".into(),
        },
    );
    table = table.with_row([("Category", json!("Seasonal")), ("TotalEmployees", json!("lots"))]);

    let conversion = converter().convert(input(vec![]).with_table(table)).unwrap();
    let diagnostics = &conversion.diagnostics;

    assert_eq!(diagnostics.by_category(Category::MalformedRow).count(), 1);
    assert_eq!(diagnostics.by_category(Category::TypeCoercionFailed).count(), 1);
    // rows 1 and 3 complete, row 4 keeps only its category
    assert_eq!(conversion.report.facts.len(), 5);
    assert_eq!(conversion.report.contexts.len(), 3);
}

#[test]
fn unmapped_column_is_warned_once() {
    let table = RawTable::new("Workforce")
        .with_row([("Category", json!("Permanent")), ("ShoeSize", json!(42))])
        .with_row([("Category", json!("Temporary")), ("ShoeSize", json!(41))]);
    let conversion = converter().convert(input(vec![]).with_table(table)).unwrap();
    assert_eq!(conversion.diagnostics.by_category(Category::UnmappedConcept).count(), 1);
    assert_eq!(conversion.report.facts.len(), 2);
}
