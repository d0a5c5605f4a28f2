//! Spreadsheet adapter
//!
//! Works on a [`Workbook`] of named ranges already extracted from the
//! spreadsheet binary. Range naming conventions:
//!
//! - `<concept>`: a value (single cell, or a list of cells for sets)
//! - `<concept>_unit`, `<concept>_dimension`, `<concept>_period`: overrides
//!   merged into the `<concept>` value
//! - `<table>_table`: header row followed by record rows
//! - `template_*`: report metadata
//! - `enum_*`: enumeration helper lists, ignored

use crate::error::AdapterError;
use crate::raw::{parse_dimension_text, scalar_text, AdaptedInput, RawMetadata, RawRow, RawTable, RawValue};
use crate::InputAdapter;
use indexmap::IndexMap;
use mireport_model::{Category, Diagnostic, Diagnostics, Provenance};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const UNIT_SUFFIX: &str = "_unit";
const DIMENSION_SUFFIX: &str = "_dimension";
const PERIOD_SUFFIX: &str = "_period";
const TABLE_SUFFIX: &str = "_table";
const TEMPLATE_PREFIX: &str = "template_";
const ENUM_PREFIX: &str = "enum_";

/// A named cell range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRange {
    /// Defined name
    pub name: String,
    /// Sheet holding the range
    pub sheet: String,
    /// 1-based row of the top-left cell
    pub row: u32,
    /// 1-based column of the top-left cell
    pub column: u32,
    /// Cell values, row-major
    pub cells: Vec<Vec<Value>>,
}

impl NamedRange {
    /// Single-cell range
    #[must_use]
    pub fn cell(name: impl Into<String>, sheet: impl Into<String>, row: u32, column: u32, value: Value) -> Self {
        Self {
            name: name.into(),
            sheet: sheet.into(),
            row,
            column,
            cells: vec![vec![value]],
        }
    }

    fn provenance(&self) -> Provenance {
        Provenance::Cell {
            range: self.name.clone(),
            sheet: self.sheet.clone(),
            row: self.row,
            column: self.column,
        }
    }

    /// Non-empty cells in row-major order
    fn filled(&self) -> Vec<&Value> {
        self.cells
            .iter()
            .flatten()
            .filter(|v| !matches!(v, Value::Null) && v.as_str().map_or(true, |s| !s.trim().is_empty()))
            .collect()
    }

    /// Value of a range: the first cell when it has one cell, else the
    /// filled cells as a list
    fn value(&self) -> Value {
        let filled = self.filled();
        match (self.cells.len(), self.cells.first().map(Vec::len)) {
            (1, Some(1)) => self.cells[0][0].clone(),
            _ if filled.len() <= 1 => filled.first().map_or(Value::Null, |v| (*v).clone()),
            _ => Value::Array(filled.into_iter().cloned().collect()),
        }
    }

    fn text(&self) -> Option<String> {
        self.filled().first().and_then(|v| scalar_text(v))
    }
}

/// Named ranges extracted from one spreadsheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    /// All defined names
    pub named_ranges: Vec<NamedRange>,
}

impl Workbook {
    /// Empty workbook
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a named range
    #[inline]
    #[must_use]
    pub fn with_range(mut self, range: NamedRange) -> Self {
        self.named_ranges.push(range);
        self
    }
}

/// Adapter over a [`Workbook`]
#[derive(Debug, Clone)]
pub struct SpreadsheetAdapter {
    workbook: Workbook,
}

impl SpreadsheetAdapter {
    /// Create adapter
    #[inline]
    #[must_use]
    pub fn new(workbook: Workbook) -> Self {
        Self { workbook }
    }

    fn table(range: &NamedRange, name: &str) -> Result<RawTable, AdapterError> {
        let mut rows = range.cells.iter();
        let header: Vec<Option<String>> = rows
            .next()
            .ok_or_else(|| AdapterError::invalid_range(&range.name, "table has no header row"))?
            .iter()
            .map(scalar_text)
            .collect();
        if header.iter().all(Option::is_none) {
            return Err(AdapterError::invalid_range(&range.name, "table header is empty"));
        }

        let mut table = RawTable::new(name);
        for cells in rows {
            if cells.iter().all(|c| scalar_text(c).is_none()) {
                continue;
            }
            if cells.len() > header.len() {
                table.rows.push(RawRow::Malformed {
                    reason: format!("row has {} cells but the header has {}", cells.len(), header.len()),
                });
                continue;
            }
            let record: IndexMap<String, Value> = header
                .iter()
                .zip(cells)
                .filter_map(|(column, cell)| column.as_ref().map(|c| (c.clone(), cell.clone())))
                .collect();
            table.rows.push(RawRow::Record { cells: record });
        }
        Ok(table)
    }

    fn template(metadata: &mut RawMetadata, key: &str, range: &NamedRange) {
        let text = range.text();
        let value = range.filled().first().map(|v| (*v).clone());
        match key {
            "reporting_schema" | "entry_point" => metadata.entry_point = text,
            "reporting_entity_name" => metadata.entity.name = text,
            "reporting_entity_identifier" => metadata.entity.identifier = text,
            "reporting_entity_identifier_scheme" | "reporting_entity_scheme" => {
                metadata.entity.identifier_scheme = text;
            }
            "reporting_period_startdate" | "reporting_period_start_date" => metadata.reporting_period.start = value,
            "reporting_period_enddate" | "reporting_period_end_date" => metadata.reporting_period.end = value,
            "reporting_currency" | "currency" => metadata.currency = text,
            "report_title" | "title" => metadata.title = text,
            "report_subtitle" | "subtitle" => metadata.subtitle = text,
            "output_language" | "language" => metadata.output_language = text,
            other => tracing::debug!(name = %other, "Ignoring unknown template range"),
        }
    }
}

impl InputAdapter for SpreadsheetAdapter {
    fn kind(&self) -> &'static str {
        "spreadsheet"
    }

    fn adapt(&self) -> Result<AdaptedInput, AdapterError> {
        let mut metadata = RawMetadata::default();
        // same-named ranges are all kept; the engine dedups or flags them
        let mut values: BTreeMap<String, Vec<RawValue>> = BTreeMap::new();
        let mut companions: Vec<&NamedRange> = Vec::new();
        let mut tables = Vec::new();
        let mut diagnostics = Diagnostics::new();

        for range in &self.workbook.named_ranges {
            let name = range.name.trim();
            if name.starts_with(ENUM_PREFIX) {
                continue;
            }
            if let Some(key) = name.strip_prefix(TEMPLATE_PREFIX) {
                Self::template(&mut metadata, key, range);
            } else if let Some(table) = name.strip_suffix(TABLE_SUFFIX) {
                match Self::table(range, table) {
                    Ok(table) => tables.push(table),
                    Err(e) => diagnostics.push(
                        Diagnostic::new(Category::MalformedRow, e.to_string()).with_provenance(Some(range.provenance())),
                    ),
                }
            } else if [UNIT_SUFFIX, DIMENSION_SUFFIX, PERIOD_SUFFIX].iter().any(|s| name.ends_with(s)) {
                companions.push(range);
            } else {
                let raw = RawValue::new(name, range.value()).with_provenance(range.provenance());
                let same_name = values.entry(name.to_string()).or_default();
                if let Some(first) = same_name.first() {
                    tracing::debug!(
                        name = %name,
                        first = ?first.provenance,
                        again = %range.provenance(),
                        "Named range defined more than once"
                    );
                }
                same_name.push(raw);
            }
        }

        for range in companions {
            let name = range.name.trim();
            let (target, suffix) = [UNIT_SUFFIX, DIMENSION_SUFFIX, PERIOD_SUFFIX]
                .iter()
                .find_map(|s| name.strip_suffix(s).map(|t| (t, *s)))
                .unwrap_or((name, ""));
            let Some(targets) = values.get_mut(target) else {
                diagnostics.push(
                    Diagnostic::new(
                        Category::OrphanCompanion,
                        format!("'{name}' has no matching value range '{target}'"),
                    )
                    .with_provenance(Some(range.provenance())),
                );
                continue;
            };
            let Some(text) = range.text() else { continue };
            match suffix {
                UNIT_SUFFIX => targets.iter_mut().for_each(|raw| raw.unit = Some(text.clone())),
                PERIOD_SUFFIX => targets.iter_mut().for_each(|raw| raw.period = Some(text.clone())),
                _ => {
                    let (pairs, rejected) = parse_dimension_text(&text);
                    for fragment in rejected {
                        diagnostics.push(
                            Diagnostic::new(
                                Category::InvalidDimensionMember,
                                format!("'{fragment}' in '{name}' is not an Axis=Member pair"),
                            )
                            .with_provenance(Some(range.provenance()))
                            .with_concept(target),
                        );
                    }
                    for raw in targets.iter_mut() {
                        raw.dimensions.extend(pairs.clone());
                    }
                }
            }
        }

        tracing::debug!(
            values = values.len(),
            tables = tables.len(),
            "Adapted workbook"
        );

        Ok(AdaptedInput {
            metadata,
            values: values.into_values().flatten().collect(),
            tables,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn workbook() -> Workbook {
        Workbook::new()
            .with_range(NamedRange::cell("template_reporting_entity_identifier", "Intro", 2, 2, json!("5493001KJTIIGC8Y1R12")))
            .with_range(NamedRange::cell("template_reporting_period_startdate", "Intro", 3, 2, json!("2024-01-01")))
            .with_range(NamedRange::cell("EnergyConsumption", "Env", 5, 3, json!(1200)))
            .with_range(NamedRange::cell("EnergyConsumption_unit", "Env", 5, 4, json!("MWh")))
            .with_range(NamedRange::cell("EnergyConsumption_dimension", "Env", 5, 5, json!("SiteAxis=Berlin")))
            .with_range(NamedRange::cell("Missing_unit", "Env", 9, 4, json!("GJ")))
            .with_range(NamedRange::cell("enum_Scopes", "Lists", 1, 1, json!("Scope1")))
    }

    #[test]
    fn companions_merge_into_target() {
        let input = SpreadsheetAdapter::new(workbook()).adapt().unwrap();
        assert_eq!(input.values.len(), 1);
        let energy = &input.values[0];
        assert_eq!(energy.name, "EnergyConsumption");
        assert_eq!(energy.payload, json!(1200));
        assert_eq!(energy.unit.as_deref(), Some("MWh"));
        assert_eq!(energy.dimensions.get("SiteAxis").map(String::as_str), Some("Berlin"));
        assert_eq!(
            energy.provenance.as_ref().map(ToString::to_string).as_deref(),
            Some("Env!R5C3 (EnergyConsumption)")
        );
    }

    #[test]
    fn orphan_companion_is_warned() {
        let input = SpreadsheetAdapter::new(workbook()).adapt().unwrap();
        let orphans: Vec<_> = input.diagnostics.by_category(Category::OrphanCompanion).collect();
        assert_eq!(orphans.len(), 1);
        assert!(orphans[0].message.contains("Missing_unit"));
    }

    #[test]
    fn template_ranges_become_metadata() {
        let input = SpreadsheetAdapter::new(workbook()).adapt().unwrap();
        assert_eq!(input.metadata.entity.identifier.as_deref(), Some("5493001KJTIIGC8Y1R12"));
        assert_eq!(input.metadata.reporting_period.start, Some(json!("2024-01-01")));
    }

    #[test]
    fn table_range_reads_header_and_rows() {
        let range = NamedRange {
            name: "Workforce_table".into(),
            sheet: "Social".into(),
            row: 10,
            column: 1,
            cells: vec![
                vec![json!("Category"), json!("TotalEmployees")],
                vec![json!("Permanent"), json!(120)],
                vec![json!(null), json!("")],
                vec![json!("Temporary"), json!(30), json!("extra")],
            ],
        };
        let input = SpreadsheetAdapter::new(Workbook::new().with_range(range)).adapt().unwrap();
        let table = &input.tables[0];
        assert_eq!(table.name, "Workforce");
        assert_eq!(table.rows.len(), 2);
        assert!(matches!(&table.rows[0], RawRow::Record { cells } if cells["TotalEmployees"] == json!(120)));
        assert!(matches!(table.rows[1], RawRow::Malformed { .. }));
    }

    #[test]
    fn repeated_range_names_keep_every_value() {
        let workbook = Workbook::new()
            .with_range(NamedRange::cell("Revenue", "Finance", 3, 2, json!(1000)))
            .with_range(NamedRange::cell(" Revenue ", "Summary", 7, 2, json!(2000)))
            .with_range(NamedRange::cell("Revenue_unit", "Finance", 3, 3, json!("EUR")));
        let input = SpreadsheetAdapter::new(workbook).adapt().unwrap();

        assert_eq!(input.values.len(), 2);
        let payloads: Vec<_> = input.values.iter().map(|v| v.payload.clone()).collect();
        assert_eq!(payloads, vec![json!(1000), json!(2000)]);
        assert!(input.values.iter().all(|v| v.name == "Revenue" && v.unit.as_deref() == Some("EUR")));
        let sheets: Vec<_> = input
            .values
            .iter()
            .map(|v| v.provenance.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect();
        assert_eq!(sheets, vec!["Finance!R3C2 (Revenue)".to_string(), "Summary!R7C2 ( Revenue )".to_string()]);
    }

    #[test]
    fn multi_cell_range_is_a_list() {
        let range = NamedRange {
            name: "ReportingBasis".into(),
            sheet: "General".into(),
            row: 1,
            column: 1,
            cells: vec![vec![json!("Basic"), json!(null)], vec![json!("Comprehensive"), json!("")]],
        };
        let input = SpreadsheetAdapter::new(Workbook::new().with_range(range)).adapt().unwrap();
        assert_eq!(input.values[0].payload, json!(["Basic", "Comprehensive"]));
    }
}
