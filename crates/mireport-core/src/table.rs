//! Table flattener
//!
//! Expands repeating-row tables into per-row contexts and feeds every cell
//! through the resolution engine.
//!
//! Row keys: if the table has dimension columns (declared by the input, or
//! headed by a taxonomy axis) their cells are the row's members. Otherwise
//! the 1-based row number is the member on the table's axis, taken from the
//! input or the profile.

use crate::engine::Engine;
use indexmap::IndexSet;
use mireport_adapters::{raw::scalar_text, RawRow, RawTable, RawValue};
use mireport_model::{Category, Diagnostic, Provenance};
use mireport_taxonomy::Concept;
use std::collections::BTreeMap;

/// How rows of one table are keyed
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowKey {
    /// Members come from these columns
    Columns(Vec<String>),
    /// Row number on this axis
    Position(String),
}

fn cell(table: &str, row: usize, column: &str) -> Provenance {
    Provenance::TableCell {
        table: table.to_string(),
        row,
        column: column.to_string(),
    }
}

/// Flatten all tables, in name order
pub fn flatten(engine: &mut Engine<'_>, tables: &[RawTable]) {
    let mut ordered: Vec<&RawTable> = tables.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));
    for table in ordered {
        flatten_table(engine, table);
    }
}

/// Flatten one table
pub fn flatten_table(engine: &mut Engine<'_>, table: &RawTable) {
    let taxonomy = engine.taxonomy();
    let columns: IndexSet<&str> = table
        .rows
        .iter()
        .filter_map(|row| match row {
            RawRow::Record { cells } => Some(cells.keys().map(String::as_str)),
            RawRow::Malformed { .. } => None,
        })
        .flatten()
        .collect();

    let dimension_columns: Vec<String> = columns
        .iter()
        .filter(|c| table.dimension_columns.contains(**c) || taxonomy.is_axis(c))
        .map(|c| (*c).to_string())
        .collect();

    let key = if dimension_columns.is_empty() {
        let axis = table
            .axis
            .clone()
            .or_else(|| engine.profile().table_axes.get(&table.name).cloned());
        let Some(axis) = axis else {
            engine.report(Diagnostic::new(
                Category::UnknownTableAxis,
                format!("table '{}' has no dimension column and no row axis; skipped", table.name),
            ));
            return;
        };
        RowKey::Position(axis)
    } else {
        RowKey::Columns(dimension_columns)
    };

    engine.report(Diagnostic::new(
        Category::Summary,
        match &key {
            RowKey::Columns(c) => format!("table '{}': rows keyed by dimension column(s) {}", table.name, c.join(", ")),
            RowKey::Position(axis) => format!("table '{}': rows keyed by row number on axis '{axis}'", table.name),
        },
    ));

    // one lookup (and at most one unmapped warning) per column
    let concepts: Vec<(&str, &Concept)> = columns
        .iter()
        .filter(|c| !matches!(&key, RowKey::Columns(dims) if dims.iter().any(|d| d == **c)))
        .filter_map(|c| {
            engine
                .concept_for(c, Some(&cell(&table.name, 1, c)))
                .map(|concept| (*c, concept))
        })
        .collect();

    for (index, row) in table.rows.iter().enumerate() {
        let number = index + 1;
        let cells = match row {
            RawRow::Record { cells } => cells,
            RawRow::Malformed { reason } => {
                engine.report(
                    Diagnostic::new(Category::MalformedRow, format!("table '{}' row {number}: {reason}", table.name))
                        .with_provenance(Some(cell(&table.name, number, ""))),
                );
                continue;
            }
        };

        let scope = match &key {
            RowKey::Position(axis) => BTreeMap::from([(axis.clone(), number.to_string())]),
            RowKey::Columns(dims) => {
                let members: Option<BTreeMap<String, String>> = dims
                    .iter()
                    .map(|d| cells.get(d).and_then(scalar_text).map(|m| (d.clone(), m)))
                    .collect();
                let Some(members) = members else {
                    engine.report(
                        Diagnostic::new(
                            Category::MalformedRow,
                            format!(
                                "table '{}' row {number}: missing member in dimension column(s) {}",
                                table.name,
                                dims.join(", ")
                            ),
                        )
                        .with_provenance(Some(cell(&table.name, number, ""))),
                    );
                    continue;
                };
                members
            }
        };

        for (column, concept) in &concepts {
            let Some(value) = cells.get(*column) else { continue };
            let raw = RawValue::new(*column, value.clone()).with_provenance(cell(&table.name, number, column));
            engine.resolve_as(concept, &raw, &scope);
        }
    }
}
