//! Structured-data adapter (JSON / YAML)
//!
//! Accepts either a document with `metadata`, `namedRanges` and `tables`
//! sections, or a bare mapping of names to values. Within the values:
//!
//! - a scalar or list is the value itself
//! - an object with `value` and only `unit`, `dimensions` or `period`
//!   besides it is a carrier object for one value with overrides
//! - any other object is a group whose keys are names in their own right

use crate::error::AdapterError;
use crate::raw::{parse_dimension_text, scalar_text, AdaptedInput, RawMetadata, RawRow, RawTable, RawValue};
use crate::InputAdapter;
use mireport_model::{Category, Diagnostic, Diagnostics, Provenance};
use serde_json::{Map, Value};

const CARRIER_KEYS: [&str; 4] = ["value", "unit", "dimensions", "period"];
const SECTION_KEYS: [&str; 3] = ["metadata", "namedRanges", "tables"];

/// Adapter over a parsed JSON or YAML value
#[derive(Debug, Clone)]
pub struct StructuredAdapter {
    document: Value,
}

impl StructuredAdapter {
    /// Create adapter over an already-parsed value
    #[inline]
    #[must_use]
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// Parse JSON text
    ///
    /// # Errors
    /// Returns error if the text is not JSON
    pub fn from_json(text: &str) -> Result<Self, AdapterError> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    /// Parse YAML text
    ///
    /// # Errors
    /// Returns error if the text is not YAML
    pub fn from_yaml(text: &str) -> Result<Self, AdapterError> {
        Ok(Self::new(serde_yaml::from_str(text)?))
    }

    /// Whether a mapping is a sectioned document rather than bare values
    ///
    /// A `metadata` key or a `namedRanges` mapping makes it a document. Any
    /// other top-level keys of a document are still read as values.
    #[must_use]
    pub fn is_document(map: &Map<String, Value>) -> bool {
        map.contains_key("metadata") || map.get("namedRanges").is_some_and(Value::is_object)
    }

    fn is_carrier(map: &Map<String, Value>) -> bool {
        map.contains_key("value") && map.keys().all(|k| CARRIER_KEYS.contains(&k.as_str()))
    }

    fn carrier(name: &str, map: &Map<String, Value>, path: String, diagnostics: &mut Diagnostics) -> RawValue {
        let provenance = Provenance::Key { path };
        let mut raw = RawValue::new(name, map.get("value").cloned().unwrap_or(Value::Null))
            .with_provenance(provenance.clone());
        raw.unit = map.get("unit").and_then(scalar_text);
        raw.period = map.get("period").and_then(scalar_text);
        match map.get("dimensions") {
            Some(Value::Object(dims)) => {
                for (axis, member) in dims {
                    match scalar_text(member) {
                        Some(member) => {
                            raw.dimensions.insert(axis.clone(), member);
                        }
                        None => diagnostics.push(
                            Diagnostic::new(
                                Category::InvalidDimensionMember,
                                format!("member of axis '{axis}' is not a scalar"),
                            )
                            .with_provenance(Some(provenance.clone()))
                            .with_concept(name),
                        ),
                    }
                }
            }
            Some(Value::String(text)) => {
                let (pairs, rejected) = parse_dimension_text(text);
                raw.dimensions = pairs;
                for fragment in rejected {
                    diagnostics.push(
                        Diagnostic::new(
                            Category::InvalidDimensionMember,
                            format!("'{fragment}' is not an Axis=Member pair"),
                        )
                        .with_provenance(Some(provenance.clone()))
                        .with_concept(name),
                    );
                }
            }
            _ => {}
        }
        raw
    }

    /// Flatten a mapping into raw values
    fn collect(map: &Map<String, Value>, prefix: &str, out: &mut Vec<RawValue>, diagnostics: &mut Diagnostics) {
        for (name, value) in map {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match value {
                Value::Object(inner) if Self::is_carrier(inner) => {
                    out.push(Self::carrier(name, inner, path, diagnostics));
                }
                Value::Object(inner) => Self::collect(inner, &path, out, diagnostics),
                _ => out.push(RawValue::new(name, value.clone()).with_provenance(Provenance::Key { path })),
            }
        }
    }

    fn table(name: &str, value: &Value) -> RawTable {
        let mut table = RawTable::new(name);
        let rows = match value {
            Value::Array(rows) => rows.as_slice(),
            Value::Object(layout) => {
                table.axis = layout.get("axis").and_then(scalar_text);
                if let Some(Value::Array(columns)) = layout.get("dimensionColumns") {
                    table.dimension_columns = columns.iter().filter_map(scalar_text).collect();
                }
                layout.get("rows").and_then(Value::as_array).map_or(&[][..], Vec::as_slice)
            }
            _ => &[][..],
        };
        for (index, row) in rows.iter().enumerate() {
            table.rows.push(match row {
                Value::Object(cells) => RawRow::Record {
                    cells: cells.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                },
                other => RawRow::Malformed {
                    reason: format!("row {} is not a record: {other}", index + 1),
                },
            });
        }
        table
    }
}

impl InputAdapter for StructuredAdapter {
    fn kind(&self) -> &'static str {
        "structured"
    }

    fn adapt(&self) -> Result<AdaptedInput, AdapterError> {
        let Value::Object(root) = &self.document else {
            return Err(AdapterError::UnsupportedShape(
                "structured input must be a mapping".to_string(),
            ));
        };

        let mut input = AdaptedInput::default();
        if Self::is_document(root) {
            if let Some(metadata) = root.get("metadata") {
                input.metadata = serde_json::from_value::<RawMetadata>(metadata.clone())
                    .map_err(|e| AdapterError::InvalidMetadata(e.to_string()))?;
            }
            if let Some(Value::Object(named)) = root.get("namedRanges") {
                Self::collect(named, "namedRanges", &mut input.values, &mut input.diagnostics);
            }
            if let Some(Value::Object(tables)) = root.get("tables") {
                input.tables = tables.iter().map(|(name, t)| Self::table(name, t)).collect();
            }
            let loose: Map<String, Value> = root
                .iter()
                .filter(|(key, _)| !SECTION_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            Self::collect(&loose, "", &mut input.values, &mut input.diagnostics);
        } else {
            Self::collect(root, "", &mut input.values, &mut input.diagnostics);
        }

        tracing::debug!(
            values = input.values.len(),
            tables = input.tables.len(),
            "Adapted structured input"
        );
        Ok(input)
    }
}
