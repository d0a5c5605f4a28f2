//! Raw, untyped input items shared by all adapters

use indexmap::IndexMap;
use mireport_model::{Diagnostics, Provenance};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// One named input value before resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawValue {
    /// Named-range or key name (concept name, local or prefixed)
    pub name: String,
    /// Untyped payload
    pub payload: Value,
    /// Explicit unit text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Explicit axis -> member pairs
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimensions: BTreeMap<String, String>,
    /// Explicit named-period reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// Source location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl RawValue {
    /// Plain value without overrides
    #[must_use]
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
            unit: None,
            dimensions: BTreeMap::new(),
            period: None,
            provenance: None,
        }
    }

    /// With explicit unit
    #[inline]
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// With an explicit dimension member
    #[inline]
    #[must_use]
    pub fn with_dimension(mut self, axis: impl Into<String>, member: impl Into<String>) -> Self {
        self.dimensions.insert(axis.into(), member.into());
        self
    }

    /// With explicit period name
    #[inline]
    #[must_use]
    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    /// With provenance
    #[inline]
    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }
}

/// One row of a raw table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RawRow {
    /// Column header -> cell value
    Record {
        /// Cells keyed by column header
        cells: IndexMap<String, Value>,
    },
    /// Row that could not be read as a record
    Malformed {
        /// Why the row was rejected
        reason: String,
    },
}

/// Repeating-row input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTable {
    /// Table name
    pub name: String,
    /// Dimension axis carrying the row member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<String>,
    /// Columns that hold dimension members rather than facts
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dimension_columns: BTreeSet<String>,
    /// Rows in input order
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Empty table
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With the row axis
    #[inline]
    #[must_use]
    pub fn with_axis(mut self, axis: impl Into<String>) -> Self {
        self.axis = Some(axis.into());
        self
    }

    /// With a declared dimension column
    #[inline]
    #[must_use]
    pub fn with_dimension_column(mut self, column: impl Into<String>) -> Self {
        self.dimension_columns.insert(column.into());
        self
    }

    /// With a record row
    #[must_use]
    pub fn with_row<I, K>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.rows.push(RawRow::Record {
            cells: cells.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        });
        self
    }
}

/// Entity section of the report metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEntity {
    /// Display name
    pub name: Option<String>,
    /// Identifier value
    pub identifier: Option<String>,
    /// Scheme URI or alias (`lei`, `duns`, ...)
    pub identifier_scheme: Option<String>,
}

/// Principal reporting period bounds
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawReportingPeriod {
    /// First day (date text or serial number)
    pub start: Option<Value>,
    /// Last day (date text or serial number)
    pub end: Option<Value>,
}

/// Additional named period declared in metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPeriod {
    /// Registration name
    pub name: String,
    /// Duration start
    pub start: Option<Value>,
    /// Duration end
    pub end: Option<Value>,
    /// Instant date
    pub instant: Option<Value>,
    /// Principal period shifted to this year
    pub year: Option<i32>,
}

/// Report-level metadata as given by the input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMetadata {
    /// Taxonomy entry point
    pub entry_point: Option<String>,
    /// Reporting entity
    pub entity: RawEntity,
    /// ISO 4217 report currency
    pub currency: Option<String>,
    /// Principal period
    pub reporting_period: RawReportingPeriod,
    /// Report title
    pub title: Option<String>,
    /// Report subtitle
    pub subtitle: Option<String>,
    /// Requested output language
    pub output_language: Option<String>,
    /// Additional named periods
    pub periods: Vec<RawPeriod>,
}

/// Everything an adapter extracted from one input document
#[derive(Debug, Clone, Default)]
pub struct AdaptedInput {
    /// Report metadata
    pub metadata: RawMetadata,
    /// Named values
    pub values: Vec<RawValue>,
    /// Tables
    pub tables: Vec<RawTable>,
    /// Findings raised while adapting
    pub diagnostics: Diagnostics,
}

impl AdaptedInput {
    /// Input from bare values
    #[must_use]
    pub fn from_values(values: Vec<RawValue>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// With metadata
    #[inline]
    #[must_use]
    pub fn with_metadata(mut self, metadata: RawMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// With a table
    #[inline]
    #[must_use]
    pub fn with_table(mut self, table: RawTable) -> Self {
        self.tables.push(table);
        self
    }
}

/// Parse `Axis=Member;Axis2=Member2` dimension text
///
/// Returns the pairs read and the fragments that are not `axis=member`.
#[must_use]
pub fn parse_dimension_text(text: &str) -> (BTreeMap<String, String>, Vec<String>) {
    let mut pairs = BTreeMap::new();
    let mut rejected = Vec::new();
    for part in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('=') {
            Some((axis, member)) if !axis.trim().is_empty() && !member.trim().is_empty() => {
                pairs.insert(axis.trim().to_string(), member.trim().to_string());
            }
            _ => rejected.push(part.to_string()),
        }
    }
    (pairs, rejected)
}

/// Text form of a scalar cell used where a name or member is expected
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
