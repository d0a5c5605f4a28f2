//! mireport Input Adapters
//!
//! Turn input documents into [`AdaptedInput`]: report metadata, raw named
//! values and raw tables. Both adapters produce the same [`RawValue`] shape,
//! so the resolution engine never knows where a value came from beyond its
//! [`Provenance`](mireport_model::Provenance).
//!
//! # Example
//!
//! ```rust
//! use mireport_adapters::{adapter_for, InputAdapter, InputFormat};
//!
//! let document = InputFormat::Json.parse(r#"{"NumberOfEmployees": 250}"#).unwrap();
//! let adapter = adapter_for(document).unwrap();
//! assert_eq!(adapter.kind(), "structured");
//! assert_eq!(adapter.adapt().unwrap().values.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod raw;
pub mod spreadsheet;
pub mod structured;

pub use error::AdapterError;
pub use raw::{
    parse_dimension_text, AdaptedInput, RawEntity, RawMetadata, RawPeriod, RawReportingPeriod, RawRow,
    RawTable, RawValue,
};
pub use spreadsheet::{NamedRange, SpreadsheetAdapter, Workbook};
pub use structured::StructuredAdapter;

use serde_json::Value;
use std::path::Path;

/// Source of raw named values
///
/// Implement this trait to support a new input shape.
pub trait InputAdapter: Send + Sync {
    /// Short name of the adapter, for logs
    fn kind(&self) -> &'static str;

    /// Extract metadata, values and tables
    ///
    /// # Errors
    /// Returns error only when the document as a whole cannot be read;
    /// problems with single values are reported as diagnostics
    fn adapt(&self) -> Result<AdaptedInput, AdapterError>;
}

/// Text format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// JSON document (structured data or serialized workbook)
    Json,
    /// YAML document
    Yaml,
}

impl InputFormat {
    /// Format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Parse text into a document value
    ///
    /// # Errors
    /// Returns error if the text is not valid in this format
    pub fn parse(self, text: &str) -> Result<Value, AdapterError> {
        Ok(match self {
            Self::Json => serde_json::from_str(text)?,
            Self::Yaml => serde_yaml::from_str(text)?,
        })
    }
}

/// Whether a document is a serialized [`Workbook`]
///
/// Workbooks carry `namedRanges` as a list of ranges; structured documents
/// carry it as a mapping.
#[must_use]
pub fn is_workbook(document: &Value) -> bool {
    document.get("namedRanges").is_some_and(Value::is_array)
}

/// Select an adapter by the shape of the document
///
/// # Errors
/// Returns error if the document is neither a workbook nor a mapping
pub fn adapter_for(document: Value) -> Result<Box<dyn InputAdapter>, AdapterError> {
    if is_workbook(&document) {
        let workbook: Workbook = serde_json::from_value(document)
            .map_err(|e| AdapterError::UnsupportedShape(format!("malformed workbook: {e}")))?;
        return Ok(Box::new(SpreadsheetAdapter::new(workbook)));
    }
    if document.is_object() {
        return Ok(Box::new(StructuredAdapter::new(document)));
    }
    Err(AdapterError::UnsupportedShape(
        "expected a workbook or a mapping of named values".to_string(),
    ))
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for adapting input
    pub use crate::{adapter_for, AdaptedInput, AdapterError, InputAdapter, InputFormat, RawTable, RawValue};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selects_by_shape() {
        let workbook = json!({"namedRanges": [
            {"name": "NumberOfEmployees", "sheet": "S", "row": 1, "column": 1, "cells": [[250]]}
        ]});
        assert_eq!(adapter_for(workbook).unwrap().kind(), "spreadsheet");
        assert_eq!(adapter_for(json!({"namedRanges": {}})).unwrap().kind(), "structured");
        assert!(adapter_for(json!(42)).is_err());
    }

    #[test]
    fn both_adapters_produce_the_same_value_shape() {
        let from_sheet = adapter_for(json!({"namedRanges": [
            {"name": "NumberOfEmployees", "sheet": "S", "row": 1, "column": 1, "cells": [[250]]}
        ]}))
        .unwrap()
        .adapt()
        .unwrap();
        let from_json = adapter_for(json!({"NumberOfEmployees": 250})).unwrap().adapt().unwrap();
        let strip = |v: &RawValue| RawValue { provenance: None, ..v.clone() };
        assert_eq!(strip(&from_sheet.values[0]), strip(&from_json.values[0]));
    }

    #[test]
    fn format_from_path() {
        assert_eq!(InputFormat::from_path(Path::new("report.sheet.json")), Some(InputFormat::Json));
        assert_eq!(InputFormat::from_path(Path::new("report.YML")), Some(InputFormat::Yaml));
        assert_eq!(InputFormat::from_path(Path::new("report.xlsx")), None);
    }
}
