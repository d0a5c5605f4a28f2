//! mireport Core
//!
//! Converts raw named values into a taxonomy-validated report.
//!
//! # Architecture
//!
//! ```text
//! AdaptedInput ──► MetadataResolver ──► Engine (values) ──► table::flatten ──► assemble
//!                                          │                      │
//!                                          └──── Diagnostics ◄────┘
//! ```
//!
//! - **Profile**: read-only defaults (units, dimensions, currency, locale)
//! - **Engine**: per-value fold of lookup, coercion, unit, period and
//!   dimension resolution, interning and conflict detection
//! - **Table flattener**: per-row contexts for repeating rows
//! - **Assembler**: the completeness gate and the final [`InlineReport`]
//!
//! # Example
//!
//! ```rust
//! use mireport_adapters::{AdaptedInput, RawMetadata, RawValue};
//! use mireport_core::{convert, Profile};
//! use mireport_taxonomy::{Concept, DataType, PeriodType, Taxonomy};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let taxonomy = Taxonomy::builder("vsme-all.xsd")
//!     .concept(Concept::new("NumberOfEmployees", DataType::Integer, PeriodType::Instant)
//!         .with_unit_type("pure"))
//!     .build()
//!     .unwrap();
//!
//! let metadata: RawMetadata = serde_json::from_value(json!({
//!     "entity": {"identifier": "5493001KJTIIGC8Y1R12", "identifierScheme": "lei"},
//!     "reportingPeriod": {"start": "2024-01-01", "end": "2024-12-31"}
//! })).unwrap();
//! let input = AdaptedInput::from_values(vec![RawValue::new("NumberOfEmployees", json!(250))])
//!     .with_metadata(metadata);
//!
//! let conversion = convert(input, Arc::new(taxonomy), Arc::new(Profile::default())).unwrap();
//! assert_eq!(conversion.report.facts.len(), 1);
//! ```
//!
//! [`InlineReport`]: mireport_model::InlineReport

#![warn(missing_docs)]

pub mod assembler;
pub mod coerce;
pub mod convert;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod profile;
pub mod table;
pub mod unit_resolution;

// Re-exports
pub use assembler::{assemble, Conversion};
pub use convert::{convert, Converter};
pub use engine::{Engine, EngineOutput, Resolution};
pub use error::{ConversionError, ProfileError};
pub use metadata::{MetadataResolver, ResolvedMetadata};
pub use profile::{ComplexUnit, InvalidMemberPolicy, Profile};
pub use unit_resolution::{UnitResolver, UnitSource};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running conversions
    pub use crate::{convert, Conversion, ConversionError, Converter, Profile};
    pub use mireport_adapters::{AdaptedInput, RawTable, RawValue};
    pub use mireport_model::{Diagnostics, InlineReport, Severity};
    pub use mireport_taxonomy::Taxonomy;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
