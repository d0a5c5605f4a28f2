//! mireport Fact Model
//!
//! Value types produced by the resolution engine: typed facts, interned
//! contexts and units, named periods, and the diagnostics log.

#![warn(missing_docs)]

pub mod context;
pub mod diagnostics;
pub mod fact;
pub mod intern;
pub mod period;
pub mod report;
pub mod unit;
pub mod value;

// Re-exports
pub use context::{Context, EntityIdentifier};
pub use diagnostics::{Category, Diagnostic, Diagnostics, Provenance, Severity};
pub use fact::{Fact, FactInsert, FactKey, FactSet};
pub use intern::{ContextId, ContextInterner, Interner, UnitId, UnitInterner};
pub use period::{Period, PeriodRegistry, PeriodSpan, AS_OF_PERIOD, PRINCIPAL_PERIOD};
pub use report::{InlineReport, ReportMetadata};
pub use unit::Unit;
pub use value::FactValue;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building facts
    pub use crate::{
        Category, Context, ContextId, Diagnostic, Diagnostics, EntityIdentifier, Fact, FactValue,
        Provenance, Severity, Unit, UnitId,
    };
}
