//! mireport Taxonomy Registry
//!
//! Read-only concept metadata consumed by the resolution engine.
//!
//! # Overview
//!
//! - **Concept**: name, data type, period type, unit constraints, dimension axes
//! - **Taxonomy**: immutable lookup by name or label, shared across conversions
//! - **UnitRegistry**: canonical measures plus the bidirectional alias table
//! - **TaxonomyCache**: load-once cells keyed by entry point
//!
//! # Example
//!
//! ```rust
//! use mireport_taxonomy::{Concept, DataType, PeriodType, Taxonomy, UnitDefinition};
//!
//! let taxonomy = Taxonomy::builder("vsme-all.xsd")
//!     .unit("MWh", UnitDefinition::new("energy"))
//!     .concept(Concept::new("EnergyConsumption", DataType::Decimal, PeriodType::Duration)
//!         .with_unit_type("energy"))
//!     .build()
//!     .unwrap();
//!
//! assert!(taxonomy.lookup("EnergyConsumption").is_some());
//! assert_eq!(taxonomy.units().resolve("utr:MWh"), taxonomy.units().resolve("MWh"));
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod concept;
pub mod error;
pub mod taxonomy;
pub mod units;

// Re-exports
pub use cache::{CacheStats, TaxonomyCache};
pub use concept::{AxisConstraint, Concept, DataType, PeriodType};
pub use error::TaxonomyError;
pub use taxonomy::{Taxonomy, TaxonomyBuilder, TaxonomySnapshot};
pub use units::{Measure, UnitDefinition, UnitLookup, UnitRegistry, MONETARY_UNIT_TYPE, PURE_UNIT_TYPE};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for taxonomy lookups
    pub use crate::{
        AxisConstraint, Concept, DataType, Measure, PeriodType, Taxonomy, TaxonomyCache,
        TaxonomyError, UnitLookup, UnitRegistry,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
