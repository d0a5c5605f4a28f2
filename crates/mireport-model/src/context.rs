//! Reporting contexts
//!
//! A context is identified purely by its structure: the same entity, period
//! name and dimension members always denote the same context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Reporting entity identifier with its scheme URI
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityIdentifier {
    /// Scheme URI (`http://standards.iso.org/iso/17442` for LEI)
    pub scheme: String,
    /// Identifier within the scheme
    pub identifier: String,
}

impl EntityIdentifier {
    /// Create identifier
    #[inline]
    #[must_use]
    pub fn new(scheme: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            identifier: identifier.into(),
        }
    }
}

impl Display for EntityIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.scheme, self.identifier)
    }
}

/// Entity, period and dimension qualifiers of a fact
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Context {
    /// Reporting entity
    pub entity: EntityIdentifier,
    /// Registered period name
    pub period: String,
    /// Axis -> member, ordered by axis
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimensions: BTreeMap<String, String>,
}

impl Context {
    /// Context without dimensions
    #[must_use]
    pub fn new(entity: EntityIdentifier, period: impl Into<String>) -> Self {
        Self {
            entity,
            period: period.into(),
            dimensions: BTreeMap::new(),
        }
    }

    /// With one dimension member
    #[inline]
    #[must_use]
    pub fn with_dimension(mut self, axis: impl Into<String>, member: impl Into<String>) -> Self {
        self.dimensions.insert(axis.into(), member.into());
        self
    }

    /// Whether the context carries no dimensions
    #[inline]
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.dimensions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_order_does_not_matter() {
        let entity = EntityIdentifier::new("http://standards.iso.org/iso/17442", "5493001KJTIIGC8Y1R12");
        let a = Context::new(entity.clone(), "cur")
            .with_dimension("ScopeAxis", "Scope1")
            .with_dimension("SiteAxis", "Berlin");
        let b = Context::new(entity, "cur")
            .with_dimension("SiteAxis", "Berlin")
            .with_dimension("ScopeAxis", "Scope1");
        assert_eq!(a, b);
        assert!(!a.is_plain());
    }
}
