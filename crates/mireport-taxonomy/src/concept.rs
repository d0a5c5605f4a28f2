//! Concept metadata
//!
//! Provides [`Concept`] and the small enums describing how a concept's
//! values are typed, which period it attaches to and which dimension axes
//! may qualify it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

/// Declared data type of a concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataType {
    /// Decimal number (counts, ratios, physical quantities)
    Decimal,
    /// Whole number
    Integer,
    /// Currency amount
    Monetary,
    /// Free text
    Text,
    /// true / false
    Boolean,
    /// Calendar date
    Date,
    /// Exactly one member of an enumeration domain
    Enumeration,
    /// Any number of members of an enumeration domain
    EnumerationSet,
}

impl DataType {
    /// Whether facts of this type carry a unit
    #[inline]
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Decimal | Self::Integer | Self::Monetary)
    }

    /// Currency amount
    #[inline]
    #[must_use]
    pub fn is_monetary(self) -> bool {
        matches!(self, Self::Monetary)
    }

    /// Enumeration or enumeration set
    #[inline]
    #[must_use]
    pub fn is_enumeration(self) -> bool {
        matches!(self, Self::Enumeration | Self::EnumerationSet)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::Monetary => "monetary",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Enumeration => "enumeration",
            Self::EnumerationSet => "enumeration-set",
        };
        f.write_str(name)
    }
}

/// Period a concept's facts attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodType {
    /// Point in time ("as of")
    Instant,
    /// Start/end range
    Duration,
}

impl Display for PeriodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant => f.write_str("instant"),
            Self::Duration => f.write_str("duration"),
        }
    }
}

/// Constraint on one dimension axis for a concept
///
/// An axis without `members` is typed: any non-empty value is a member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisConstraint {
    /// Allowed explicit members (`None` = typed axis)
    #[serde(default)]
    pub members: Option<BTreeSet<String>>,

    /// Member assumed when the axis is not given
    #[serde(default)]
    pub default_member: Option<String>,
}

impl AxisConstraint {
    /// Explicit axis over the given members
    #[must_use]
    pub fn explicit<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: Some(members.into_iter().map(Into::into).collect()),
            default_member: None,
        }
    }

    /// Typed axis accepting any value
    #[inline]
    #[must_use]
    pub fn typed() -> Self {
        Self::default()
    }

    /// With default member
    #[inline]
    #[must_use]
    pub fn with_default(mut self, member: impl Into<String>) -> Self {
        self.default_member = Some(member.into());
        self
    }

    /// Whether the axis accepts arbitrary values
    #[inline]
    #[must_use]
    pub fn is_typed(&self) -> bool {
        self.members.is_none()
    }

    /// Check whether `member` is allowed on this axis
    #[must_use]
    pub fn allows(&self, member: &str) -> bool {
        match &self.members {
            Some(members) => members.contains(member),
            None => !member.trim().is_empty(),
        }
    }
}

/// A reportable (or structural) item of the taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    /// Local name, unique within the taxonomy
    #[serde(default)]
    pub name: String,

    /// Declared data type
    pub data_type: DataType,

    /// Instant or duration
    pub period_type: PeriodType,

    /// Family of units the concept accepts (`energy`, `pure`, ...)
    #[serde(default)]
    pub unit_type: Option<String>,

    /// Units the taxonomy prescribes for this concept
    #[serde(default)]
    pub required_units: BTreeSet<String>,

    /// Dimension axes allowed on this concept
    #[serde(default)]
    pub dimensions: BTreeMap<String, AxisConstraint>,

    /// Members of the enumeration domain (enumeration types only)
    #[serde(default)]
    pub enumeration: BTreeSet<String>,

    /// Human-readable labels
    #[serde(default)]
    pub labels: Vec<String>,

    /// Abstract concepts structure the taxonomy and are never reported
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

impl Concept {
    /// Create concept with no units, dimensions or labels
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType, period_type: PeriodType) -> Self {
        Self {
            name: name.into(),
            data_type,
            period_type,
            unit_type: None,
            required_units: BTreeSet::new(),
            dimensions: BTreeMap::new(),
            enumeration: BTreeSet::new(),
            labels: Vec::new(),
            is_abstract: false,
        }
    }

    /// With unit type
    #[inline]
    #[must_use]
    pub fn with_unit_type(mut self, unit_type: impl Into<String>) -> Self {
        self.unit_type = Some(unit_type.into());
        self
    }

    /// With a required unit
    #[inline]
    #[must_use]
    pub fn with_required_unit(mut self, unit: impl Into<String>) -> Self {
        self.required_units.insert(unit.into());
        self
    }

    /// With a dimension axis
    #[inline]
    #[must_use]
    pub fn with_axis(mut self, axis: impl Into<String>, constraint: AxisConstraint) -> Self {
        self.dimensions.insert(axis.into(), constraint);
        self
    }

    /// With enumeration members
    #[must_use]
    pub fn with_enumeration<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumeration.extend(members.into_iter().map(Into::into));
        self
    }

    /// With a label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Mark abstract
    #[inline]
    #[must_use]
    pub fn abstract_item(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Concepts that may be reported as facts
    #[inline]
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        !self.is_abstract
    }

    /// The single prescribed unit, if exactly one is declared
    #[must_use]
    pub fn sole_required_unit(&self) -> Option<&str> {
        if self.required_units.len() == 1 {
            self.required_units.iter().next().map(String::as_str)
        } else {
            None
        }
    }

    /// Constraint for an axis, if the concept allows it
    #[inline]
    #[must_use]
    pub fn axis(&self, axis: &str) -> Option<&AxisConstraint> {
        self.dimensions.get(axis)
    }

    /// Standard label (first label, falling back to the name)
    #[inline]
    #[must_use]
    pub fn standard_label(&self) -> &str {
        self.labels.first().map_or(self.name.as_str(), String::as_str)
    }
}

impl Display for Concept {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_types() {
        assert!(DataType::Decimal.is_numeric());
        assert!(DataType::Integer.is_numeric());
        assert!(DataType::Monetary.is_numeric());
        assert!(DataType::Monetary.is_monetary());
        assert!(!DataType::Text.is_numeric());
        assert!(!DataType::Enumeration.is_numeric());
        assert!(DataType::EnumerationSet.is_enumeration());
    }

    #[test]
    fn sole_required_unit_only_when_single() {
        let one = Concept::new("A", DataType::Decimal, PeriodType::Duration).with_required_unit("MWh");
        assert_eq!(one.sole_required_unit(), Some("MWh"));

        let two = one.clone().with_required_unit("GJ");
        assert_eq!(two.sole_required_unit(), None);

        let none = Concept::new("B", DataType::Decimal, PeriodType::Duration);
        assert_eq!(none.sole_required_unit(), None);
    }

    #[test]
    fn axis_constraint_allows() {
        let explicit = AxisConstraint::explicit(["Scope1", "Scope2"]);
        assert!(explicit.allows("Scope1"));
        assert!(!explicit.allows("Scope3"));
        assert!(!explicit.is_typed());

        let typed = AxisConstraint::typed();
        assert!(typed.allows("site-42"));
        assert!(!typed.allows("  "));
    }

    #[test]
    fn concept_deserializes_from_camel_case() {
        let json = r#"{
            "dataType": "monetary",
            "periodType": "duration",
            "requiredUnits": [],
            "abstract": false
        }"#;
        let concept: Concept = serde_json::from_str(json).unwrap();
        assert_eq!(concept.data_type, DataType::Monetary);
        assert_eq!(concept.period_type, PeriodType::Duration);
        assert!(concept.is_reportable());
    }

    #[test]
    fn standard_label_falls_back_to_name() {
        let c = Concept::new("Revenue", DataType::Monetary, PeriodType::Duration);
        assert_eq!(c.standard_label(), "Revenue");
        let c = c.with_label("Revenue for the period");
        assert_eq!(c.standard_label(), "Revenue for the period");
    }
}
