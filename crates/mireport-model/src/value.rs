//! Typed fact values

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Value of a fact after type coercion
///
/// Numbers are exact decimals so equal inputs compare equal regardless of
/// how they were spelled (`1250.5` vs `"1250.50"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum FactValue {
    /// Numeric or monetary amount
    Number(Decimal),
    /// Free text
    Text(String),
    /// true / false
    Boolean(bool),
    /// Calendar date
    Date(NaiveDate),
    /// One enumeration member
    Member(String),
    /// Set of enumeration members
    Members(BTreeSet<String>),
}

impl FactValue {
    /// Numeric amount, if numeric
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(d) => Some(*d),
            _ => None,
        }
    }

    /// Compare values ignoring trailing zeros of numbers
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.normalize() == b.normalize(),
            _ => self == other,
        }
    }
}

impl Display for FactValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(d) => write!(f, "{d}"),
            Self::Text(s) | Self::Member(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Members(set) => {
                let joined: Vec<&str> = set.iter().map(String::as_str).collect();
                f.write_str(&joined.join(" "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn numbers_compare_by_value() {
        let a = FactValue::Number(Decimal::from_str("1250.5").unwrap());
        let b = FactValue::Number(Decimal::from_str("1250.50").unwrap());
        assert!(a.same_as(&b));
        assert!(!a.same_as(&FactValue::Number(Decimal::from(1250))));
    }

    #[test]
    fn display() {
        let d = FactValue::Date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(d.to_string(), "2024-12-31");
        let set = FactValue::Members(["B".to_string(), "A".to_string()].into_iter().collect());
        assert_eq!(set.to_string(), "A B");
    }
}
