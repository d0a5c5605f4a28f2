//! Type coercion of raw payloads into typed fact values

use crate::profile::Profile;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use mireport_model::FactValue;
use mireport_taxonomy::{Concept, DataType, Taxonomy};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Largest day number a spreadsheet date can carry (9999-12-31)
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

/// Payload does not fit the concept's data type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CoercionError(String);

impl CoercionError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Typed value plus the fallbacks used to obtain it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coerced {
    /// Typed value
    pub value: FactValue,
    /// One message per enumeration fallback used
    pub workarounds: Vec<String>,
}

impl From<FactValue> for Coerced {
    fn from(value: FactValue) -> Self {
        Self {
            value,
            workarounds: Vec::new(),
        }
    }
}

/// Whether a payload carries no value
#[must_use]
pub fn is_empty(payload: &Value, profile: &Profile) -> bool {
    match payload {
        Value::Null => true,
        Value::String(s) => profile.is_empty_marker(s),
        Value::Array(items) => items.iter().all(|i| is_empty(i, profile)),
        _ => false,
    }
}

/// Exact decimal from a number or numeric text
#[must_use]
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Date from ISO text, a datetime or a spreadsheet serial day number
#[must_use]
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok().map(|dt| dt.date()))
                .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok().map(|dt| dt.date()))
                .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        }
        Value::Number(n) => {
            let serial = n.as_f64()?.floor();
            if !(1.0..=MAX_SERIAL_DAY).contains(&serial) {
                return None;
            }
            // whole days, bounded above
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let days = serial as u64;
            NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days))
        }
        _ => None,
    }
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Decimals to report for a numeric value
///
/// Inferred from the number of fractional digits given in the input.
#[must_use]
pub fn infer_decimals(value: &FactValue, profile: &Profile) -> Option<i32> {
    let number = value.as_number()?;
    Some(profile.default_decimals.unwrap_or_else(|| i32::try_from(number.scale()).unwrap_or(i32::MAX)))
}

/// Coerces payloads against concept data types
#[derive(Debug, Clone, Copy)]
pub struct Coercer<'a> {
    taxonomy: &'a Taxonomy,
    profile: &'a Profile,
}

impl<'a> Coercer<'a> {
    /// Create coercer
    #[inline]
    #[must_use]
    pub fn new(taxonomy: &'a Taxonomy, profile: &'a Profile) -> Self {
        Self { taxonomy, profile }
    }

    /// Coerce `payload` to the data type of `concept`
    ///
    /// # Errors
    /// Returns error describing the mismatch
    pub fn coerce(&self, concept: &Concept, payload: &Value) -> Result<Coerced, CoercionError> {
        match concept.data_type {
            DataType::Decimal | DataType::Monetary => parse_decimal(payload)
                .map(|d| FactValue::Number(d).into())
                .ok_or_else(|| mismatch(concept, payload)),
            DataType::Integer => {
                let d = parse_decimal(payload).ok_or_else(|| mismatch(concept, payload))?;
                if d.fract().is_zero() {
                    Ok(FactValue::Number(d.trunc()).into())
                } else {
                    Err(CoercionError::new(format!("{d} is not a whole number")))
                }
            }
            DataType::Text => match payload {
                Value::String(s) => Ok(FactValue::Text(s.trim().to_string()).into()),
                Value::Number(n) => Ok(FactValue::Text(n.to_string()).into()),
                Value::Bool(b) => Ok(FactValue::Text(b.to_string()).into()),
                _ => Err(mismatch(concept, payload)),
            },
            DataType::Boolean => parse_bool(payload)
                .map(|b| FactValue::Boolean(b).into())
                .ok_or_else(|| mismatch(concept, payload)),
            DataType::Date => parse_date(payload)
                .map(|d| FactValue::Date(d).into())
                .ok_or_else(|| mismatch(concept, payload)),
            DataType::Enumeration => {
                let text = payload.as_str().ok_or_else(|| mismatch(concept, payload))?;
                let (member, workaround) = self.member(concept, text)?;
                Ok(Coerced {
                    value: FactValue::Member(member),
                    workarounds: workaround.into_iter().collect(),
                })
            }
            DataType::EnumerationSet => self.member_set(concept, payload),
        }
    }

    fn member_set(&self, concept: &Concept, payload: &Value) -> Result<Coerced, CoercionError> {
        let items: Vec<String> = match payload {
            Value::Array(items) => items
                .iter()
                .filter(|i| !is_empty(i, self.profile))
                .map(|i| i.as_str().map(str::to_string).ok_or_else(|| mismatch(concept, i)))
                .collect::<Result<_, _>>()?,
            Value::String(s) => s
                .split([',', ';', '\n'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => return Err(mismatch(concept, payload)),
        };

        let mut members = BTreeSet::new();
        let mut workarounds = Vec::new();
        for item in items {
            let (member, workaround) = self.member(concept, &item)?;
            members.insert(member);
            workarounds.extend(workaround);
        }
        Ok(Coerced {
            value: FactValue::Members(members),
            workarounds,
        })
    }

    /// Match text to an enumeration member of `concept`
    ///
    /// Tries the member name, then a label, then the profile fallbacks.
    fn member(&self, concept: &Concept, text: &str) -> Result<(String, Option<String>), CoercionError> {
        let text = text.trim();
        let local = text
            .strip_prefix(self.taxonomy.prefix())
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(text);

        if concept.enumeration.is_empty() {
            return if local.is_empty() {
                Err(CoercionError::new("empty enumeration member"))
            } else {
                Ok((local.to_string(), None))
            };
        }
        if let Some(m) = self.find_member(concept, local) {
            return Ok((m, None));
        }
        if let Some(m) = self
            .profile
            .enumeration_fallback(text)
            .and_then(|fallback| self.find_member(concept, fallback))
        {
            let note = format!("'{text}' read as enumeration member '{m}' of {}", concept.name);
            return Ok((m, Some(note)));
        }
        Err(CoercionError::new(format!(
            "'{text}' is not a member of the {} enumeration",
            concept.name
        )))
    }

    fn find_member(&self, concept: &Concept, text: &str) -> Option<String> {
        if concept.enumeration.contains(text) {
            return Some(text.to_string());
        }
        if let Some(m) = concept.enumeration.iter().find(|m| m.eq_ignore_ascii_case(text)) {
            return Some(m.clone());
        }
        self.taxonomy
            .lookup_by_label(text)
            .filter(|c| concept.enumeration.contains(&c.name))
            .map(|c| c.name.clone())
    }
}

fn mismatch(concept: &Concept, payload: &Value) -> CoercionError {
    CoercionError::new(format!(
        "{payload} is not a valid {} value for {}",
        concept.data_type, concept.name
    ))
}
