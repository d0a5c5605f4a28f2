//! Configuration profile
//!
//! Read-only defaults consulted by the resolution engine. A profile is
//! loaded once (JSON or YAML, kebab-case keys, every key optional) and
//! shared by `Arc` across conversions.
//!
//! ```yaml
//! default-currency: EUR
//! default-locale: en-GB
//! concept-units:
//!   EnergyConsumption: MWh
//! unit-replacements:
//!   "tonnes CO2e": tCO2e
//! table-axes:
//!   Workforce: WorkforceRowAxis
//! invalid-member-policy: drop-member
//! ```

use crate::error::ProfileError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with a value that names an invalid dimension member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidMemberPolicy {
    /// Drop the whole value
    #[default]
    DropValue,
    /// Drop only the offending axis and keep the value
    DropMember,
}

/// Divide unit definition (`numerator / denominator`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexUnit {
    /// Numerator unit texts
    pub numerator: Vec<String>,
    /// Denominator unit texts
    pub denominator: Vec<String>,
}

impl ComplexUnit {
    /// Create divide unit
    #[must_use]
    pub fn new<N, D>(numerator: N, denominator: D) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            numerator: numerator.into_iter().map(Into::into).collect(),
            denominator: denominator.into_iter().map(Into::into).collect(),
        }
    }
}

fn default_scheme_aliases() -> BTreeMap<String, String> {
    [
        ("lei", "http://standards.iso.org/iso/17442"),
        ("duns", "https://www.dnb.co.uk/duns-number"),
        ("euid", "https://euid.eu/"),
        ("permid", "https://permid.org/"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_empty_markers() -> Vec<String> {
    ["", "-", "n/a", "N/A", "null"].into_iter().map(String::from).collect()
}

/// Conversion defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Profile {
    /// Concept -> unit text (or complex unit id)
    pub concept_units: BTreeMap<String, String>,
    /// Concept -> axis -> member applied when the input gives no member
    pub concept_dimensions: BTreeMap<String, BTreeMap<String, String>>,
    /// Unit type -> unit text
    pub unit_type_units: BTreeMap<String, String>,
    /// Currency used when the input declares none
    pub default_currency: Option<String>,
    /// Locale used when the input declares none
    pub default_locale: Option<String>,
    /// Text replacements tried, in order, on unrecognised unit text
    pub unit_replacements: IndexMap<String, String>,
    /// Cell text -> enumeration member, tried after names and labels
    pub enumeration_fallbacks: BTreeMap<String, String>,
    /// Complex (divide) units by id
    pub complex_units: BTreeMap<String, ComplexUnit>,
    /// Identifier scheme alias -> scheme URI
    pub scheme_aliases: BTreeMap<String, String>,
    /// Table name -> row axis
    pub table_axes: BTreeMap<String, String>,
    /// Handling of invalid dimension members
    pub invalid_member_policy: InvalidMemberPolicy,
    /// Cell texts treated as "no value"
    pub empty_markers: Vec<String>,
    /// Decimals reported for every numeric fact instead of the inferred value
    pub default_decimals: Option<i32>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            concept_units: BTreeMap::new(),
            concept_dimensions: BTreeMap::new(),
            unit_type_units: BTreeMap::new(),
            default_currency: None,
            default_locale: None,
            unit_replacements: IndexMap::new(),
            enumeration_fallbacks: BTreeMap::new(),
            complex_units: BTreeMap::new(),
            scheme_aliases: default_scheme_aliases(),
            table_axes: BTreeMap::new(),
            invalid_member_policy: InvalidMemberPolicy::default(),
            empty_markers: default_empty_markers(),
            default_decimals: None,
        }
    }
}

impl Profile {
    /// Profile from JSON text
    ///
    /// # Errors
    /// Returns error if the JSON is invalid or the profile is inconsistent
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()
    }

    /// Profile from YAML text
    ///
    /// # Errors
    /// Returns error if the YAML is invalid or the profile is inconsistent
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_yaml::from_str(yaml)?;
        profile.validate()
    }

    fn validate(self) -> Result<Self, ProfileError> {
        if let Some(code) = &self.default_currency {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ProfileError::InvalidCurrency(code.clone()));
            }
        }
        if let Some((id, _)) = self
            .complex_units
            .iter()
            .find(|(_, u)| u.numerator.is_empty() || u.denominator.is_empty())
        {
            return Err(ProfileError::InvalidComplexUnit(id.clone()));
        }
        Ok(self)
    }

    /// Whether `text` is one of the empty markers
    #[must_use]
    pub fn is_empty_marker(&self, text: &str) -> bool {
        let text = text.trim();
        self.empty_markers.iter().any(|m| m == text)
    }

    /// Scheme URI for an alias such as `LEI` or `Perm ID`
    #[must_use]
    pub fn scheme_uri(&self, alias: &str) -> Option<&str> {
        let key: String = alias
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        self.scheme_aliases.get(&key).map(String::as_str)
    }

    /// Fallback member for cell text, compared case-insensitively
    #[must_use]
    pub fn enumeration_fallback(&self, text: &str) -> Option<&str> {
        let text = text.trim();
        self.enumeration_fallbacks
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(text))
            .map(|(_, v)| v.as_str())
    }

    /// With concept unit default
    #[must_use]
    pub fn with_concept_unit(mut self, concept: impl Into<String>, unit: impl Into<String>) -> Self {
        self.concept_units.insert(concept.into(), unit.into());
        self
    }

    /// With concept dimension default
    #[must_use]
    pub fn with_concept_dimension(
        mut self,
        concept: impl Into<String>,
        axis: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        self.concept_dimensions
            .entry(concept.into())
            .or_default()
            .insert(axis.into(), member.into());
        self
    }

    /// With unit-type default
    #[must_use]
    pub fn with_unit_type_unit(mut self, unit_type: impl Into<String>, unit: impl Into<String>) -> Self {
        self.unit_type_units.insert(unit_type.into(), unit.into());
        self
    }

    /// With default currency
    #[inline]
    #[must_use]
    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = Some(currency.into());
        self
    }

    /// With default locale
    #[inline]
    #[must_use]
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    /// With unit text replacement
    #[must_use]
    pub fn with_unit_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.unit_replacements.insert(from.into(), to.into());
        self
    }

    /// With enumeration fallback
    #[must_use]
    pub fn with_enumeration_fallback(mut self, text: impl Into<String>, member: impl Into<String>) -> Self {
        self.enumeration_fallbacks.insert(text.into(), member.into());
        self
    }

    /// With complex unit
    #[must_use]
    pub fn with_complex_unit(mut self, id: impl Into<String>, unit: ComplexUnit) -> Self {
        self.complex_units.insert(id.into(), unit);
        self
    }

    /// With table axis
    #[must_use]
    pub fn with_table_axis(mut self, table: impl Into<String>, axis: impl Into<String>) -> Self {
        self.table_axes.insert(table.into(), axis.into());
        self
    }

    /// With invalid member policy
    #[inline]
    #[must_use]
    pub fn with_invalid_member_policy(mut self, policy: InvalidMemberPolicy) -> Self {
        self.invalid_member_policy = policy;
        self
    }

    /// With fixed decimals
    #[inline]
    #[must_use]
    pub fn with_default_decimals(mut self, decimals: i32) -> Self {
        self.default_decimals = Some(decimals);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_schemes_and_markers() {
        let profile = Profile::default();
        assert_eq!(profile.scheme_uri("LEI"), Some("http://standards.iso.org/iso/17442"));
        assert_eq!(profile.scheme_uri(" Perm ID "), Some("https://permid.org/"));
        assert!(profile.is_empty_marker(" n/a "));
        assert!(profile.is_empty_marker(""));
        assert!(!profile.is_empty_marker("0"));
        assert_eq!(profile.invalid_member_policy, InvalidMemberPolicy::DropValue);
    }

    #[test]
    fn yaml_profile_with_kebab_keys() {
        let profile = Profile::from_yaml(
            "default-currency: EUR\n\
             concept-units:\n  EnergyConsumption: MWh\n\
             invalid-member-policy: drop-member\n\
             complex-units:\n  EURperMWh:\n    numerator: [EUR]\n    denominator: [MWh]\n",
        )
        .unwrap();
        assert_eq!(profile.default_currency.as_deref(), Some("EUR"));
        assert_eq!(profile.concept_units["EnergyConsumption"], "MWh");
        assert_eq!(profile.invalid_member_policy, InvalidMemberPolicy::DropMember);
        assert_eq!(profile.complex_units["EURperMWh"].denominator, vec!["MWh".to_string()]);
        // unspecified keys keep their defaults
        assert!(profile.scheme_uri("lei").is_some());
    }

    #[test]
    fn json_profile_rejects_bad_currency() {
        let err = Profile::from_json(r#"{"default-currency": "EURO"}"#).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidCurrency(_)));
    }

    #[test]
    fn rejects_one_sided_complex_unit() {
        let err = Profile::from_json(r#"{"complex-units": {"X": {"numerator": ["EUR"], "denominator": []}}}"#)
            .unwrap_err();
        assert!(matches!(err, ProfileError::InvalidComplexUnit(ref id) if id == "X"));
    }

    #[test]
    fn enumeration_fallback_is_case_insensitive() {
        let profile = Profile::default().with_enumeration_fallback("Yes, fully", "FullyCompliant");
        assert_eq!(profile.enumeration_fallback("yes, FULLY"), Some("FullyCompliant"));
        assert_eq!(profile.enumeration_fallback("no"), None);
    }
}
