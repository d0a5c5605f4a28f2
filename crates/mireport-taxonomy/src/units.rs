//! Unit registry and bidirectional alias table
//!
//! Every known unit is stored once under its canonical [`Measure`]
//! (`prefix:local`). The alias table maps the short form (`tCO2e`), the
//! namespaced form (`utr:tCO2e`) and any extra aliases (`%`) to that one
//! measure, so producers and consumers may use either spelling.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Namespace prefix for ISO 4217 currencies
pub const ISO4217_PREFIX: &str = "iso4217";

/// Namespace prefix for XBRL built-in units
pub const XBRLI_PREFIX: &str = "xbrli";

/// Namespace prefix for the Units Type Registry
pub const UTR_PREFIX: &str = "utr";

/// Unit type of dimensionless measures
pub const PURE_UNIT_TYPE: &str = "pure";

/// Unit type of currency measures
pub const MONETARY_UNIT_TYPE: &str = "monetary";

static PARENTHESISED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((.*?)\)").expect("parenthesis pattern is a valid regex"));

/// Canonical measure: a namespaced unit identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Measure {
    /// Namespace prefix (`utr`, `iso4217`, `xbrli`)
    pub prefix: String,
    /// Local unit id (`tCO2e`, `EUR`, `pure`)
    pub local: String,
}

impl Measure {
    /// Create measure
    #[inline]
    #[must_use]
    pub fn new(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    /// The dimensionless unit `xbrli:pure`
    #[inline]
    #[must_use]
    pub fn pure() -> Self {
        Self::new(XBRLI_PREFIX, "pure")
    }

    /// ISO 4217 currency measure
    #[inline]
    #[must_use]
    pub fn currency(code: &str) -> Self {
        Self::new(ISO4217_PREFIX, code.trim().to_ascii_uppercase())
    }

    /// Short (unprefixed) form
    #[inline]
    #[must_use]
    pub fn short(&self) -> &str {
        &self.local
    }

    /// Namespaced form (`prefix:local`)
    #[inline]
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}:{}", self.prefix, self.local)
    }

    /// Whether this is a currency measure
    #[inline]
    #[must_use]
    pub fn is_currency(&self) -> bool {
        self.prefix == ISO4217_PREFIX
    }
}

impl Display for Measure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
                Ok(Self::new(prefix, local))
            }
            _ => Err(format!("expected 'prefix:local', got '{s}'")),
        }
    }
}

/// Definition of a unit in the registry snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDefinition {
    /// Namespace prefix
    #[serde(default = "default_unit_prefix")]
    pub prefix: String,

    /// Unit type (`energy`, `ghgEmissions`, `pure`, ...)
    pub unit_type: String,

    /// Extra spellings that resolve to this unit
    #[serde(default)]
    pub aliases: Vec<String>,
}

fn default_unit_prefix() -> String {
    UTR_PREFIX.to_string()
}

impl UnitDefinition {
    /// Create definition under the `utr` prefix
    #[must_use]
    pub fn new(unit_type: impl Into<String>) -> Self {
        Self {
            prefix: default_unit_prefix(),
            unit_type: unit_type.into(),
            aliases: Vec::new(),
        }
    }

    /// With prefix
    #[inline]
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// With alias
    #[inline]
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// Outcome of resolving free unit text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitLookup {
    /// Exactly one unit matched
    Found(Measure),
    /// More than one distinct unit matched
    Ambiguous(Vec<Measure>),
    /// Nothing matched
    NotFound,
}

impl UnitLookup {
    /// The resolved measure, if unambiguous
    #[inline]
    #[must_use]
    pub fn found(self) -> Option<Measure> {
        match self {
            Self::Found(m) => Some(m),
            _ => None,
        }
    }
}

/// Registry of known units with their alias table
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    /// Canonical measure -> unit type
    types: BTreeMap<Measure, String>,
    /// Any accepted spelling -> canonical measure
    aliases: HashMap<String, Measure>,
}

impl UnitRegistry {
    /// Registry holding only the built-in units (`xbrli:pure`, `%`)
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            types: BTreeMap::new(),
            aliases: HashMap::new(),
        };
        registry.insert(
            "pure",
            &UnitDefinition::new(PURE_UNIT_TYPE)
                .with_prefix(XBRLI_PREFIX)
                .with_alias("%"),
        );
        registry
    }

    /// Register a unit under its short id
    pub fn insert(&mut self, id: &str, definition: &UnitDefinition) {
        let measure = Measure::new(definition.prefix.clone(), id);
        self.aliases.insert(id.to_string(), measure.clone());
        self.aliases.insert(measure.qualified(), measure.clone());
        for alias in &definition.aliases {
            self.aliases.insert(alias.clone(), measure.clone());
        }
        self.types.insert(measure, definition.unit_type.clone());
    }

    /// Look up one exact spelling
    ///
    /// Three-letter upper-case codes not otherwise registered resolve to
    /// ISO 4217 currencies.
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<Measure> {
        let text = text.trim();
        if let Some(m) = self.aliases.get(text) {
            return Some(m.clone());
        }
        let code = text
            .strip_prefix(ISO4217_PREFIX)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(text);
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
            return Some(Measure::currency(code));
        }
        None
    }

    /// Resolve free unit text through the alias table
    ///
    /// Candidates are the text itself, every parenthesised fragment and the
    /// local part of a prefixed spelling. Distinct matches make the lookup
    /// ambiguous.
    #[must_use]
    pub fn resolve(&self, text: &str) -> UnitLookup {
        let text = text.trim();
        if text.is_empty() {
            return UnitLookup::NotFound;
        }

        let mut candidates = vec![text.to_string()];
        candidates.extend(
            PARENTHESISED
                .captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
        );
        if let Some((_, local)) = text.rsplit_once(':') {
            candidates.push(local.to_string());
        }

        let found: BTreeSet<Measure> = candidates.iter().filter_map(|c| self.lookup(c)).collect();

        match found.len() {
            0 => UnitLookup::NotFound,
            1 => found.into_iter().next().map_or(UnitLookup::NotFound, UnitLookup::Found),
            _ => UnitLookup::Ambiguous(found.into_iter().collect()),
        }
    }

    /// Unit type of a measure
    #[must_use]
    pub fn unit_type(&self, measure: &Measure) -> Option<&str> {
        if measure.is_currency() {
            return Some(MONETARY_UNIT_TYPE);
        }
        self.types.get(measure).map(String::as_str)
    }

    /// Whether a measure is acceptable for a concept of the given unit type
    ///
    /// A concept without a unit type accepts any registered non-currency unit.
    #[must_use]
    pub fn valid_for(&self, unit_type: Option<&str>, measure: &Measure) -> bool {
        match (unit_type, self.unit_type(measure)) {
            (_, None) => false,
            (None, Some(actual)) => actual != MONETARY_UNIT_TYPE,
            (Some(expected), Some(actual)) => expected == actual,
        }
    }

    /// Whether some single measure carries `unit_type`
    ///
    /// Such types are measured directly, so a ratio of two units never fits
    /// them.
    #[must_use]
    pub fn is_measure_type(&self, unit_type: &str) -> bool {
        unit_type == MONETARY_UNIT_TYPE || self.types.values().any(|t| t == unit_type)
    }

    /// Number of registered units (excluding implicit currencies)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no units are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> UnitRegistry {
        let mut r = UnitRegistry::new();
        r.insert("tCO2e", &UnitDefinition::new("ghgEmissions"));
        r.insert("MWh", &UnitDefinition::new("energy"));
        r.insert("GJ", &UnitDefinition::new("energy"));
        r
    }

    #[test]
    fn short_and_namespaced_forms_resolve_to_same_measure() {
        let r = registry();
        let short = r.resolve("tCO2e").found().unwrap();
        let long = r.resolve("utr:tCO2e").found().unwrap();
        assert_eq!(short, long);
        assert_eq!(short.qualified(), "utr:tCO2e");
        assert_eq!(short.short(), "tCO2e");
    }

    #[test]
    fn percent_is_pure() {
        let r = registry();
        assert_eq!(r.resolve("%").found(), Some(Measure::pure()));
        assert_eq!(r.resolve("xbrli:pure").found(), Some(Measure::pure()));
    }

    #[test]
    fn measure_types() {
        let r = registry();
        assert!(r.is_measure_type("energy"));
        assert!(r.is_measure_type("pure"));
        assert!(r.is_measure_type("monetary"));
        assert!(!r.is_measure_type("intensity"));
    }

    #[test]
    fn currencies_resolve_implicitly() {
        let r = registry();
        assert_eq!(r.resolve("EUR").found(), Some(Measure::currency("EUR")));
        assert_eq!(r.resolve("iso4217:USD").found(), Some(Measure::currency("USD")));
        assert_eq!(r.unit_type(&Measure::currency("GBP")), Some(MONETARY_UNIT_TYPE));
    }

    #[test]
    fn parenthesised_unit_is_extracted() {
        let r = registry();
        assert_eq!(
            r.resolve("Tonnes CO2 equivalent (tCO2e)").found(),
            Some(Measure::new("utr", "tCO2e"))
        );
    }

    #[test]
    fn distinct_matches_are_ambiguous() {
        let r = registry();
        assert!(matches!(r.resolve("Energy (MWh) or (GJ)"), UnitLookup::Ambiguous(ref v) if v.len() == 2));
    }

    #[test]
    fn unknown_text_not_found() {
        let r = registry();
        assert_eq!(r.resolve("furlongs"), UnitLookup::NotFound);
        assert_eq!(r.resolve("   "), UnitLookup::NotFound);
    }

    #[test]
    fn validity_by_unit_type() {
        let r = registry();
        let mwh = Measure::new("utr", "MWh");
        assert!(r.valid_for(Some("energy"), &mwh));
        assert!(!r.valid_for(Some("ghgEmissions"), &mwh));
        assert!(r.valid_for(None, &mwh));
        assert!(!r.valid_for(None, &Measure::currency("EUR")));
        assert!(!r.valid_for(Some("energy"), &Measure::new("utr", "unknown")));
    }

    #[test]
    fn measure_from_str() {
        let m: Measure = "utr:MWh".parse().unwrap();
        assert_eq!(m, Measure::new("utr", "MWh"));
        assert!("MWh".parse::<Measure>().is_err());
    }
}
