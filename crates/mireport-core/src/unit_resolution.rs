//! Unit resolution cascade
//!
//! The first step that yields a unit valid for the concept wins:
//!
//! 1. explicit unit text on the value
//! 2. profile concept -> unit default
//! 3. the concept's sole required unit
//! 4. profile unit-type -> unit default
//! 5. report currency for monetary concepts
//! 6. `xbrli:pure` for pure or untyped numeric concepts
//!
//! Every spelling goes through the taxonomy's alias table, so `tCO2e` and
//! `utr:tCO2e` always resolve to the same unit.

use crate::profile::{ComplexUnit, Profile};
use mireport_model::{Category, Diagnostic, Diagnostics, Provenance, Unit};
use mireport_taxonomy::{Concept, Measure, Taxonomy, UnitLookup, MONETARY_UNIT_TYPE, PURE_UNIT_TYPE};
use std::fmt::{self, Display, Formatter};

/// Cascade step that produced a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSource {
    /// Unit given with the value
    Explicit,
    /// Profile concept default
    ConceptDefault,
    /// Taxonomy's single required unit
    RequiredUnit,
    /// Profile unit-type default
    UnitTypeDefault,
    /// Report currency
    ReportCurrency,
    /// Dimensionless fallback
    Pure,
}

impl Display for UnitSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Explicit => "explicit unit",
            Self::ConceptDefault => "profile concept unit",
            Self::RequiredUnit => "required unit",
            Self::UnitTypeDefault => "profile unit-type default",
            Self::ReportCurrency => "report currency",
            Self::Pure => "dimensionless default",
        };
        f.write_str(s)
    }
}

enum Lookup {
    Unit(Unit),
    Workaround(Unit, String),
    Rejected(Category, String),
}

/// Resolves the unit of numeric facts
#[derive(Debug, Clone, Copy)]
pub struct UnitResolver<'a> {
    taxonomy: &'a Taxonomy,
    profile: &'a Profile,
    currency: Option<&'a str>,
}

impl<'a> UnitResolver<'a> {
    /// Create resolver; `currency` is the report currency, if known
    #[inline]
    #[must_use]
    pub fn new(taxonomy: &'a Taxonomy, profile: &'a Profile, currency: Option<&'a str>) -> Self {
        Self {
            taxonomy,
            profile,
            currency,
        }
    }

    /// Unit type a concept's unit must have
    fn expected_type(concept: &Concept) -> Option<&str> {
        if concept.data_type.is_monetary() {
            Some(MONETARY_UNIT_TYPE)
        } else {
            concept.unit_type.as_deref()
        }
    }

    /// Run the cascade
    ///
    /// Rejected candidates are recorded as warnings; `None` means every step
    /// failed and the caller should report the value as unresolved.
    pub fn resolve(
        &self,
        concept: &Concept,
        explicit: Option<&str>,
        provenance: Option<&Provenance>,
        diagnostics: &mut Diagnostics,
    ) -> Option<(Unit, UnitSource)> {
        let text_steps = [
            (explicit.filter(|t| !t.trim().is_empty()), UnitSource::Explicit),
            (self.profile.concept_units.get(&concept.name).map(String::as_str), UnitSource::ConceptDefault),
            (concept.sole_required_unit(), UnitSource::RequiredUnit),
            (
                Self::expected_type(concept).and_then(|t| self.profile.unit_type_units.get(t)).map(String::as_str),
                UnitSource::UnitTypeDefault,
            ),
        ];
        for (text, source) in text_steps {
            let Some(text) = text else { continue };
            match self.lookup(concept, text) {
                Lookup::Unit(unit) => return Some((unit, source)),
                Lookup::Workaround(unit, note) => {
                    diagnostics.push(
                        Diagnostic::new(Category::UnitWorkaround, note)
                            .with_provenance(provenance.cloned())
                            .with_concept(&concept.name),
                    );
                    return Some((unit, source));
                }
                Lookup::Rejected(category, message) => diagnostics.push(
                    Diagnostic::new(category, format!("{source}: {message}"))
                        .with_provenance(provenance.cloned())
                        .with_concept(&concept.name),
                ),
            }
        }

        if concept.data_type.is_monetary() {
            if let Some(code) = self.currency {
                return Some((Unit::simple(Measure::currency(code)), UnitSource::ReportCurrency));
            }
        } else if concept.unit_type.as_deref().map_or(true, |t| t == PURE_UNIT_TYPE) {
            return Some((Unit::simple(Measure::pure()), UnitSource::Pure));
        }
        None
    }

    fn lookup(&self, concept: &Concept, text: &str) -> Lookup {
        let text = text.trim();
        if let Some(complex) = self.profile.complex_units.get(text) {
            return self.complex(concept, text, complex);
        }
        let units = self.taxonomy.units();
        match units.resolve(text) {
            UnitLookup::Found(measure) => self.check(concept, measure, None),
            UnitLookup::Ambiguous(candidates) => {
                let list: Vec<String> = candidates.iter().map(Measure::qualified).collect();
                Lookup::Rejected(
                    Category::AmbiguousUnit,
                    format!("unit '{text}' matches several units: {}", list.join(", ")),
                )
            }
            UnitLookup::NotFound => {
                if let Some(unit) = self.ratio(text) {
                    return self.check_compound(concept, text, unit);
                }
                let replaced = self
                    .profile
                    .unit_replacements
                    .iter()
                    .fold(text.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to));
                if replaced != text {
                    if let UnitLookup::Found(measure) = units.resolve(&replaced) {
                        return self.check(concept, measure, Some(format!("unit '{text}' read as '{replaced}'")));
                    }
                }
                Lookup::Rejected(Category::UnrecognisedUnit, format!("unit '{text}' is not recognised"))
            }
        }
    }

    /// Accept `measure` if its unit type fits the concept
    fn check(&self, concept: &Concept, measure: Measure, note: Option<String>) -> Lookup {
        let units = self.taxonomy.units();
        let expected = Self::expected_type(concept);
        if !units.valid_for(expected, &measure) {
            return Lookup::Rejected(
                Category::UnitTypeMismatch,
                format!(
                    "unit {measure} ({}) does not fit {} ({})",
                    units.unit_type(&measure).unwrap_or("unknown type"),
                    concept.name,
                    expected.unwrap_or("untyped")
                ),
            );
        }
        let unit = Unit::simple(measure);
        match note {
            Some(note) => Lookup::Workaround(unit, note),
            None => Lookup::Unit(unit),
        }
    }

    /// Accept a divide unit unless the concept is measured in single units
    fn check_compound(&self, concept: &Concept, text: &str, unit: Unit) -> Lookup {
        match Self::expected_type(concept) {
            Some(expected) if self.taxonomy.units().is_measure_type(expected) => Lookup::Rejected(
                Category::UnitTypeMismatch,
                format!("ratio unit '{text}' does not fit {} ({expected})", concept.name),
            ),
            _ => Lookup::Unit(unit),
        }
    }

    /// `numerator/denominator` unit text such as `EUR/MWh`
    fn ratio(&self, text: &str) -> Option<Unit> {
        let (numerator, denominator) = text.split_once('/')?;
        let units = self.taxonomy.units();
        let numerator = units.resolve(numerator).found()?;
        let denominator = units.resolve(denominator).found()?;
        Some(Unit::divide(vec![numerator], vec![denominator]))
    }

    fn complex(&self, concept: &Concept, id: &str, complex: &ComplexUnit) -> Lookup {
        let units = self.taxonomy.units();
        let resolve = |texts: &[String]| -> Result<Vec<Measure>, String> {
            texts
                .iter()
                .map(|t| units.resolve(t).found().ok_or_else(|| t.clone()))
                .collect()
        };
        match (resolve(complex.numerator.as_slice()), resolve(complex.denominator.as_slice())) {
            (Ok(numerator), Ok(denominator)) => self.check_compound(concept, id, Unit::divide(numerator, denominator)),
            (Err(unknown), _) | (_, Err(unknown)) => Lookup::Rejected(
                Category::UnrecognisedUnit,
                format!("complex unit '{id}' refers to unknown unit '{unknown}'"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mireport_model::Severity;
    use mireport_taxonomy::{DataType, PeriodType, UnitDefinition};

    fn taxonomy() -> Taxonomy {
        Taxonomy::builder("test.xsd")
            .unit("MWh", UnitDefinition::new("energy"))
            .unit("GJ", UnitDefinition::new("energy"))
            .unit("tCO2e", UnitDefinition::new("ghgEmissions"))
            .concept(Concept::new("EnergyConsumption", DataType::Decimal, PeriodType::Duration).with_unit_type("energy"))
            .concept(
                Concept::new("Scope1Emissions", DataType::Decimal, PeriodType::Duration)
                    .with_unit_type("ghgEmissions")
                    .with_required_unit("tCO2e"),
            )
            .concept(Concept::new("Revenue", DataType::Monetary, PeriodType::Duration))
            .concept(Concept::new("NumberOfEmployees", DataType::Integer, PeriodType::Instant).with_unit_type("pure"))
            .concept(Concept::new("EnergyIntensity", DataType::Decimal, PeriodType::Duration).with_unit_type("intensity"))
            .build()
            .unwrap()
    }

    fn resolve(profile: &Profile, concept: &str, explicit: Option<&str>) -> (Option<(Unit, UnitSource)>, Diagnostics) {
        let t = taxonomy();
        let mut diagnostics = Diagnostics::new();
        let concept = t.lookup(concept).unwrap();
        let result = UnitResolver::new(&t, profile, Some("EUR")).resolve(concept, explicit, None, &mut diagnostics);
        (result, diagnostics)
    }

    fn mwh() -> Unit {
        Unit::simple(Measure::new("utr", "MWh"))
    }

    #[test]
    fn explicit_short_and_namespaced_agree() {
        let profile = Profile::default();
        let (short, _) = resolve(&profile, "EnergyConsumption", Some("MWh"));
        let (long, _) = resolve(&profile, "EnergyConsumption", Some("utr:MWh"));
        assert_eq!(short, long);
        assert_eq!(short, Some((mwh(), UnitSource::Explicit)));
    }

    #[test]
    fn profile_default_when_no_explicit_unit() {
        let profile = Profile::default().with_concept_unit("EnergyConsumption", "MWh");
        let (result, diagnostics) = resolve(&profile, "EnergyConsumption", None);
        assert_eq!(result, Some((mwh(), UnitSource::ConceptDefault)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn mismatched_explicit_unit_falls_through() {
        let (result, diagnostics) = resolve(&Profile::default(), "Scope1Emissions", Some("MWh"));
        assert_eq!(result, Some((Unit::simple(Measure::new("utr", "tCO2e")), UnitSource::RequiredUnit)));
        assert_eq!(diagnostics.by_category(Category::UnitTypeMismatch).count(), 1);
        assert_eq!(diagnostics.count(Severity::Warning), 1);
    }

    #[test]
    fn unrecognised_and_ambiguous_text_warn() {
        let profile = Profile::default().with_unit_type_unit("energy", "GJ");
        let (result, diagnostics) = resolve(&profile, "EnergyConsumption", Some("furlongs"));
        assert_eq!(result, Some((Unit::simple(Measure::new("utr", "GJ")), UnitSource::UnitTypeDefault)));
        assert_eq!(diagnostics.by_category(Category::UnrecognisedUnit).count(), 1);

        let (_, diagnostics) = resolve(&profile, "EnergyConsumption", Some("Energy (MWh) or (GJ)"));
        assert_eq!(diagnostics.by_category(Category::AmbiguousUnit).count(), 1);
    }

    #[test]
    fn replacement_is_a_workaround() {
        let profile = Profile::default().with_unit_replacement("Megawatt hours", "MWh");
        let (result, diagnostics) = resolve(&profile, "EnergyConsumption", Some("Megawatt hours"));
        assert_eq!(result, Some((mwh(), UnitSource::Explicit)));
        assert_eq!(diagnostics.by_category(Category::UnitWorkaround).count(), 1);
    }

    #[test]
    fn monetary_uses_report_currency_and_pure_is_last_resort() {
        let (result, _) = resolve(&Profile::default(), "Revenue", None);
        assert_eq!(result, Some((Unit::simple(Measure::currency("EUR")), UnitSource::ReportCurrency)));
        let (result, _) = resolve(&Profile::default(), "NumberOfEmployees", None);
        assert_eq!(result, Some((Unit::simple(Measure::pure()), UnitSource::Pure)));
        let (result, _) = resolve(&Profile::default(), "EnergyConsumption", None);
        assert_eq!(result, None);
    }

    #[test]
    fn complex_and_ratio_units() {
        let profile = Profile::default()
            .with_concept_unit("EnergyIntensity", "EURperMWh")
            .with_complex_unit("EURperMWh", ComplexUnit::new(["EUR"], ["MWh"]));
        let expected = Unit::divide(vec![Measure::currency("EUR")], vec![Measure::new("utr", "MWh")]);
        let (result, _) = resolve(&profile, "EnergyIntensity", None);
        assert_eq!(result, Some((expected.clone(), UnitSource::ConceptDefault)));
        let (result, _) = resolve(&Profile::default(), "EnergyIntensity", Some("EUR/MWh"));
        assert_eq!(result, Some((expected, UnitSource::Explicit)));
    }

    #[test]
    fn ratio_units_only_fit_ratio_typed_concepts() {
        let (result, diagnostics) = resolve(&Profile::default(), "EnergyConsumption", Some("MWh/GJ"));
        assert_eq!(result, None);
        assert_eq!(diagnostics.by_category(Category::UnitTypeMismatch).count(), 1);

        let (result, diagnostics) = resolve(&Profile::default(), "NumberOfEmployees", Some("MWh/GJ"));
        assert_eq!(result, Some((Unit::simple(Measure::pure()), UnitSource::Pure)));
        assert_eq!(diagnostics.by_category(Category::UnitTypeMismatch).count(), 1);

        let profile = Profile::default()
            .with_concept_unit("Revenue", "EURperMWh")
            .with_complex_unit("EURperMWh", ComplexUnit::new(["EUR"], ["MWh"]));
        let (result, diagnostics) = resolve(&profile, "Revenue", None);
        assert_eq!(result, Some((Unit::simple(Measure::currency("EUR")), UnitSource::ReportCurrency)));
        assert_eq!(diagnostics.by_category(Category::UnitTypeMismatch).count(), 1);
    }
}
