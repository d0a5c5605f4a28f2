//! Report metadata resolution
//!
//! Turns the input's raw metadata into the entity identifier, period
//! registry, currency and locale used by the engine. Problems are recorded
//! as `InvalidMetadata` diagnostics; missing required pieces are left as
//! `None` for the assembler's completeness gate.

use crate::coerce::parse_date;
use crate::profile::Profile;
use chrono::{Datelike, NaiveDate};
use mireport_adapters::{RawMetadata, RawPeriod};
use mireport_model::{Category, Diagnostic, Diagnostics, EntityIdentifier, PeriodRegistry, PeriodSpan, Severity};
use mireport_taxonomy::Taxonomy;
use serde_json::Value;

/// Locale used when neither input, profile nor taxonomy name one
pub const FALLBACK_LOCALE: &str = "en";

/// Metadata ready for the engine and assembler
#[derive(Debug, Clone, Default)]
pub struct ResolvedMetadata {
    /// Reporting entity, if identifier and scheme are both known
    pub entity: Option<EntityIdentifier>,
    /// Entity display name
    pub entity_name: Option<String>,
    /// Report title
    pub title: Option<String>,
    /// Report subtitle
    pub subtitle: Option<String>,
    /// Report currency (input, else profile default)
    pub currency: Option<String>,
    /// Normalised locale
    pub locale: String,
    /// Registered periods
    pub periods: PeriodRegistry,
}

/// Normalise a locale tag: `en_gb` -> `en-GB`
#[must_use]
pub fn normalise_locale(tag: &str) -> Option<String> {
    let mut parts = tag.trim().split(['-', '_']).filter(|p| !p.is_empty());
    let language = parts.next()?;
    if !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut out = language.to_ascii_lowercase();
    for part in parts {
        out.push('-');
        if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
            out.push_str(&part.to_ascii_uppercase());
        } else {
            out.push_str(part);
        }
    }
    Some(out)
}

/// Same month and day in another year; 29 February becomes the 28th
fn with_year(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), date.day() - 1))
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolves raw metadata against the profile and taxonomy
#[derive(Debug)]
pub struct MetadataResolver<'a> {
    taxonomy: &'a Taxonomy,
    profile: &'a Profile,
}

impl<'a> MetadataResolver<'a> {
    /// Create resolver
    #[inline]
    #[must_use]
    pub fn new(taxonomy: &'a Taxonomy, profile: &'a Profile) -> Self {
        Self { taxonomy, profile }
    }

    /// Resolve metadata, recording problems in `diagnostics`
    pub fn resolve(&self, raw: &RawMetadata, diagnostics: &mut Diagnostics) -> ResolvedMetadata {
        if let Some(entry_point) = trimmed(raw.entry_point.as_ref()) {
            if entry_point != self.taxonomy.entry_point() {
                diagnostics.push(
                    Diagnostic::new(
                        Category::InvalidMetadata,
                        format!(
                            "input declares entry point '{entry_point}' but '{}' is loaded",
                            self.taxonomy.entry_point()
                        ),
                    )
                    .with_severity(Severity::Warning),
                );
            }
        }

        let mut periods = PeriodRegistry::new();
        if let Some((start, end)) = Self::principal(raw, diagnostics) {
            periods.register_principal(start, end);
        }
        for extra in &raw.periods {
            Self::register_extra(extra, &mut periods, diagnostics);
        }

        ResolvedMetadata {
            entity: self.entity(raw, diagnostics),
            entity_name: trimmed(raw.entity.name.as_ref()),
            title: trimmed(raw.title.as_ref()),
            subtitle: trimmed(raw.subtitle.as_ref()),
            currency: self.currency(raw, diagnostics),
            locale: self.locale(raw, diagnostics),
            periods,
        }
    }

    fn entity(&self, raw: &RawMetadata, diagnostics: &mut Diagnostics) -> Option<EntityIdentifier> {
        let identifier = trimmed(raw.entity.identifier.as_ref())?;
        let scheme = trimmed(raw.entity.identifier_scheme.as_ref())?;
        let uri = match self.profile.scheme_uri(&scheme) {
            Some(uri) => uri.to_string(),
            None if scheme.contains("://") => scheme,
            None => {
                diagnostics.record(
                    Category::InvalidMetadata,
                    format!("identifier scheme '{scheme}' is neither a known alias nor a URI"),
                );
                return None;
            }
        };
        Some(EntityIdentifier::new(uri, identifier))
    }

    fn date(field: &str, value: Option<&Value>, diagnostics: &mut Diagnostics) -> Option<NaiveDate> {
        let value = value?;
        let date = parse_date(value);
        if date.is_none() {
            diagnostics.record(Category::InvalidMetadata, format!("{field} {value} is not a date"));
        }
        date
    }

    fn principal(raw: &RawMetadata, diagnostics: &mut Diagnostics) -> Option<(NaiveDate, NaiveDate)> {
        let start = Self::date("reporting period start", raw.reporting_period.start.as_ref(), diagnostics);
        let end = Self::date("reporting period end", raw.reporting_period.end.as_ref(), diagnostics);
        let (start, end) = (start?, end?);
        if start > end {
            diagnostics.record(
                Category::InvalidMetadata,
                format!("reporting period start {start} is after its end {end}"),
            );
            return None;
        }
        Some((start, end))
    }

    fn register_extra(period: &RawPeriod, periods: &mut PeriodRegistry, diagnostics: &mut Diagnostics) {
        let name = period.name.trim();
        if name.is_empty() {
            diagnostics.record(Category::InvalidMetadata, "named period without a name");
            return;
        }
        let field = format!("period '{name}'");
        let span = if let Some(year) = period.year {
            let Some((start, end)) = periods.principal() else {
                diagnostics.record(
                    Category::InvalidMetadata,
                    format!("{field} is relative to a principal period that is not defined"),
                );
                return;
            };
            // shift the whole principal period so that it ends in `year`
            let shifted = year
                .checked_sub(end.year())
                .and_then(|offset| start.year().checked_add(offset))
                .and_then(|start_year| with_year(start, start_year).zip(with_year(end, year)));
            match shifted {
                Some((start, end)) => PeriodSpan::Duration { start, end },
                None => {
                    diagnostics.record(Category::InvalidMetadata, format!("{field}: year {year} is out of range"));
                    return;
                }
            }
        } else if let Some(instant) = &period.instant {
            let Some(date) = Self::date(&field, Some(instant), diagnostics) else { return };
            PeriodSpan::Instant { date }
        } else {
            let start = Self::date(&field, period.start.as_ref(), diagnostics);
            let end = Self::date(&field, period.end.as_ref(), diagnostics);
            match (start, end) {
                (Some(start), Some(end)) if start <= end => PeriodSpan::Duration { start, end },
                (Some(start), Some(end)) => {
                    diagnostics.record(
                        Category::InvalidMetadata,
                        format!("{field} starts {start}, after its end {end}"),
                    );
                    return;
                }
                _ => {
                    diagnostics.record(Category::InvalidMetadata, format!("{field} needs start and end, an instant or a year"));
                    return;
                }
            }
        };

        let registered = match span {
            PeriodSpan::Duration { start, end } => periods.register_duration(name, start, end),
            instant @ PeriodSpan::Instant { .. } => periods.register(name, instant),
        };
        if !registered {
            diagnostics.record(Category::InvalidMetadata, format!("{field} is already defined"));
        }
    }

    fn currency(&self, raw: &RawMetadata, diagnostics: &mut Diagnostics) -> Option<String> {
        if let Some(code) = trimmed(raw.currency.as_ref()) {
            if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Some(code.to_ascii_uppercase());
            }
            diagnostics.record(
                Category::InvalidMetadata,
                format!("currency '{code}' is not an ISO 4217 code"),
            );
        }
        self.profile.default_currency.as_ref().map(|c| c.to_ascii_uppercase())
    }

    fn locale(&self, raw: &RawMetadata, diagnostics: &mut Diagnostics) -> String {
        if let Some(requested) = trimmed(raw.output_language.as_ref()) {
            match normalise_locale(&requested) {
                Some(locale) => return locale,
                None => diagnostics.record(
                    Category::InvalidMetadata,
                    format!("output language '{requested}' is not a locale"),
                ),
            }
        }
        self.profile
            .default_locale
            .as_deref()
            .or(self.taxonomy.default_language())
            .and_then(normalise_locale)
            .unwrap_or_else(|| FALLBACK_LOCALE.to_string())
    }
}
