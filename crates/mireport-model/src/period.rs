//! Reporting periods
//!
//! Periods are registered by name before any fact may refer to them.

use chrono::NaiveDate;
use indexmap::IndexMap;
use mireport_taxonomy::PeriodType;
use serde::{Deserialize, Serialize};

/// Name of the principal (duration) reporting period
pub const PRINCIPAL_PERIOD: &str = "cur";

/// Name of the default "as of" instant (end of the principal period)
pub const AS_OF_PERIOD: &str = "cur_end";

/// Instant date or start/end range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PeriodSpan {
    /// Single date
    Instant {
        /// The date
        date: NaiveDate,
    },
    /// Inclusive range
    Duration {
        /// First day
        start: NaiveDate,
        /// Last day
        end: NaiveDate,
    },
}

impl PeriodSpan {
    /// Matching period type
    #[inline]
    #[must_use]
    pub fn period_type(&self) -> PeriodType {
        match self {
            Self::Instant { .. } => PeriodType::Instant,
            Self::Duration { .. } => PeriodType::Duration,
        }
    }
}

/// Named period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Registration name
    pub name: String,
    /// Span
    #[serde(flatten)]
    pub span: PeriodSpan,
}

/// Registered periods, in registration order
#[derive(Debug, Clone, Default)]
pub struct PeriodRegistry {
    periods: IndexMap<String, PeriodSpan>,
}

impl PeriodRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a period
    ///
    /// Returns `false` (and keeps the existing span) if the name is taken.
    pub fn register(&mut self, name: impl Into<String>, span: PeriodSpan) -> bool {
        let name = name.into();
        if self.periods.contains_key(&name) {
            return false;
        }
        self.periods.insert(name, span);
        true
    }

    /// Register a duration and its closing instant `<name>_end`
    ///
    /// Returns `false` if the duration name is taken.
    pub fn register_duration(&mut self, name: &str, start: NaiveDate, end: NaiveDate) -> bool {
        if !self.register(name, PeriodSpan::Duration { start, end }) {
            return false;
        }
        self.register(format!("{name}_end"), PeriodSpan::Instant { date: end });
        true
    }

    /// Register the principal duration and its closing instant
    pub fn register_principal(&mut self, start: NaiveDate, end: NaiveDate) {
        self.register_duration(PRINCIPAL_PERIOD, start, end);
    }

    /// Look up a period span
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PeriodSpan> {
        self.periods.get(name)
    }

    /// Whether a name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.periods.contains_key(name)
    }

    /// The principal period, if registered
    #[must_use]
    pub fn principal(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self.periods.get(PRINCIPAL_PERIOD) {
            Some(PeriodSpan::Duration { start, end }) => Some((*start, *end)),
            _ => None,
        }
    }

    /// Default period name for a period type
    #[inline]
    #[must_use]
    pub fn default_for(period_type: PeriodType) -> &'static str {
        match period_type {
            PeriodType::Instant => AS_OF_PERIOD,
            PeriodType::Duration => PRINCIPAL_PERIOD,
        }
    }

    /// Number of periods
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether no periods are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// All periods in registration order
    #[must_use]
    pub fn to_vec(&self) -> Vec<Period> {
        self.periods
            .iter()
            .map(|(name, span)| Period {
                name: name.clone(),
                span: *span,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn principal_registers_duration_and_instant() {
        let mut periods = PeriodRegistry::new();
        periods.register_principal(d(2024, 1, 1), d(2024, 12, 31));
        assert_eq!(periods.principal(), Some((d(2024, 1, 1), d(2024, 12, 31))));
        assert_eq!(
            periods.get(AS_OF_PERIOD),
            Some(&PeriodSpan::Instant { date: d(2024, 12, 31) })
        );
        assert_eq!(PeriodRegistry::default_for(PeriodType::Instant), AS_OF_PERIOD);
        assert_eq!(PeriodRegistry::default_for(PeriodType::Duration), PRINCIPAL_PERIOD);
    }

    #[test]
    fn durations_get_closing_instant() {
        let mut periods = PeriodRegistry::new();
        assert!(periods.register_duration("prev", d(2023, 1, 1), d(2023, 12, 31)));
        assert_eq!(periods.get("prev_end"), Some(&PeriodSpan::Instant { date: d(2023, 12, 31) }));
        assert!(!periods.register_duration("prev", d(2022, 1, 1), d(2022, 12, 31)));
    }

    #[test]
    fn first_registration_wins() {
        let mut periods = PeriodRegistry::new();
        assert!(periods.register("prev", PeriodSpan::Instant { date: d(2023, 12, 31) }));
        assert!(!periods.register("prev", PeriodSpan::Instant { date: d(2022, 12, 31) }));
        assert_eq!(periods.get("prev").unwrap().period_type(), PeriodType::Instant);
        assert_eq!(periods.len(), 1);
    }
}
