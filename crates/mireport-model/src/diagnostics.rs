//! Diagnostics collector
//!
//! Append-only, order-preserving log of data-quality findings. Pushing a
//! diagnostic never fails; callers decide how to react to Fatal entries.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress information
    Info,
    /// Suspicious input that was worked around
    Warning,
    /// Input that was dropped
    Error,
    /// Nothing usable was produced
    Fatal,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// What kind of problem a diagnostic reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Name has no concept in the taxonomy
    UnmappedConcept,
    /// Concept is abstract
    NonReportableConcept,
    /// Value is one of the empty markers
    EmptyValue,
    /// Payload does not fit the concept's data type
    TypeCoercionFailed,
    /// Explicit unit text matched nothing
    UnrecognisedUnit,
    /// Explicit unit text matched several units
    AmbiguousUnit,
    /// Unit found but not valid for the concept
    UnitTypeMismatch,
    /// Unit found only after text replacements
    UnitWorkaround,
    /// No unit cascade step succeeded
    UnresolvedUnit,
    /// Enumeration matched through a fallback label
    EnumerationLabelWorkaround,
    /// Named period is not registered
    UnknownNamedPeriod,
    /// Named period has the wrong period type for the concept
    PeriodTypeMismatch,
    /// Dimension axis or member not allowed
    InvalidDimensionMember,
    /// Required axis without default left unset
    MissingDimension,
    /// Same concept/context/unit reported with a different value
    ConflictingFact,
    /// Table row could not be read
    MalformedRow,
    /// Table has no dimension axis
    UnknownTableAxis,
    /// Report metadata missing or invalid
    InvalidMetadata,
    /// Companion range without its target
    OrphanCompanion,
    /// Named value produced nothing
    UnusedNamedValue,
    /// Conversion summary
    Summary,
    /// Report cannot be produced
    IncompleteReport,
}

impl Category {
    /// Severity this category is reported with
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::EmptyValue | Self::Summary => Severity::Info,
            Self::UnmappedConcept
            | Self::NonReportableConcept
            | Self::UnrecognisedUnit
            | Self::AmbiguousUnit
            | Self::UnitTypeMismatch
            | Self::UnitWorkaround
            | Self::EnumerationLabelWorkaround
            | Self::OrphanCompanion
            | Self::UnusedNamedValue => Severity::Warning,
            Self::TypeCoercionFailed
            | Self::UnresolvedUnit
            | Self::UnknownNamedPeriod
            | Self::PeriodTypeMismatch
            | Self::InvalidDimensionMember
            | Self::MissingDimension
            | Self::ConflictingFact
            | Self::MalformedRow
            | Self::UnknownTableAxis
            | Self::InvalidMetadata => Severity::Error,
            Self::IncompleteReport => Severity::Fatal,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Source location of an input item
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Provenance {
    /// Spreadsheet cell of a named range
    Cell {
        /// Range name
        range: String,
        /// Sheet name
        sheet: String,
        /// 1-based row
        row: u32,
        /// 1-based column
        column: u32,
    },
    /// Key path in structured data (`namedRanges.Foo`)
    Key {
        /// Dotted path
        path: String,
    },
    /// Cell of a table row
    TableCell {
        /// Table name
        table: String,
        /// 1-based row
        row: usize,
        /// Column header
        column: String,
    },
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell { range, sheet, row, column } => {
                write!(f, "{sheet}!R{row}C{column} ({range})")
            }
            Self::Key { path } => write!(f, "{path}"),
            Self::TableCell { table, row, column } => write!(f, "{table}[{row}].{column}"),
        }
    }
}

/// One data-quality finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Category
    pub category: Category,
    /// Human-readable message
    pub message: String,
    /// Where the offending input came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    /// Concept involved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
}

impl Diagnostic {
    /// Create diagnostic with the category's severity
    #[must_use]
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            severity: category.severity(),
            category,
            message: message.into(),
            provenance: None,
            concept: None,
        }
    }

    /// Override severity
    #[inline]
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// With provenance
    #[inline]
    #[must_use]
    pub fn with_provenance(mut self, provenance: Option<Provenance>) -> Self {
        self.provenance = provenance;
        self
    }

    /// With concept name
    #[inline]
    #[must_use]
    pub fn with_concept(mut self, concept: impl Into<String>) -> Self {
        self.concept = Some(concept.into());
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;
        if let Some(p) = &self.provenance {
            write!(f, " at {p}")?;
        }
        Ok(())
    }
}

/// Ordered diagnostics log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic, mirroring it to tracing
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => tracing::debug!(category = %diagnostic.category, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(category = %diagnostic.category, "{}", diagnostic.message),
            Severity::Error | Severity::Fatal => {
                tracing::error!(category = %diagnostic.category, "{}", diagnostic.message);
            }
        }
        self.entries.push(diagnostic);
    }

    /// Shorthand for `push(Diagnostic::new(..))`
    pub fn record(&mut self, category: Category, message: impl Into<String>) {
        self.push(Diagnostic::new(category, message));
    }

    /// Append all entries of another log
    pub fn extend(&mut self, other: Diagnostics) {
        for d in other.entries {
            self.push(d);
        }
    }

    /// Entries with the given severity, in insertion order
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    /// Entries with the given category, in insertion order
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.category == category)
    }

    /// Number of entries with the given severity
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity(severity).count()
    }

    /// Whether any Error or Fatal entry exists
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity >= Severity::Error)
    }

    /// Whether any Fatal entry exists
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Fatal)
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume into the underlying vector
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
