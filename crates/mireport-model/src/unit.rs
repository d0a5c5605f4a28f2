//! Measurement units of numeric facts

use mireport_taxonomy::Measure;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Unit of a numeric or monetary fact
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Unit {
    /// Single canonical measure (`utr:MWh`)
    Measure {
        /// The measure
        measure: Measure,
    },
    /// Ratio of measure products (`iso4217:EUR / utr:MWh`)
    Divide {
        /// Numerator measures
        numerator: Vec<Measure>,
        /// Denominator measures
        denominator: Vec<Measure>,
    },
}

impl Unit {
    /// Simple unit
    #[inline]
    #[must_use]
    pub fn simple(measure: Measure) -> Self {
        Self::Measure { measure }
    }

    /// Divide unit; measure lists are sorted so equal products intern once
    #[must_use]
    pub fn divide(mut numerator: Vec<Measure>, mut denominator: Vec<Measure>) -> Self {
        numerator.sort();
        denominator.sort();
        Self::Divide {
            numerator,
            denominator,
        }
    }

    /// The measure of a simple unit
    #[inline]
    #[must_use]
    pub fn as_measure(&self) -> Option<&Measure> {
        match self {
            Self::Measure { measure } => Some(measure),
            Self::Divide { .. } => None,
        }
    }
}

impl From<Measure> for Unit {
    fn from(measure: Measure) -> Self {
        Self::simple(measure)
    }
}

fn join(measures: &[Measure]) -> String {
    measures.iter().map(Measure::qualified).collect::<Vec<_>>().join("*")
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Measure { measure } => write!(f, "{measure}"),
            Self::Divide {
                numerator,
                denominator,
            } => write!(f, "{}/{}", join(numerator), join(denominator)),
        }
    }
}
