//! Incident severity levels.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A severity value outside the accepted 1–3 range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("severity must be between 1 and 3, got {0:?}")]
pub struct SevLevelError(pub String);

/// Incident severity, SEV 1 (highest) through SEV 3 (lowest).
///
/// The closed enum makes the 1–3 invariant structural: a stored or parsed
/// severity outside the range cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum SevLevel {
    Sev1,
    Sev2,
    Sev3,
}

impl SevLevel {
    /// Get the numeric level (1, 2, or 3).
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Sev1 => 1,
            Self::Sev2 => 2,
            Self::Sev3 => 3,
        }
    }
}

impl std::fmt::Display for SevLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i16())
    }
}

impl TryFrom<i64> for SevLevel {
    type Error = SevLevelError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Self::Sev1),
            2 => Ok(Self::Sev2),
            3 => Ok(Self::Sev3),
            other => Err(SevLevelError(other.to_string())),
        }
    }
}

impl From<SevLevel> for i64 {
    fn from(level: SevLevel) -> Self {
        Self::from(level.as_i16())
    }
}

impl std::str::FromStr for SevLevel {
    type Err = SevLevelError;

    /// Parse a raw chat argument (`"1"`, `"2"`, `"3"`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| SevLevelError(raw.to_string()))
            .and_then(Self::try_from)
    }
}
