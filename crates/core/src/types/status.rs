//! Incident lifecycle states.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an incident.
///
/// Transitions are one-directional: `Open` → `Closed`. There is no reopening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IncidentState {
    #[default]
    Open,
    Closed,
}

impl IncidentState {
    /// Stored string form (`"open"` / `"closed"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for IncidentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_round_trip() {
        assert_eq!(IncidentState::parse("open"), Some(IncidentState::Open));
        assert_eq!(IncidentState::parse("closed"), Some(IncidentState::Closed));
        assert_eq!(IncidentState::parse("OPEN"), None);
        assert_eq!(IncidentState::Open.as_str(), "open");
    }
}
