//! Newtype identifiers for type-safe entity references.
//!
//! Incident ids are database-assigned integers; channel ids are opaque
//! strings handed out by Slack (`C…`). Keeping them as distinct types
//! prevents accidentally addressing an incident by the wrong key.

use serde::{Deserialize, Serialize};

/// Identifier of an incident record, assigned by the store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentId(i64);

impl IncidentId {
    /// Create an ID from an i64 value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for IncidentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for IncidentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<IncidentId> for i64 {
    fn from(id: IncidentId) -> Self {
        id.0
    }
}

/// Identifier of a provisioned Slack channel.
///
/// Set exactly once per incident, immediately after the discussion channel is
/// created. All post-declaration operations address the incident by this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Wrap a raw Slack channel id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw channel id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
