//! Slack user identifiers and mention-token parsing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A commander argument that does not look like a user reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a recognizable user reference: {0}")]
pub struct UserRefError(pub String);

/// A Slack user id (`U…` or `W…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlackUserId(String);

impl SlackUserId {
    /// Wrap a raw Slack user id without validation.
    ///
    /// Used for ids Slack itself handed us (event payloads, users-select
    /// values), which are trusted as-is.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse a free-text user reference into a bare user id.
    ///
    /// Accepted forms:
    /// - a mention token `<@U123>` or `<@U123|display-name>` (only the
    ///   identifier portion is retained)
    /// - a raw id with the Slack user-id prefix, `U…` or `W…`
    ///
    /// Anything else is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`UserRefError`] when the argument is not a recognizable user
    /// reference.
    pub fn parse_reference(raw: &str) -> Result<Self, UserRefError> {
        let raw = raw.trim();

        if let Some(token) = raw.strip_prefix("<@") {
            let inner = token.strip_suffix('>').unwrap_or(token);
            let id = inner.split('|').next().unwrap_or_default();
            if id.is_empty() {
                return Err(UserRefError(raw.to_string()));
            }
            return Ok(Self(id.to_string()));
        }

        if raw.len() > 1
            && (raw.starts_with('U') || raw.starts_with('W'))
            && raw.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Ok(Self(raw.to_string()));
        }

        Err(UserRefError(raw.to_string()))
    }

    /// Get the raw user id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render as a Slack mention token (`<@U123>`).
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl std::fmt::Display for SlackUserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SlackUserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
