//! The incident record and channel-name derivation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ChannelId, IncidentId};
use super::severity::SevLevel;
use super::status::IncidentState;
use super::user::SlackUserId;

/// Description characters considered when deriving the channel-name slug.
const SLUG_MAX_LEN: usize = 40;

/// A tracked operational event with severity, commander, and an associated
/// discussion channel.
///
/// Only fully provisioned incidents are represented: between the initial
/// name-only insert and channel attachment the record exists transiently in
/// the store without a channel, and no read path surfaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Store-assigned identifier, immutable.
    pub id: IncidentId,
    /// Free-text description, set once at declaration.
    pub name: String,
    /// Provisioned discussion channel, unique across incidents.
    pub channel_id: ChannelId,
    /// The user coordinating the response, if one is designated.
    pub commander: Option<SlackUserId>,
    /// Current severity level.
    pub sev_level: SevLevel,
    /// Lifecycle state; transitions one-directionally to `Closed`.
    pub state: IncidentState,
    /// When the incident was declared.
    pub created_at: DateTime<Utc>,
}

impl Incident {
    /// Whether the incident is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == IncidentState::Open
    }
}

/// Slugify an incident description for use in a channel name.
///
/// Considers at most the first 40 characters, lowercases them, and joins the
/// ASCII-alphanumeric runs with single hyphens. No leading or trailing
/// hyphen.
#[must_use]
pub fn slug(name: &str) -> String {
    let truncated: String = name.chars().take(SLUG_MAX_LEN).collect();
    truncated
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|run| !run.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Derive the deterministic channel name for a newly declared incident:
/// `incd-{YYYYMMDD}-{id}-{slug}`.
#[must_use]
pub fn channel_name(date: NaiveDate, id: IncidentId, name: &str) -> String {
    format!("incd-{}-{id}-{}", date.format("%Y%m%d"), slug(name))
}
