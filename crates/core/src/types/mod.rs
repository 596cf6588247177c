//! Core type definitions.
//!
//! - [`id`] - Type-safe identifier newtypes
//! - [`user`] - Slack user identifiers and mention-token parsing
//! - [`severity`] - Incident severity levels
//! - [`status`] - Incident lifecycle states
//! - [`incident`] - The incident record and channel-name derivation

pub mod id;
pub mod incident;
pub mod severity;
pub mod status;
pub mod user;

pub use id::{ChannelId, IncidentId};
pub use incident::{Incident, channel_name, slug};
pub use severity::{SevLevel, SevLevelError};
pub use status::IncidentState;
pub use user::{SlackUserId, UserRefError};
