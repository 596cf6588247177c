//! The incident-store capability.
//!
//! A narrow, injected interface over the durable incident records, replacing
//! the ambient connection-per-call the controller would otherwise reach for.
//! The production implementation is [`crate::db::incidents::PgIncidentStore`];
//! tests drive the controller against an in-memory fake.
//!
//! Mutating operations return the refreshed record so callers render from
//! stored state, never from the fields they just changed.

use std::future::Future;

use incidentbot_core::{ChannelId, Incident, IncidentId, SevLevel, SlackUserId};

use crate::db::RepositoryError;

/// Abstract persistence capability for incident records.
pub trait IncidentStore: Send + Sync {
    /// Insert a new open incident with only its name, returning the assigned
    /// id. The record stays invisible to all read paths until
    /// [`attach_channel`](Self::attach_channel) runs.
    fn insert(&self, name: &str) -> impl Future<Output = Result<IncidentId, RepositoryError>> + Send;

    /// Attach the provisioned channel plus initial commander and severity to
    /// a freshly inserted record, returning the full incident.
    fn attach_channel(
        &self,
        id: IncidentId,
        channel: &ChannelId,
        commander: Option<&SlackUserId>,
        sev_level: SevLevel,
    ) -> impl Future<Output = Result<Incident, RepositoryError>> + Send;

    /// Look up the incident addressed by a channel.
    fn get(
        &self,
        channel: &ChannelId,
    ) -> impl Future<Output = Result<Option<Incident>, RepositoryError>> + Send;

    /// Update the severity, returning the refreshed record, or `None` when
    /// no incident matches the channel.
    fn set_severity(
        &self,
        channel: &ChannelId,
        sev_level: SevLevel,
    ) -> impl Future<Output = Result<Option<Incident>, RepositoryError>> + Send;

    /// Update the commander, returning the refreshed record, or `None` when
    /// no incident matches the channel.
    fn set_commander(
        &self,
        channel: &ChannelId,
        commander: &SlackUserId,
    ) -> impl Future<Output = Result<Option<Incident>, RepositoryError>> + Send;

    /// Set the state to closed (a no-op on an already-closed incident),
    /// returning the refreshed record, or `None` when no incident matches
    /// the channel.
    fn close(
        &self,
        channel: &ChannelId,
    ) -> impl Future<Output = Result<Option<Incident>, RepositoryError>> + Send;

    /// All open, provisioned incidents, oldest first.
    fn list_open(&self) -> impl Future<Output = Result<Vec<Incident>, RepositoryError>> + Send;
}
