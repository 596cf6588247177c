//! Database operations for incident records.
//!
//! Every read path filters `channel_id IS NOT NULL`: a row between the
//! name-only insert and channel attachment is transient and must not be
//! addressable, and an orphaned row left by an aborted declare stays
//! invisible for the same reason.
//!
//! Mutations use `UPDATE ... RETURNING` so the caller always renders from
//! the row as committed, not from the fields it just sent.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use incidentbot_core::{
    ChannelId, Incident, IncidentId, IncidentState, SevLevel, SlackUserId,
};

use super::RepositoryError;
use crate::store::IncidentStore;

/// Columns fetched for every full-record read.
const INCIDENT_COLUMNS: &str = "id, name, channel_id, commander, sev_level, state, created_at";

/// A raw `incidents` row.
///
/// `channel_id` and `sev_level` are nullable in the schema (they are absent
/// during the declare window); conversion to [`Incident`] requires both and
/// reports anything else as corruption, since read queries only match
/// provisioned rows.
#[derive(Debug, Clone, sqlx::FromRow)]
struct IncidentRow {
    id: i64,
    name: String,
    channel_id: Option<String>,
    commander: Option<String>,
    sev_level: Option<i32>,
    state: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<IncidentRow> for Incident {
    type Error = RepositoryError;

    fn try_from(row: IncidentRow) -> Result<Self, Self::Error> {
        let channel_id = row
            .channel_id
            .map(ChannelId::new)
            .ok_or_else(|| corruption(row.id, "provisioned row missing channel_id"))?;

        let sev_level = row
            .sev_level
            .ok_or_else(|| corruption(row.id, "provisioned row missing sev_level"))
            .and_then(|level| {
                SevLevel::try_from(i64::from(level))
                    .map_err(|e| corruption(row.id, &e.to_string()))
            })?;

        let state = IncidentState::parse(&row.state)
            .ok_or_else(|| corruption(row.id, &format!("unknown state {:?}", row.state)))?;

        Ok(Self {
            id: IncidentId::new(row.id),
            name: row.name,
            channel_id,
            commander: row.commander.map(SlackUserId::new),
            sev_level,
            state,
            created_at: row.created_at,
        })
    }
}

fn corruption(id: i64, detail: &str) -> RepositoryError {
    RepositoryError::DataCorruption(format!("incident {id}: {detail}"))
}

/// `PostgreSQL`-backed implementation of the [`IncidentStore`] capability.
#[derive(Debug, Clone)]
pub struct PgIncidentStore {
    pool: PgPool,
}

impl PgIncidentStore {
    /// Create a store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl IncidentStore for PgIncidentStore {
    #[instrument(skip(self, name))]
    async fn insert(&self, name: &str) -> Result<IncidentId, RepositoryError> {
        let id: i64 = sqlx::query_scalar("INSERT INTO incidents (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        debug!(id, "Inserted incident");
        Ok(IncidentId::new(id))
    }

    #[instrument(skip(self, commander), fields(id = %id, channel = %channel))]
    async fn attach_channel(
        &self,
        id: IncidentId,
        channel: &ChannelId,
        commander: Option<&SlackUserId>,
        sev_level: SevLevel,
    ) -> Result<Incident, RepositoryError> {
        let row: Option<IncidentRow> = sqlx::query_as(&format!(
            "UPDATE incidents
             SET channel_id = $2, commander = $3, sev_level = $4
             WHERE id = $1
             RETURNING {INCIDENT_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(channel.as_str())
        .bind(commander.map(SlackUserId::as_str))
        .bind(i32::from(sev_level.as_i16()))
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    #[instrument(skip(self), fields(channel = %channel))]
    async fn get(&self, channel: &ChannelId) -> Result<Option<Incident>, RepositoryError> {
        let row: Option<IncidentRow> = sqlx::query_as(&format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents WHERE channel_id = $1"
        ))
        .bind(channel.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Incident::try_from).transpose()
    }

    #[instrument(skip(self), fields(channel = %channel, sev = %sev_level))]
    async fn set_severity(
        &self,
        channel: &ChannelId,
        sev_level: SevLevel,
    ) -> Result<Option<Incident>, RepositoryError> {
        let row: Option<IncidentRow> = sqlx::query_as(&format!(
            "UPDATE incidents SET sev_level = $2
             WHERE channel_id = $1
             RETURNING {INCIDENT_COLUMNS}"
        ))
        .bind(channel.as_str())
        .bind(i32::from(sev_level.as_i16()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Incident::try_from).transpose()
    }

    #[instrument(skip(self, commander), fields(channel = %channel))]
    async fn set_commander(
        &self,
        channel: &ChannelId,
        commander: &SlackUserId,
    ) -> Result<Option<Incident>, RepositoryError> {
        let row: Option<IncidentRow> = sqlx::query_as(&format!(
            "UPDATE incidents SET commander = $2
             WHERE channel_id = $1
             RETURNING {INCIDENT_COLUMNS}"
        ))
        .bind(channel.as_str())
        .bind(commander.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Incident::try_from).transpose()
    }

    #[instrument(skip(self), fields(channel = %channel))]
    async fn close(&self, channel: &ChannelId) -> Result<Option<Incident>, RepositoryError> {
        let row: Option<IncidentRow> = sqlx::query_as(&format!(
            "UPDATE incidents SET state = 'closed'
             WHERE channel_id = $1
             RETURNING {INCIDENT_COLUMNS}"
        ))
        .bind(channel.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Incident::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_open(&self) -> Result<Vec<Incident>, RepositoryError> {
        let rows: Vec<IncidentRow> = sqlx::query_as(&format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents
             WHERE state = 'open' AND channel_id IS NOT NULL
             ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Incident::try_from).collect()
    }
}
