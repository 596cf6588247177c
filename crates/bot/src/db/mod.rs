//! Database operations for the incident store (`PostgreSQL`).
//!
//! ## Tables
//!
//! - `incidents` - Incident records, addressable by provisioned channel id
//! - `installations` - Opaque Slack OAuth installation blobs, schema only
//!   (reserved for a future OAuth flow; the bot authenticates with a static
//!   token)
//!
//! # Migrations
//!
//! Migrations live in `crates/bot/migrations/` and run at startup via
//! `sqlx::migrate!`.

pub mod incidents;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use incidents::PgIncidentStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
