//! Bot configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `SLACK_BOT_TOKEN` - Slack bot token (xoxb-...)
//! - `SLACK_SIGNING_SECRET` - Slack app signing secret
//! - `INCIDENT_BROADCAST_CHANNEL` - Channel ID that receives every incident
//!   announcement
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use incidentbot_core::ChannelId;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Bot application configuration.
#[derive(Clone)]
pub struct BotConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Slack API credentials
    pub slack: SlackConfig,
    /// Channel that receives the summary announcement for every declared
    /// incident
    pub broadcast_channel: ChannelId,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("slack", &self.slack)
            .field("broadcast_channel", &self.broadcast_channel)
            .field("sentry_dsn", &self.sentry_dsn)
            .finish_non_exhaustive()
    }
}

/// Slack API configuration.
///
/// Implements `Debug` manually to redact the credentials.
#[derive(Clone)]
pub struct SlackConfig {
    /// Bot token used for Web API calls
    pub bot_token: SecretString,
    /// Signing secret used to verify inbound webhooks
    pub signing_secret: SecretString,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("signing_secret", &"[REDACTED]")
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?.into();
        let bot_token = required("SLACK_BOT_TOKEN")?.into();
        let signing_secret = required("SLACK_SIGNING_SECRET")?.into();
        let broadcast_channel = ChannelId::new(required("INCIDENT_BROADCAST_CHANNEL")?);

        let host = optional("HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".into(), e.to_string()))?;

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidEnvVar("PORT".into(), e.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url,
            host,
            port,
            slack: SlackConfig {
                bot_token,
                signing_secret,
            },
            broadcast_channel,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
