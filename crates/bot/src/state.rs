//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::BotConfig;
use crate::db::PgIncidentStore;
use crate::services::IncidentService;
use crate::slack::SlackClient;

/// The concrete lifecycle controller the HTTP surface drives.
pub type Controller = IncidentService<PgIncidentStore, SlackClient>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    slack: SlackClient,
    service: Controller,
}

impl AppState {
    /// Build the state: Slack client and lifecycle controller over the pool.
    #[must_use]
    pub fn new(config: &BotConfig, pool: PgPool) -> Self {
        let slack = SlackClient::new(&config.slack);
        let service = IncidentService::new(
            PgIncidentStore::new(pool.clone()),
            slack.clone(),
            config.broadcast_channel.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                pool,
                slack,
                service,
            }),
        }
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Slack client (signature verification and modal opening).
    #[must_use]
    pub fn slack(&self) -> &SlackClient {
        &self.inner.slack
    }

    /// The incident lifecycle controller.
    #[must_use]
    pub fn service(&self) -> &Controller {
        &self.inner.service
    }
}
