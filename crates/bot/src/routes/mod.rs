//! HTTP route handlers.

pub mod slack;

use axum::Router;

use crate::state::AppState;

/// All application routes.
pub fn routes() -> Router<AppState> {
    slack::router()
}
