//! Unified error handling for the bot.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use incidentbot_core::{ChannelId, SevLevelError, UserRefError};

use crate::db::RepositoryError;
use crate::slack::SlackError;

/// Application-level error type.
///
/// Validation variants (`BadSeverity`, `UnparsableUser`, `UnknownCommand`)
/// are always raised before any store mutation; they carry the explanation
/// text shown to the acting user via an ephemeral message.
#[derive(Debug, Error)]
pub enum AppError {
    /// Incident store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Slack API operation failed.
    #[error("Slack error: {0}")]
    Slack(#[from] SlackError),

    /// Severity argument outside the accepted 1-3 range.
    #[error("Bad severity: {0}")]
    BadSeverity(#[from] SevLevelError),

    /// Commander argument is not a recognizable user reference.
    #[error("Unparsable user: {0}")]
    UnparsableUser(#[from] UserRefError),

    /// No incident is associated with the targeted channel.
    #[error("No incident found for channel {0}")]
    UnknownChannel(ChannelId),

    /// Unrecognized command keyword.
    #[error("Unknown command")]
    UnknownCommand,

    /// Bad request from the webhook caller.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Webhook signature verification failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Explanation text for the acting user, when the error is one they can
    /// do something about.
    #[must_use]
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::BadSeverity(_) => Some("Set a SEV between 1 and 3 please"),
            Self::UnparsableUser(_) => Some("Cannot parse user"),
            Self::UnknownCommand => Some("I'm sorry Dave, I can't do that"),
            Self::UnknownChannel(_) => Some("There is no incident tracked for this channel"),
            _ => None,
        }
    }

    /// Whether this error was detected before any mutation and should be
    /// surfaced to the user rather than logged as a failure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::BadSeverity(_)
                | Self::UnparsableUser(_)
                | Self::UnknownCommand
                | Self::UnknownChannel(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures; validation errors are user-facing
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Slack(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Bot request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Slack(_) => StatusCode::BAD_GATEWAY,
            Self::UnknownChannel(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadSeverity(_) | Self::UnparsableUser(_) | Self::UnknownCommand
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Slack(_) => "External service error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = AppError::BadSeverity(SevLevelError("4".into()));
        assert_eq!(err.user_message(), Some("Set a SEV between 1 and 3 please"));
        assert!(err.is_user_error());

        let err = AppError::UnparsableUser(UserRefError("notauser".into()));
        assert_eq!(err.user_message(), Some("Cannot parse user"));

        assert_eq!(
            AppError::UnknownCommand.user_message(),
            Some("I'm sorry Dave, I can't do that")
        );

        let err = AppError::Internal("boom".into());
        assert_eq!(err.user_message(), None);
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_status_codes() {
        fn status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            status(AppError::UnknownChannel(ChannelId::new("C1"))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(AppError::Unauthorized("bad signature".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(AppError::BadRequest("nope".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
