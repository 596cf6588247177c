//! Slack webhook handlers.
//!
//! Three endpoints: the Events API (mentions, App Home opens), slash
//! commands, and interactions (the declare shortcut and modal submission).
//!
//! Every handler verifies the request signature against the raw body before
//! parsing anything. Accepted events are processed on independently spawned
//! tasks so Slack gets its acknowledgment within the delivery deadline; the
//! one exception is opening the declare modal, which must happen while the
//! interaction's `trigger_id` is still valid.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::{debug, error, instrument, warn};

use incidentbot_core::{ChannelId, SlackUserId};

use crate::commands::{self, AckTarget, Instruction};
use crate::error::AppError;
use crate::gateway::MessagingGateway;
use crate::services::DeclareParams;
use crate::slack::{
    COMMANDER_INPUT_ID, DECLARE_VIEW_CALLBACK_ID, DESCRIPTION_INPUT_ID, Event, EventEnvelope,
    InteractionPayload, SEV_INPUT_ID, SlashCommandPayload, build_declare_modal,
};
use crate::state::AppState;

/// Shortcut callback id that opens the declare modal.
const DECLARE_SHORTCUT_ID: &str = "declare_incident";

/// Create the Slack webhook routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/slack/events", post(handle_event))
        .route("/slack/commands", post(handle_command))
        .route("/slack/interactions", post(handle_interaction))
}

/// Verify the Slack signature headers against the raw body.
fn verify(state: &AppState, headers: &HeaderMap, body: &str) -> Result<(), AppError> {
    let timestamp = headers
        .get("X-Slack-Request-Timestamp")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing timestamp header".into()))?;

    let signature = headers
        .get("X-Slack-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing signature header".into()))?;

    state
        .slack()
        .verify_signature(timestamp, body, signature)
        .map_err(|e| AppError::Unauthorized(e.to_string()))
}

/// Process an instruction on its own task; failures are logged, Slack has
/// already been acknowledged.
fn spawn_handle(state: AppState, instruction: Instruction) {
    tokio::spawn(async move {
        if let Err(e) = state.service().handle(instruction).await {
            error!(error = %e, "Instruction processing failed");
        }
    });
}

/// Surface a rejected command on its own task.
fn spawn_reject(state: AppState, channel: ChannelId, actor: SlackUserId, ack: AckTarget) {
    tokio::spawn(async move {
        state
            .service()
            .reject(&channel, &actor, &ack, &AppError::UnknownCommand)
            .await;
    });
}

/// Handle an Events API delivery.
#[instrument(skip(state, headers, body))]
async fn handle_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, AppError> {
    verify(&state, &headers, &body)?;

    let envelope: EventEnvelope = serde_json::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse event: {e}")))?;

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            Ok(Json(json!({ "challenge": challenge })).into_response())
        }
        EventEnvelope::EventCallback { event } => {
            match event {
                Event::AppMention {
                    user,
                    text,
                    channel,
                    event_ts,
                } => {
                    let actor = SlackUserId::new(user);
                    let channel = ChannelId::new(channel);
                    match commands::parse_mention(
                        &text,
                        actor.clone(),
                        channel.clone(),
                        event_ts.clone(),
                    ) {
                        Ok(instruction) => spawn_handle(state, instruction),
                        Err(_) => {
                            warn!(%channel, "Unknown mention command");
                            spawn_reject(
                                state,
                                channel,
                                actor,
                                AckTarget::Reaction {
                                    message_ts: event_ts,
                                },
                            );
                        }
                    }
                }
                Event::AppHomeOpened { user } => {
                    let user = SlackUserId::new(user);
                    tokio::spawn(async move {
                        if let Err(e) = state.service().publish_dashboard(&user).await {
                            error!(error = %e, "Failed to publish dashboard");
                        }
                    });
                }
                Event::Other => debug!("Ignoring unsubscribed event type"),
            }
            Ok(StatusCode::OK.into_response())
        }
        EventEnvelope::Other => {
            debug!("Ignoring unsubscribed envelope type");
            Ok(StatusCode::OK.into_response())
        }
    }
}

/// Handle a slash-command delivery.
#[instrument(skip(state, headers, body))]
async fn handle_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, AppError> {
    verify(&state, &headers, &body)?;

    let payload: SlashCommandPayload = serde_urlencoded::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse command: {e}")))?;

    let actor = SlackUserId::new(payload.user_id);
    let channel = ChannelId::new(payload.channel_id);

    match commands::parse_slash(&payload.text, actor.clone(), channel.clone()) {
        Ok(instruction) => spawn_handle(state, instruction),
        Err(_) => {
            warn!(command = %payload.command, "Unknown slash command");
            spawn_reject(state, channel, actor, AckTarget::None);
        }
    }

    Ok(StatusCode::OK)
}

/// Handle an interaction delivery (shortcut or modal submission).
#[instrument(skip(state, headers, body))]
async fn handle_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, AppError> {
    verify(&state, &headers, &body)?;

    let payload_str = body
        .strip_prefix("payload=")
        .ok_or_else(|| AppError::BadRequest("Invalid payload format".into()))?;

    let payload_decoded = urlencoding::decode(payload_str)
        .map_err(|e| AppError::BadRequest(format!("Failed to decode payload: {e}")))?;

    let payload: InteractionPayload = serde_json::from_str(&payload_decoded)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse payload: {e}")))?;

    match payload {
        InteractionPayload::Shortcut {
            callback_id,
            trigger_id,
            ..
        } if callback_id == DECLARE_SHORTCUT_ID => {
            // Inline: the trigger_id expires within seconds
            state
                .slack()
                .open_modal(&trigger_id, build_declare_modal())
                .await?;
        }
        InteractionPayload::ViewSubmission { user, view }
            if view.callback_id == DECLARE_VIEW_CALLBACK_ID =>
        {
            let params = declare_params(user.id, &view)?;
            tokio::spawn(async move {
                if let Err(e) = state.service().declare(params).await {
                    error!(error = %e, "Incident declaration failed");
                }
            });
        }
        _ => debug!("Ignoring unrecognized interaction"),
    }

    Ok(StatusCode::OK)
}

/// Extract the declaration from the submitted modal state.
fn declare_params(
    user_id: String,
    view: &crate::slack::ViewPayload,
) -> Result<DeclareParams, AppError> {
    let name = view
        .input(DESCRIPTION_INPUT_ID, DESCRIPTION_INPUT_ID)
        .and_then(|v| v.value.clone())
        .ok_or_else(|| AppError::BadRequest("Missing incident description".into()))?;

    let sev_level = view
        .input(SEV_INPUT_ID, SEV_INPUT_ID)
        .and_then(|v| v.selected_option.as_ref())
        .ok_or_else(|| AppError::BadRequest("Missing severity selection".into()))?
        .value
        .parse()
        .map_err(AppError::BadSeverity)?;

    let commander = view
        .input(COMMANDER_INPUT_ID, COMMANDER_INPUT_ID)
        .and_then(|v| v.selected_user.clone())
        .map(SlackUserId::new);

    Ok(DeclareParams {
        name,
        sev_level,
        commander,
        declared_by: SlackUserId::new(user_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::ViewPayload;

    fn submitted_view(json: serde_json::Value) -> ViewPayload {
        serde_json::from_value(json).expect("valid view payload")
    }

    #[test]
    fn test_declare_params_extraction() {
        let view = submitted_view(serde_json::json!({
            "callback_id": "incident-declared",
            "state": {
                "values": {
                    "description": {"description": {"value": "db down"}},
                    "sev-level": {"sev-level": {"selected_option": {"value": "2"}}},
                    "commander": {"commander": {"selected_user": "U456"}}
                }
            }
        }));

        let params = declare_params("U123".into(), &view).expect("extracts");
        assert_eq!(params.name, "db down");
        assert_eq!(params.sev_level, incidentbot_core::SevLevel::Sev2);
        assert_eq!(params.commander, Some(SlackUserId::new("U456")));
        assert_eq!(params.declared_by, SlackUserId::new("U123"));
    }

    #[test]
    fn test_declare_params_commander_is_optional() {
        let view = submitted_view(serde_json::json!({
            "callback_id": "incident-declared",
            "state": {
                "values": {
                    "description": {"description": {"value": "db down"}},
                    "sev-level": {"sev-level": {"selected_option": {"value": "1"}}}
                }
            }
        }));

        let params = declare_params("U123".into(), &view).expect("extracts");
        assert_eq!(params.commander, None);
    }

    #[test]
    fn test_declare_params_requires_description() {
        let view = submitted_view(serde_json::json!({
            "callback_id": "incident-declared",
            "state": {
                "values": {
                    "sev-level": {"sev-level": {"selected_option": {"value": "1"}}}
                }
            }
        }));

        assert!(declare_params("U123".into(), &view).is_err());
    }
}
