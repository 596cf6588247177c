//! Incident lifecycle controller.
//!
//! Owns the state machine: validates instructions against the current
//! incident record, mutates the store, and drives the gateway side effects
//! in a fixed order.
//!
//! Failure behavior, by design:
//! - validation happens before any mutation; a rejected instruction never
//!   leaves partial state
//! - declare aborts if channel creation fails (the name-only row it leaves
//!   behind is invisible to every read path)
//! - side effects after the store write (topic, invites, announcements,
//!   acks) are independent and non-transactional; failures are logged and
//!   never roll back prior steps - the store stays authoritative and the
//!   chat surface catches up on the next successful update

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use incidentbot_core::{
    ChannelId, Incident, SevLevel, SlackUserId, channel_name,
};

use crate::commands::{AckTarget, Action, Instruction};
use crate::error::AppError;
use crate::gateway::MessagingGateway;
use crate::slack::{
    announcement_fallback, build_announcement, build_broadcast_announcement, build_home_view,
    render_topic,
};
use crate::store::IncidentStore;

/// Reaction confirming a processed mention command.
const CONFIRMED_EMOJI: &str = "white_check_mark";

/// Reaction flagging a rejected mention command.
const WARNING_EMOJI: &str = "warning";

/// Everything a modal submission declares.
#[derive(Debug, Clone)]
pub struct DeclareParams {
    /// Free-text incident description.
    pub name: String,
    /// Initial severity.
    pub sev_level: SevLevel,
    /// Designated commander, if any.
    pub commander: Option<SlackUserId>,
    /// User who submitted the declaration.
    pub declared_by: SlackUserId,
}

/// The incident lifecycle controller.
///
/// Generic over the two injected capabilities so the state machine is
/// testable without Postgres or Slack.
#[derive(Debug, Clone)]
pub struct IncidentService<S, G> {
    store: S,
    gateway: G,
    broadcast_channel: ChannelId,
}

impl<S: IncidentStore, G: MessagingGateway> IncidentService<S, G> {
    /// Create a controller over the injected capabilities.
    #[must_use]
    pub const fn new(store: S, gateway: G, broadcast_channel: ChannelId) -> Self {
        Self {
            store,
            gateway,
            broadcast_channel,
        }
    }

    /// Declare a new incident.
    ///
    /// Two-phase store write: the name-only insert obtains the id the
    /// channel name is derived from; the channel id, commander, and severity
    /// are attached once the channel exists. Steps after the attach are
    /// log-and-continue.
    ///
    /// # Errors
    ///
    /// Returns error if a store write or the channel creation fails;
    /// later side-effect failures are logged, not returned.
    #[instrument(skip(self, params), fields(declared_by = %params.declared_by))]
    pub async fn declare(&self, params: DeclareParams) -> Result<Incident, AppError> {
        let id = self.store.insert(&params.name).await?;

        let name = channel_name(Utc::now().date_naive(), id, &params.name);
        // Abort on failure: the orphaned row is not externally visible
        let channel = self.gateway.create_channel(&name).await?;

        let incident = self
            .store
            .attach_channel(id, &channel, params.commander.as_ref(), params.sev_level)
            .await?;

        info!(
            id = %incident.id,
            channel = %incident.channel_id,
            sev = %incident.sev_level,
            "Incident declared"
        );

        if let Err(e) = self
            .gateway
            .set_topic(&channel, &render_topic(&incident))
            .await
        {
            error!(error = %e, "Failed to set incident channel topic");
        }

        let mut invitees = vec![params.declared_by];
        if let Some(commander) = &incident.commander {
            invitees.push(commander.clone());
        }
        if let Err(e) = self.gateway.invite(&channel, &invitees).await {
            error!(error = %e, "Failed to invite users to incident channel");
        }

        let fallback = announcement_fallback(&incident);
        if let Err(e) = self
            .gateway
            .post_message(&channel, build_announcement(&incident), &fallback)
            .await
        {
            error!(error = %e, "Failed to post incident announcement");
        }

        if let Err(e) = self
            .gateway
            .post_message(
                &self.broadcast_channel,
                build_broadcast_announcement(&incident),
                &fallback,
            )
            .await
        {
            error!(error = %e, "Failed to post broadcast announcement");
        }

        Ok(incident)
    }

    /// Apply a normalized text instruction.
    ///
    /// Validation failures and unknown channels are surfaced to the acting
    /// user (warning reaction plus ephemeral explanation) and swallowed;
    /// transport failures propagate.
    ///
    /// # Errors
    ///
    /// Returns error if the store or the gateway fails mid-flow.
    #[instrument(skip(self, instruction), fields(channel = %instruction.channel, actor = %instruction.actor))]
    pub async fn handle(&self, instruction: Instruction) -> Result<(), AppError> {
        let Instruction {
            action,
            actor,
            channel,
            ack,
        } = instruction;

        let result = match action {
            Action::UpdateSeverity(raw) => self.update_severity(&channel, &raw, &ack).await,
            Action::UpdateCommander(raw) => self.update_commander(&channel, &raw, &ack).await,
            Action::Close => self.close(&channel, &ack).await,
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_user_error() => {
                self.reject(&channel, &actor, &ack, &e).await;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Change an incident's severity.
    ///
    /// # Errors
    ///
    /// `BadSeverity` before any mutation when the argument is outside 1-3,
    /// `UnknownChannel` when no incident matches, or a transport error.
    pub async fn update_severity(
        &self,
        channel: &ChannelId,
        raw_level: &str,
        ack: &AckTarget,
    ) -> Result<(), AppError> {
        let level: SevLevel = raw_level.parse()?;

        let incident = self
            .store
            .set_severity(channel, level)
            .await?
            .ok_or_else(|| AppError::UnknownChannel(channel.clone()))?;

        info!(id = %incident.id, sev = %incident.sev_level, "Severity updated");
        self.refresh_topic_and_confirm(&incident, ack).await
    }

    /// Designate an incident's commander.
    ///
    /// # Errors
    ///
    /// `UnparsableUser` before any mutation when the argument is not a user
    /// reference, `UnknownChannel` when no incident matches, or a transport
    /// error.
    pub async fn update_commander(
        &self,
        channel: &ChannelId,
        raw_commander: &str,
        ack: &AckTarget,
    ) -> Result<(), AppError> {
        let commander = SlackUserId::parse_reference(raw_commander)?;

        let incident = self
            .store
            .set_commander(channel, &commander)
            .await?
            .ok_or_else(|| AppError::UnknownChannel(channel.clone()))?;

        info!(id = %incident.id, commander = %commander, "Commander updated");
        self.refresh_topic_and_confirm(&incident, ack).await
    }

    /// Close an incident.
    ///
    /// Unconditional and idempotent: closing an already-closed incident
    /// re-runs the topic update and the ack.
    ///
    /// # Errors
    ///
    /// `UnknownChannel` when no incident matches, or a transport error.
    pub async fn close(&self, channel: &ChannelId, ack: &AckTarget) -> Result<(), AppError> {
        let incident = self
            .store
            .close(channel)
            .await?
            .ok_or_else(|| AppError::UnknownChannel(channel.clone()))?;

        info!(id = %incident.id, "Incident closed");
        self.refresh_topic_and_confirm(&incident, ack).await
    }

    /// Publish the App Home dashboard of open incidents for a user.
    ///
    /// # Errors
    ///
    /// Returns error if the store read or the publish fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn publish_dashboard(&self, user: &SlackUserId) -> Result<(), AppError> {
        let open = self.store.list_open().await?;
        self.gateway
            .publish_home(user, build_home_view(&open))
            .await?;
        Ok(())
    }

    /// Surface a rejected instruction to the acting user: warning reaction
    /// (when there is a message to react to) plus an ephemeral explanation.
    /// Best-effort on both.
    pub async fn reject(
        &self,
        channel: &ChannelId,
        actor: &SlackUserId,
        ack: &AckTarget,
        error: &AppError,
    ) {
        if let AckTarget::Reaction { message_ts } = ack {
            if let Err(e) = self
                .gateway
                .add_reaction(channel, message_ts, WARNING_EMOJI)
                .await
            {
                warn!(error = %e, "Failed to add warning reaction");
            }
        }

        if let Some(text) = error.user_message() {
            if let Err(e) = self.gateway.post_ephemeral(channel, actor, text).await {
                warn!(error = %e, "Failed to post ephemeral explanation");
            }
        }
    }

    /// Re-render the topic from the refreshed record, then confirm the ack.
    ///
    /// The topic comes from the record as committed, never from the
    /// instruction's argument, so it cannot drift from stored state even
    /// when updates to different fields race.
    async fn refresh_topic_and_confirm(
        &self,
        incident: &Incident,
        ack: &AckTarget,
    ) -> Result<(), AppError> {
        self.gateway
            .set_topic(&incident.channel_id, &render_topic(incident))
            .await?;

        if let AckTarget::Reaction { message_ts } = ack {
            if let Err(e) = self
                .gateway
                .add_reaction(&incident.channel_id, message_ts, CONFIRMED_EMOJI)
                .await
            {
                warn!(error = %e, "Failed to add confirmation reaction");
            }
        }

        Ok(())
    }
}
