//! The messaging-gateway capability.
//!
//! Everything the lifecycle controller needs from the chat platform, behind
//! one trait so tests can inject a recording fake. The production
//! implementation is [`crate::slack::SlackClient`].

use std::future::Future;

use incidentbot_core::{ChannelId, SlackUserId};

use crate::slack::{Block, HomeView, ModalView, SlackError};

/// Abstract chat-platform capability for channel, message, and reaction
/// operations.
pub trait MessagingGateway: Send + Sync {
    /// Create a channel and return its id.
    fn create_channel(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<ChannelId, SlackError>> + Send;

    /// Set a channel's topic.
    fn set_topic(
        &self,
        channel: &ChannelId,
        topic: &str,
    ) -> impl Future<Output = Result<(), SlackError>> + Send;

    /// Invite users to a channel.
    fn invite(
        &self,
        channel: &ChannelId,
        users: &[SlackUserId],
    ) -> impl Future<Output = Result<(), SlackError>> + Send;

    /// Post a block-formatted message with a plain-text fallback.
    fn post_message(
        &self,
        channel: &ChannelId,
        blocks: Vec<Block>,
        fallback: &str,
    ) -> impl Future<Output = Result<(), SlackError>> + Send;

    /// Post an ephemeral message visible only to one user.
    fn post_ephemeral(
        &self,
        channel: &ChannelId,
        user: &SlackUserId,
        text: &str,
    ) -> impl Future<Output = Result<(), SlackError>> + Send;

    /// Add an emoji reaction to a message.
    fn add_reaction(
        &self,
        channel: &ChannelId,
        timestamp: &str,
        emoji: &str,
    ) -> impl Future<Output = Result<(), SlackError>> + Send;

    /// Publish a user's App Home view.
    fn publish_home(
        &self,
        user: &SlackUserId,
        view: HomeView,
    ) -> impl Future<Output = Result<(), SlackError>> + Send;

    /// Open a modal against an interaction's trigger id.
    fn open_modal(
        &self,
        trigger_id: &str,
        view: ModalView,
    ) -> impl Future<Output = Result<(), SlackError>> + Send;
}
