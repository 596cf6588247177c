//! Slack integration.
//!
//! This module provides:
//! - [`SlackClient`] - the Web API client implementing the
//!   [`crate::gateway::MessagingGateway`] capability, plus webhook signature
//!   verification
//! - Block Kit types and the inbound event/interaction payloads
//! - Pure presentation builders for the modal, topics, announcements, and
//!   the App Home view

mod client;
mod error;
mod messages;
mod types;

pub use client::SlackClient;
pub use error::SlackError;
pub use messages::{
    COMMANDER_INPUT_ID, DECLARE_VIEW_CALLBACK_ID, DESCRIPTION_INPUT_ID, SEV_INPUT_ID,
    announcement_fallback, build_announcement, build_broadcast_announcement, build_declare_modal,
    build_home_view, render_topic,
};
pub use types::{
    ApiResponse, Block, ChannelObject, CreateChannelResponse, Event, EventEnvelope, HomeView,
    InputElement, InteractionPayload, InteractionUser, ModalView, PlainText, SelectOption,
    SelectedOption, SlashCommandPayload, Text, ViewPayload, ViewState, ViewStateValue,
};
