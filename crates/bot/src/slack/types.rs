//! Slack Block Kit and payload types.
//!
//! A subset of the Block Kit specification plus the inbound event and
//! interaction payloads the bot consumes.
//!
//! See: <https://api.slack.com/block-kit>

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Block Kit (outbound)
// =============================================================================

/// Block Kit block types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Header block with large text.
    Header { text: PlainText },
    /// Section block with text.
    Section { text: Text },
    /// Divider block (horizontal line).
    Divider,
    /// Input block (modal forms only).
    Input {
        block_id: String,
        element: InputElement,
        label: PlainText,
    },
}

/// Text object types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    /// Plain text (no formatting).
    PlainText { text: String, emoji: bool },
    /// Markdown text (supports formatting).
    Mrkdwn { text: String },
}

impl Text {
    /// Create a markdown text object.
    #[must_use]
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

/// Plain text object (for headers, labels, and titles).
#[derive(Debug, Clone, Serialize)]
pub struct PlainText {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: String,
    pub emoji: bool,
}

impl PlainText {
    /// Create a new plain text object.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text",
            text: text.into(),
            emoji: true,
        }
    }
}

/// Interactive elements usable inside an input block.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputElement {
    /// Single-line free text input.
    PlainTextInput { action_id: String },
    /// Dropdown with a static option list.
    StaticSelect {
        action_id: String,
        placeholder: PlainText,
        options: Vec<SelectOption>,
    },
    /// Dropdown over the workspace's users.
    UsersSelect {
        action_id: String,
        placeholder: PlainText,
    },
}

/// An option in a static select.
#[derive(Debug, Clone, Serialize)]
pub struct SelectOption {
    pub text: PlainText,
    pub value: String,
}

/// A modal view for `views.open`.
#[derive(Debug, Clone, Serialize)]
pub struct ModalView {
    #[serde(rename = "type")]
    pub view_type: &'static str,
    pub title: PlainText,
    pub submit: PlainText,
    pub close: PlainText,
    pub callback_id: String,
    pub blocks: Vec<Block>,
}

/// A home tab view for `views.publish`.
#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    #[serde(rename = "type")]
    pub view_type: &'static str,
    pub blocks: Vec<Block>,
}

impl HomeView {
    /// Create a home view from blocks.
    #[must_use]
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            view_type: "home",
            blocks,
        }
    }
}

// =============================================================================
// Web API responses
// =============================================================================

/// Generic Slack Web API response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `conversations.create`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChannelResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// The created channel.
    #[serde(default)]
    pub channel: Option<ChannelObject>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Channel object returned by conversation endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelObject {
    /// Channel ID.
    pub id: String,
}

// =============================================================================
// Inbound events
// =============================================================================

/// Outer envelope delivered to the events endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Endpoint ownership handshake; the challenge must be echoed back.
    UrlVerification { challenge: String },
    /// A subscribed workspace event.
    EventCallback { event: Event },
    /// Any other envelope type (e.g. `app_rate_limited`); acknowledged and
    /// ignored so Slack does not redeliver it.
    #[serde(other)]
    Other,
}

/// Workspace events the bot subscribes to.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The bot was @-mentioned in a channel.
    AppMention {
        user: String,
        text: String,
        channel: String,
        event_ts: String,
    },
    /// A user opened the bot's App Home tab.
    AppHomeOpened { user: String },
    /// Any other event type; ignored.
    #[serde(other)]
    Other,
}

/// Form payload delivered to the slash-command endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SlashCommandPayload {
    /// The command that was typed (e.g., `/incident-bot`).
    pub command: String,
    /// Everything after the command.
    #[serde(default)]
    pub text: String,
    /// User who issued the command.
    pub user_id: String,
    /// Channel the command was issued in.
    pub channel_id: String,
}

// =============================================================================
// Inbound interactions
// =============================================================================

/// Payload delivered to the interactions endpoint (`payload=`-encoded JSON).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    /// A global shortcut was triggered.
    Shortcut {
        callback_id: String,
        trigger_id: String,
        user: InteractionUser,
    },
    /// A modal was submitted.
    ViewSubmission {
        user: InteractionUser,
        view: ViewPayload,
    },
    /// Any other interaction type; ignored.
    #[serde(other)]
    Other,
}

/// User who triggered an interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionUser {
    /// Slack user ID.
    pub id: String,
}

/// Submitted view contents.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewPayload {
    /// Callback id the view was opened with.
    pub callback_id: String,
    /// Form state.
    pub state: ViewState,
}

impl ViewPayload {
    /// Look up the value a given input block/action produced.
    #[must_use]
    pub fn input(&self, block_id: &str, action_id: &str) -> Option<&ViewStateValue> {
        self.state.input(block_id, action_id)
    }
}

/// Form state of a submitted view, keyed by block id then action id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, ViewStateValue>>,
}

impl ViewState {
    /// Look up the value a given input block/action produced.
    #[must_use]
    pub fn input(&self, block_id: &str, action_id: &str) -> Option<&ViewStateValue> {
        self.values.get(block_id).and_then(|b| b.get(action_id))
    }
}

/// A single input's submitted value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewStateValue {
    /// Free-text value (plain text inputs).
    #[serde(default)]
    pub value: Option<String>,
    /// Chosen option (static selects).
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
    /// Chosen user (users selects).
    #[serde(default)]
    pub selected_user: Option<String>,
}

/// The option chosen in a static select.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOption {
    /// The option's value.
    pub value: String,
}
