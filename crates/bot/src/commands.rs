//! Command normalizer.
//!
//! Raw chat input arrives through two text entry points - an @-mention of
//! the bot and a slash command - plus the modal form. The normalizer turns
//! the text forms into one uniform [`Instruction`] so the lifecycle
//! controller never sees entry-point differences.
//!
//! Argument *values* are not validated here; the controller checks them
//! against the incident record before mutating anything. The normalizer only
//! recognizes the action keyword.

use thiserror::Error;

use incidentbot_core::{ChannelId, SlackUserId};

/// The action keyword was not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command")]
pub struct UnknownCommand;

/// The closed set of actions a text command can request.
///
/// Arguments are carried raw; `sev 9` still normalizes to
/// `UpdateSeverity("9")` and is rejected by the controller before any
/// mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `sev <level>` - change the incident's severity.
    UpdateSeverity(String),
    /// `ic <user>` - designate the incident commander.
    UpdateCommander(String),
    /// `close` - close the incident.
    Close,
}

/// How feedback for an instruction must be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckTarget {
    /// React on the triggering message (mention entry point).
    Reaction { message_ts: String },
    /// No message to react to (slash-command entry point).
    None,
}

/// The normalized form of a chat command, independent of its entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub action: Action,
    pub actor: SlackUserId,
    pub channel: ChannelId,
    pub ack: AckTarget,
}

/// Normalize an @-mention (`<@bot> sev 2`).
///
/// The first token is the bot mention itself and is skipped.
///
/// # Errors
///
/// Returns [`UnknownCommand`] when the action keyword is not one of
/// `sev` / `ic` / `close`.
pub fn parse_mention(
    text: &str,
    actor: SlackUserId,
    channel: ChannelId,
    message_ts: String,
) -> Result<Instruction, UnknownCommand> {
    let mut words = text.split_whitespace().skip(1);
    let action = normalize_action(words.next(), words.next())?;
    Ok(Instruction {
        action,
        actor,
        channel,
        ack: AckTarget::Reaction { message_ts },
    })
}

/// Normalize a slash command's text (`sev 2`).
///
/// # Errors
///
/// Returns [`UnknownCommand`] when the action keyword is not one of
/// `sev` / `ic` / `close`.
pub fn parse_slash(
    text: &str,
    actor: SlackUserId,
    channel: ChannelId,
) -> Result<Instruction, UnknownCommand> {
    let mut words = text.split_whitespace();
    let action = normalize_action(words.next(), words.next())?;
    Ok(Instruction {
        action,
        actor,
        channel,
        ack: AckTarget::None,
    })
}

/// Match the action keyword case-insensitively; a missing argument is kept
/// as an empty string and fails value validation downstream.
fn normalize_action(
    keyword: Option<&str>,
    argument: Option<&str>,
) -> Result<Action, UnknownCommand> {
    let argument = argument.unwrap_or_default().to_string();
    match keyword.unwrap_or_default().to_lowercase().as_str() {
        "sev" => Ok(Action::UpdateSeverity(argument)),
        "ic" => Ok(Action::UpdateCommander(argument)),
        "close" => Ok(Action::Close),
        _ => Err(UnknownCommand),
    }
}
