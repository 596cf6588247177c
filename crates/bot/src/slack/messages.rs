//! Presentation builders for everything the bot renders.
//!
//! Pure functions from incident data to Block Kit payloads and topic
//! strings. No I/O, no hidden state: identical input produces identical
//! output, which is what keeps the chat surface reproducible from the store.

use incidentbot_core::Incident;

use super::types::{Block, HomeView, InputElement, ModalView, PlainText, SelectOption, Text};

/// Callback id carried by the declare modal.
pub const DECLARE_VIEW_CALLBACK_ID: &str = "incident-declared";

/// Block/action id of the modal's description input.
pub const DESCRIPTION_INPUT_ID: &str = "description";

/// Block/action id of the modal's severity select.
pub const SEV_INPUT_ID: &str = "sev-level";

/// Block/action id of the modal's commander select.
pub const COMMANDER_INPUT_ID: &str = "commander";

/// Emoji rendered next to the commander everywhere.
const COMMANDER_EMOJI: &str = ":female-firefighter:";

/// Build the declare-incident modal.
#[must_use]
pub fn build_declare_modal() -> ModalView {
    ModalView {
        view_type: "modal",
        title: PlainText::new("IncidentBot"),
        submit: PlainText::new("Declare incident"),
        close: PlainText::new("Cancel"),
        callback_id: DECLARE_VIEW_CALLBACK_ID.to_string(),
        blocks: vec![
            Block::Input {
                block_id: DESCRIPTION_INPUT_ID.to_string(),
                element: InputElement::PlainTextInput {
                    action_id: DESCRIPTION_INPUT_ID.to_string(),
                },
                label: PlainText::new("Provide a brief description of the incident"),
            },
            Block::Input {
                block_id: SEV_INPUT_ID.to_string(),
                element: InputElement::StaticSelect {
                    action_id: SEV_INPUT_ID.to_string(),
                    placeholder: PlainText::new("Choose a severity level"),
                    options: vec![
                        SelectOption {
                            text: PlainText::new("SEV 1"),
                            value: "1".to_string(),
                        },
                        SelectOption {
                            text: PlainText::new("SEV 2"),
                            value: "2".to_string(),
                        },
                        SelectOption {
                            text: PlainText::new("SEV 3"),
                            value: "3".to_string(),
                        },
                    ],
                },
                label: PlainText::new("Severity Level"),
            },
            Block::Input {
                block_id: COMMANDER_INPUT_ID.to_string(),
                element: InputElement::UsersSelect {
                    action_id: COMMANDER_INPUT_ID.to_string(),
                    placeholder: PlainText::new("Choose an Incident Commander"),
                },
                label: PlainText::new("Incident Commander"),
            },
        ],
    }
}

/// Render the channel topic for an incident's current state.
///
/// `SEV {n} | {commander}` while open, prefixed `Incident Closed | ` once
/// closed; the commander part is blank when nobody is designated.
#[must_use]
pub fn render_topic(incident: &Incident) -> String {
    let commander = incident
        .commander
        .as_ref()
        .map(|c| format!("{COMMANDER_EMOJI} {}", c.mention()))
        .unwrap_or_default();

    let topic = format!("SEV {} | {commander}", incident.sev_level);
    let topic = topic.trim_end().to_string();

    if incident.is_open() {
        topic
    } else {
        format!("Incident Closed | {topic}")
    }
}

/// Plain-text fallback for announcement messages.
#[must_use]
pub fn announcement_fallback(incident: &Incident) -> String {
    format!("Incident declared: <#{}>", incident.channel_id)
}

/// Build the structured announcement posted into the incident channel.
#[must_use]
pub fn build_announcement(incident: &Incident) -> Vec<Block> {
    let mut blocks = vec![
        Block::Header {
            text: PlainText::new(incident.name.clone()),
        },
        Block::Section {
            text: Text::mrkdwn(format!(":rotating_light: SEV Level {}", incident.sev_level)),
        },
    ];

    if let Some(commander) = &incident.commander {
        blocks.push(Block::Section {
            text: Text::mrkdwn(format!("{COMMANDER_EMOJI} {}", commander.mention())),
        });
    }

    blocks
}

/// Build the summary announcement posted into the broadcast channel.
///
/// Same as the incident-channel announcement plus a pointer to the incident
/// channel.
#[must_use]
pub fn build_broadcast_announcement(incident: &Incident) -> Vec<Block> {
    let mut blocks = build_announcement(incident);
    blocks.push(Block::Section {
        text: Text::mrkdwn(format!(
            "For more information, join the incident channel - <#{}>",
            incident.channel_id
        )),
    });
    blocks
}

/// Build the App Home view listing open incidents.
#[must_use]
pub fn build_home_view(open_incidents: &[Incident]) -> HomeView {
    let mut blocks = vec![
        Block::Header {
            text: PlainText::new("Open Incidents"),
        },
        Block::Divider,
    ];

    for incident in open_incidents {
        let commander = incident
            .commander
            .as_ref()
            .map(|c| format!(" | {COMMANDER_EMOJI} {}", c.mention()))
            .unwrap_or_default();
        blocks.push(Block::Section {
            text: Text::mrkdwn(format!(
                "*<#{}>* | SEV {}{commander}",
                incident.channel_id, incident.sev_level
            )),
        });
    }

    HomeView::new(blocks)
}
