//! Lifecycle controller tests against in-memory capability fakes.
//!
//! The store fake mirrors the Postgres semantics (rows without a channel are
//! invisible, mutations return the refreshed record); the gateway fake
//! records every call so side-effect ordering and content can be asserted.

use std::sync::{Arc, Mutex};

use chrono::Utc;

use incidentbot::commands::{AckTarget, Action, Instruction};
use incidentbot::db::RepositoryError;
use incidentbot::error::AppError;
use incidentbot::gateway::MessagingGateway;
use incidentbot::services::{DeclareParams, IncidentService};
use incidentbot::slack::{Block, HomeView, ModalView, SlackError};
use incidentbot::store::IncidentStore;
use incidentbot_core::{
    ChannelId, Incident, IncidentId, IncidentState, SevLevel, SlackUserId,
};

// =============================================================================
// Fakes
// =============================================================================

#[derive(Debug, Clone)]
struct StoredRow {
    id: i64,
    name: String,
    channel: Option<ChannelId>,
    commander: Option<SlackUserId>,
    sev_level: Option<SevLevel>,
    state: IncidentState,
    created_at: chrono::DateTime<Utc>,
}

impl StoredRow {
    fn to_incident(&self) -> Incident {
        Incident {
            id: IncidentId::new(self.id),
            name: self.name.clone(),
            channel_id: self.channel.clone().expect("provisioned row"),
            commander: self.commander.clone(),
            sev_level: self.sev_level.expect("provisioned row"),
            state: self.state,
            created_at: self.created_at,
        }
    }
}

/// In-memory stand-in for the Postgres store.
#[derive(Debug, Clone, Default)]
struct MemoryStore {
    rows: Arc<Mutex<Vec<StoredRow>>>,
}

impl MemoryStore {
    fn seed(&self, channel: &str, sev_level: SevLevel, commander: Option<&str>) {
        let mut rows = self.rows.lock().expect("not poisoned");
        let id = rows.len() as i64 + 1;
        rows.push(StoredRow {
            id,
            name: format!("incident {id}"),
            channel: Some(ChannelId::new(channel)),
            commander: commander.map(SlackUserId::new),
            sev_level: Some(sev_level),
            state: IncidentState::Open,
            created_at: Utc::now(),
        });
    }

    fn row_by_channel(&self, channel: &str) -> Option<StoredRow> {
        self.rows
            .lock()
            .expect("not poisoned")
            .iter()
            .find(|r| r.channel.as_ref().is_some_and(|c| c.as_str() == channel))
            .cloned()
    }

    fn row_count(&self) -> usize {
        self.rows.lock().expect("not poisoned").len()
    }

    fn mutate_by_channel<F>(&self, channel: &ChannelId, f: F) -> Option<Incident>
    where
        F: FnOnce(&mut StoredRow),
    {
        let mut rows = self.rows.lock().expect("not poisoned");
        let row = rows
            .iter_mut()
            .find(|r| r.channel.as_ref() == Some(channel))?;
        f(row);
        Some(row.to_incident())
    }
}

impl IncidentStore for MemoryStore {
    async fn insert(&self, name: &str) -> Result<IncidentId, RepositoryError> {
        let mut rows = self.rows.lock().expect("not poisoned");
        let id = rows.len() as i64 + 1;
        rows.push(StoredRow {
            id,
            name: name.to_string(),
            channel: None,
            commander: None,
            sev_level: None,
            state: IncidentState::Open,
            created_at: Utc::now(),
        });
        Ok(IncidentId::new(id))
    }

    async fn attach_channel(
        &self,
        id: IncidentId,
        channel: &ChannelId,
        commander: Option<&SlackUserId>,
        sev_level: SevLevel,
    ) -> Result<Incident, RepositoryError> {
        let mut rows = self.rows.lock().expect("not poisoned");
        let row = rows
            .iter_mut()
            .find(|r| r.id == id.as_i64())
            .ok_or(RepositoryError::NotFound)?;
        row.channel = Some(channel.clone());
        row.commander = commander.cloned();
        row.sev_level = Some(sev_level);
        Ok(row.to_incident())
    }

    async fn get(&self, channel: &ChannelId) -> Result<Option<Incident>, RepositoryError> {
        Ok(self
            .row_by_channel(channel.as_str())
            .map(|r| r.to_incident()))
    }

    async fn set_severity(
        &self,
        channel: &ChannelId,
        sev_level: SevLevel,
    ) -> Result<Option<Incident>, RepositoryError> {
        Ok(self.mutate_by_channel(channel, |row| row.sev_level = Some(sev_level)))
    }

    async fn set_commander(
        &self,
        channel: &ChannelId,
        commander: &SlackUserId,
    ) -> Result<Option<Incident>, RepositoryError> {
        Ok(self.mutate_by_channel(channel, |row| row.commander = Some(commander.clone())))
    }

    async fn close(&self, channel: &ChannelId) -> Result<Option<Incident>, RepositoryError> {
        Ok(self.mutate_by_channel(channel, |row| row.state = IncidentState::Closed))
    }

    async fn list_open(&self) -> Result<Vec<Incident>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("not poisoned")
            .iter()
            .filter(|r| r.state == IncidentState::Open && r.channel.is_some())
            .map(StoredRow::to_incident)
            .collect())
    }
}

/// Everything the recording gateway saw.
#[derive(Debug, Clone, PartialEq)]
enum GatewayCall {
    CreateChannel { name: String },
    SetTopic { channel: String, topic: String },
    Invite { channel: String, users: Vec<String> },
    PostMessage { channel: String, fallback: String },
    PostEphemeral { channel: String, user: String, text: String },
    AddReaction { channel: String, ts: String, emoji: String },
    PublishHome { user: String, section_count: usize },
    OpenModal,
}

/// Call-recording stand-in for the Slack client.
#[derive(Debug, Clone, Default)]
struct RecordingGateway {
    calls: Arc<Mutex<Vec<GatewayCall>>>,
    fail_create_channel: bool,
}

impl RecordingGateway {
    fn failing_channel_creation() -> Self {
        Self {
            fail_create_channel: true,
            ..Self::default()
        }
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("not poisoned").push(call);
    }

    fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("not poisoned").clone()
    }

    fn topics(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::SetTopic { topic, .. } => Some(topic),
                _ => None,
            })
            .collect()
    }

    fn reactions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::AddReaction { emoji, .. } => Some(emoji),
                _ => None,
            })
            .collect()
    }

    fn ephemerals(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::PostEphemeral { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl MessagingGateway for RecordingGateway {
    async fn create_channel(&self, name: &str) -> Result<ChannelId, SlackError> {
        if self.fail_create_channel {
            return Err(SlackError::Api("name_taken".into()));
        }
        self.record(GatewayCall::CreateChannel {
            name: name.to_string(),
        });
        Ok(ChannelId::new(format!("C-{name}")))
    }

    async fn set_topic(&self, channel: &ChannelId, topic: &str) -> Result<(), SlackError> {
        self.record(GatewayCall::SetTopic {
            channel: channel.as_str().to_string(),
            topic: topic.to_string(),
        });
        Ok(())
    }

    async fn invite(&self, channel: &ChannelId, users: &[SlackUserId]) -> Result<(), SlackError> {
        self.record(GatewayCall::Invite {
            channel: channel.as_str().to_string(),
            users: users.iter().map(|u| u.as_str().to_string()).collect(),
        });
        Ok(())
    }

    async fn post_message(
        &self,
        channel: &ChannelId,
        _blocks: Vec<Block>,
        fallback: &str,
    ) -> Result<(), SlackError> {
        self.record(GatewayCall::PostMessage {
            channel: channel.as_str().to_string(),
            fallback: fallback.to_string(),
        });
        Ok(())
    }

    async fn post_ephemeral(
        &self,
        channel: &ChannelId,
        user: &SlackUserId,
        text: &str,
    ) -> Result<(), SlackError> {
        self.record(GatewayCall::PostEphemeral {
            channel: channel.as_str().to_string(),
            user: user.as_str().to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel: &ChannelId,
        timestamp: &str,
        emoji: &str,
    ) -> Result<(), SlackError> {
        self.record(GatewayCall::AddReaction {
            channel: channel.as_str().to_string(),
            ts: timestamp.to_string(),
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn publish_home(&self, user: &SlackUserId, view: HomeView) -> Result<(), SlackError> {
        let section_count = view
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Section { .. }))
            .count();
        self.record(GatewayCall::PublishHome {
            user: user.as_str().to_string(),
            section_count,
        });
        Ok(())
    }

    async fn open_modal(&self, _trigger_id: &str, _view: ModalView) -> Result<(), SlackError> {
        self.record(GatewayCall::OpenModal);
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

const BROADCAST: &str = "CBROADCAST";

fn service(
    store: &MemoryStore,
    gateway: &RecordingGateway,
) -> IncidentService<MemoryStore, RecordingGateway> {
    IncidentService::new(store.clone(), gateway.clone(), ChannelId::new(BROADCAST))
}

fn mention(action: Action, channel: &str) -> Instruction {
    Instruction {
        action,
        actor: SlackUserId::new("U061F7AUR"),
        channel: ChannelId::new(channel),
        ack: AckTarget::Reaction {
            message_ts: "1515449483.000108".into(),
        },
    }
}

// =============================================================================
// Declare
// =============================================================================

#[tokio::test]
async fn declare_provisions_channel_and_announces() {
    let store = MemoryStore::default();
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    let incident = service
        .declare(DeclareParams {
            name: "Database outage in prod!!".into(),
            sev_level: SevLevel::Sev2,
            commander: Some(SlackUserId::new("U900")),
            declared_by: SlackUserId::new("U100"),
        })
        .await
        .expect("declare succeeds");

    assert_eq!(incident.sev_level, SevLevel::Sev2);
    assert_eq!(incident.state, IncidentState::Open);
    assert!(incident.channel_id.as_str().starts_with("C-incd-"));
    assert!(
        incident
            .channel_id
            .as_str()
            .ends_with("-1-database-outage-in-prod")
    );

    // The stored record matches what was returned
    let stored = store
        .row_by_channel(incident.channel_id.as_str())
        .expect("stored");
    assert_eq!(stored.commander, Some(SlackUserId::new("U900")));

    // Topic rendered from the refreshed record
    assert_eq!(
        gateway.topics(),
        vec!["SEV 2 | :female-firefighter: <@U900>".to_string()]
    );

    // Declarer and commander invited
    let calls = gateway.calls();
    assert!(calls.contains(&GatewayCall::Invite {
        channel: incident.channel_id.as_str().to_string(),
        users: vec!["U100".into(), "U900".into()],
    }));

    // Announcement in the incident channel, summary in the broadcast channel
    let posts: Vec<String> = calls
        .iter()
        .filter_map(|c| match c {
            GatewayCall::PostMessage { channel, .. } => Some(channel.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        posts,
        vec![incident.channel_id.as_str().to_string(), BROADCAST.to_string()]
    );
}

#[tokio::test]
async fn declared_incident_is_addressable_by_its_channel() {
    let store = MemoryStore::default();
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    let incident = service
        .declare(DeclareParams {
            name: "Checkout latency".into(),
            sev_level: SevLevel::Sev2,
            commander: Some(SlackUserId::new("U900")),
            declared_by: SlackUserId::new("U100"),
        })
        .await
        .expect("declare succeeds");

    let fetched = store
        .get(&incident.channel_id)
        .await
        .expect("lookup succeeds")
        .expect("incident found");
    assert_eq!(fetched, incident);

    let missing = store
        .get(&ChannelId::new("CMISSING"))
        .await
        .expect("lookup succeeds");
    assert!(missing.is_none());
}

#[tokio::test]
async fn declare_without_commander_leaves_commander_blank() {
    let store = MemoryStore::default();
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    let incident = service
        .declare(DeclareParams {
            name: "Paging storm".into(),
            sev_level: SevLevel::Sev3,
            commander: None,
            declared_by: SlackUserId::new("U100"),
        })
        .await
        .expect("declare succeeds");

    assert_eq!(incident.commander, None);
    assert_eq!(gateway.topics(), vec!["SEV 3 |".to_string()]);

    // Only the declarer gets invited
    assert!(gateway.calls().contains(&GatewayCall::Invite {
        channel: incident.channel_id.as_str().to_string(),
        users: vec!["U100".into()],
    }));
}

#[tokio::test]
async fn declare_aborts_when_channel_creation_fails() {
    let store = MemoryStore::default();
    let gateway = RecordingGateway::failing_channel_creation();
    let service = service(&store, &gateway);

    let result = service
        .declare(DeclareParams {
            name: "Broken".into(),
            sev_level: SevLevel::Sev1,
            commander: None,
            declared_by: SlackUserId::new("U100"),
        })
        .await;

    assert!(matches!(result, Err(AppError::Slack(_))));

    // The orphaned name-only row exists but is invisible to reads
    assert_eq!(store.row_count(), 1);
    let open = store.list_open().await.expect("lists");
    assert!(open.is_empty());

    // No downstream side effects ran
    assert!(gateway.calls().is_empty());
}

// =============================================================================
// UpdateSeverity
// =============================================================================

#[tokio::test]
async fn update_severity_updates_store_and_topic() {
    let store = MemoryStore::default();
    store.seed("C1", SevLevel::Sev3, Some("U900"));
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    service
        .handle(mention(Action::UpdateSeverity("1".into()), "C1"))
        .await
        .expect("handled");

    let stored = store.row_by_channel("C1").expect("stored");
    assert_eq!(stored.sev_level, Some(SevLevel::Sev1));
    assert_eq!(
        gateway.topics(),
        vec!["SEV 1 | :female-firefighter: <@U900>".to_string()]
    );
    assert_eq!(gateway.reactions(), vec!["white_check_mark".to_string()]);
}

#[tokio::test]
async fn update_severity_rejects_out_of_range_without_mutating() {
    let store = MemoryStore::default();
    store.seed("C1", SevLevel::Sev2, None);
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    for raw in ["0", "4", "-1", "99", "high", ""] {
        service
            .handle(mention(Action::UpdateSeverity(raw.into()), "C1"))
            .await
            .expect("user errors are handled, not propagated");
    }

    // Stored severity unchanged, topic never touched
    let stored = store.row_by_channel("C1").expect("stored");
    assert_eq!(stored.sev_level, Some(SevLevel::Sev2));
    assert!(gateway.topics().is_empty());

    // Each rejection got a warning reaction and an explanation
    assert_eq!(gateway.reactions(), vec!["warning".to_string(); 6]);
    assert_eq!(
        gateway.ephemerals(),
        vec!["Set a SEV between 1 and 3 please".to_string(); 6]
    );
}

#[tokio::test]
async fn update_severity_without_ack_target_skips_reactions() {
    let store = MemoryStore::default();
    store.seed("C1", SevLevel::Sev3, None);
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    service
        .handle(Instruction {
            action: Action::UpdateSeverity("2".into()),
            actor: SlackUserId::new("U061F7AUR"),
            channel: ChannelId::new("C1"),
            ack: AckTarget::None,
        })
        .await
        .expect("handled");

    assert_eq!(gateway.topics(), vec!["SEV 2 |".to_string()]);
    assert!(gateway.reactions().is_empty());
}

// =============================================================================
// UpdateCommander
// =============================================================================

#[tokio::test]
async fn update_commander_strips_mention_token() {
    let store = MemoryStore::default();
    store.seed("C1", SevLevel::Sev2, None);
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    service
        .handle(mention(
            Action::UpdateCommander("<@U123|alice>".into()),
            "C1",
        ))
        .await
        .expect("handled");

    let stored = store.row_by_channel("C1").expect("stored");
    assert_eq!(stored.commander, Some(SlackUserId::new("U123")));
    assert_eq!(
        gateway.topics(),
        vec!["SEV 2 | :female-firefighter: <@U123>".to_string()]
    );
}

#[tokio::test]
async fn update_commander_rejects_unparsable_user() {
    let store = MemoryStore::default();
    store.seed("C1", SevLevel::Sev2, Some("U900"));
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    service
        .handle(mention(Action::UpdateCommander("notauser".into()), "C1"))
        .await
        .expect("user errors are handled, not propagated");

    let stored = store.row_by_channel("C1").expect("stored");
    assert_eq!(stored.commander, Some(SlackUserId::new("U900")));
    assert!(gateway.topics().is_empty());
    assert_eq!(gateway.reactions(), vec!["warning".to_string()]);
    assert_eq!(gateway.ephemerals(), vec!["Cannot parse user".to_string()]);
}

// =============================================================================
// Close
// =============================================================================

#[tokio::test]
async fn close_is_idempotent() {
    let store = MemoryStore::default();
    store.seed("C1", SevLevel::Sev1, Some("U900"));
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    for _ in 0..2 {
        service
            .handle(mention(Action::Close, "C1"))
            .await
            .expect("close never errors on a known channel");

        let stored = store.row_by_channel("C1").expect("stored");
        assert_eq!(stored.state, IncidentState::Closed);
    }

    // Both runs re-rendered the closed topic and confirmed
    assert_eq!(
        gateway.topics(),
        vec!["Incident Closed | SEV 1 | :female-firefighter: <@U900>".to_string(); 2]
    );
    assert_eq!(gateway.reactions(), vec!["white_check_mark".to_string(); 2]);
}

// =============================================================================
// Unknown channel
// =============================================================================

#[tokio::test]
async fn operations_on_unknown_channel_have_no_side_effects() {
    let store = MemoryStore::default();
    store.seed("C1", SevLevel::Sev2, None);
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    for action in [
        Action::UpdateSeverity("2".into()),
        Action::UpdateCommander("U123".into()),
        Action::Close,
    ] {
        service
            .handle(mention(action, "CUNKNOWN"))
            .await
            .expect("surfaced to the user, not propagated");
    }

    // The one real incident is untouched
    let stored = store.row_by_channel("C1").expect("stored");
    assert_eq!(stored.sev_level, Some(SevLevel::Sev2));
    assert_eq!(stored.commander, None);
    assert_eq!(stored.state, IncidentState::Open);

    // No topics were set; the user got told each time
    assert!(gateway.topics().is_empty());
    assert_eq!(gateway.ephemerals().len(), 3);
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn dashboard_lists_only_open_incidents() {
    let store = MemoryStore::default();
    store.seed("C1", SevLevel::Sev1, Some("U900"));
    store.seed("C2", SevLevel::Sev3, None);
    store.seed("C3", SevLevel::Sev2, None);
    let gateway = RecordingGateway::default();
    let service = service(&store, &gateway);

    service
        .handle(mention(Action::Close, "C3"))
        .await
        .expect("closed");

    service
        .publish_dashboard(&SlackUserId::new("U777"))
        .await
        .expect("published");

    assert!(gateway.calls().contains(&GatewayCall::PublishHome {
        user: "U777".into(),
        section_count: 2,
    }));
}
