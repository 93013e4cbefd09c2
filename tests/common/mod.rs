//! In-memory store and transport doubles for the integration suite.
//!
//! Both implement the same traits the Postgres store and REST transport
//! implement, so the engine under test is wired exactly as in production.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use curator::auth::Authorizer;
use curator::decision::{DecisionEngine, DecisionHandler};
use curator::models::profile::SubmitterProfile;
use curator::models::record::CanonicalRecord;
use curator::models::suggestion::{Suggestion, SuggestionKind, SuggestionStatus};
use curator::notifier::SuggestionNotifier;
use curator::poller::CursorPoller;
use curator::registry::ControlRegistry;
use curator::store::SuggestionStore;
use curator::transport::{ChatTransport, Control, NotificationContent};

pub const OWNER: &str = "owner-1";
pub const MOD_ROLE: &str = "Moderator";
pub const CHANNEL: &str = "chan-1";

// ── In-memory store ───────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    suggestions: Mutex<HashMap<i64, Suggestion>>,
    records: Mutex<HashMap<i64, CanonicalRecord>>,
    profiles: Mutex<HashMap<String, SubmitterProfile>>,
    next_record_id: AtomicI64,
    pub insert_record_calls: AtomicUsize,
    pub fail_listing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_record_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    pub fn add_suggestion(&self, suggestion: Suggestion) {
        self.suggestions
            .lock()
            .unwrap()
            .insert(suggestion.id, suggestion);
    }

    pub fn add_record(&self, record: CanonicalRecord) {
        self.next_record_id
            .fetch_max(record.id + 1, Ordering::SeqCst);
        self.records.lock().unwrap().insert(record.id, record);
    }

    pub fn add_profile(&self, profile: SubmitterProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_ref.clone(), profile);
    }

    pub fn suggestion(&self, id: i64) -> Suggestion {
        self.suggestions.lock().unwrap()[&id].clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn records(&self) -> Vec<CanonicalRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl SuggestionStore for MemoryStore {
    async fn list_pending_since(
        &self,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Suggestion>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            anyhow::bail!("simulated datastore outage");
        }
        let mut rows: Vec<Suggestion> = self
            .suggestions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.status == SuggestionStatus::Pending && s.created_at > since)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.created_at, s.id));
        Ok(rows)
    }

    async fn list_pending_notified(&self) -> anyhow::Result<Vec<Suggestion>> {
        let mut rows: Vec<Suggestion> = self
            .suggestions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.status == SuggestionStatus::Pending && s.notification_ref.is_some())
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.created_at, s.id));
        Ok(rows)
    }

    async fn get_suggestion(&self, id: i64) -> anyhow::Result<Option<Suggestion>> {
        Ok(self.suggestions.lock().unwrap().get(&id).cloned())
    }

    async fn compare_and_set_status(
        &self,
        id: i64,
        from: SuggestionStatus,
        to: SuggestionStatus,
        decided_by: &str,
    ) -> anyhow::Result<bool> {
        let mut suggestions = self.suggestions.lock().unwrap();
        match suggestions.get_mut(&id) {
            Some(s) if s.status == from => {
                s.status = to;
                s.decided_by = Some(decided_by.to_string());
                s.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_notification_ref(
        &self,
        id: i64,
        notification_ref: &str,
    ) -> anyhow::Result<()> {
        if let Some(s) = self.suggestions.lock().unwrap().get_mut(&id) {
            s.notification_ref = Some(notification_ref.to_string());
        }
        Ok(())
    }

    async fn insert_record(
        &self,
        fields: &serde_json::Value,
        submitted_by: &str,
    ) -> anyhow::Result<i64> {
        self.insert_record_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.next_record_id.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().insert(
            id,
            CanonicalRecord {
                id,
                fields: fields.clone(),
                submitted_by: submitted_by.to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update_record(
        &self,
        id: i64,
        fields: &serde_json::Value,
    ) -> anyhow::Result<bool> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(&id) {
            Some(record) => {
                record.fields = fields.clone();
                record.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn lookup_submitter_profile(
        &self,
        user_ref: &str,
    ) -> anyhow::Result<Option<SubmitterProfile>> {
        Ok(self.profiles.lock().unwrap().get(user_ref).cloned())
    }
}

// ── In-memory transport ───────────────────────────────────────

pub struct SentNotification {
    pub channel_ref: String,
    pub content: NotificationContent,
    pub controls: Vec<Control>,
    pub notification_ref: String,
}

#[derive(Default)]
pub struct MemoryTransport {
    pub sent: Mutex<Vec<SentNotification>>,
    pub replies: Mutex<Vec<(String, String)>>,
    roles: Mutex<HashMap<String, Vec<String>>>,
    pub fail_send: AtomicBool,
    counter: AtomicU64,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_roles(&self, actor_ref: &str, roles: &[&str]) {
        self.roles.lock().unwrap().insert(
            actor_ref.to_string(),
            roles.iter().map(|r| r.to_string()).collect(),
        );
    }

    pub fn sent_titles(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.content.title.clone())
            .collect()
    }

    pub fn last_reply(&self) -> Option<String> {
        self.replies.lock().unwrap().last().map(|(_, m)| m.clone())
    }
}

#[async_trait]
impl ChatTransport for MemoryTransport {
    async fn send_notification(
        &self,
        channel_ref: &str,
        content: &NotificationContent,
        controls: &[Control],
    ) -> anyhow::Result<String> {
        if self.fail_send.load(Ordering::SeqCst) {
            anyhow::bail!("simulated transport outage");
        }
        let notification_ref = format!("msg-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1);
        self.sent.lock().unwrap().push(SentNotification {
            channel_ref: channel_ref.to_string(),
            content: content.clone(),
            controls: controls.to_vec(),
            notification_ref: notification_ref.clone(),
        });
        Ok(notification_ref)
    }

    async fn respond_privately(&self, reply_token: &str, message: &str) -> anyhow::Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), message.to_string()));
        Ok(())
    }

    async fn resolve_channel_by_name(
        &self,
        _guild_ref: &str,
        _name: &str,
    ) -> anyhow::Result<Option<String>> {
        Ok(Some(CHANNEL.to_string()))
    }

    async fn actor_roles(
        &self,
        _guild_ref: &str,
        actor_ref: &str,
    ) -> anyhow::Result<Vec<String>> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .get(actor_ref)
            .cloned()
            .unwrap_or_default())
    }
}

// ── Wiring ────────────────────────────────────────────────────

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub transport: Arc<MemoryTransport>,
    pub registry: Arc<ControlRegistry>,
    pub poller: CursorPoller,
    pub handler: DecisionHandler,
}

/// Wire the full engine over in-memory doubles, the same way `serve` does.
pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let transport = Arc::new(MemoryTransport::new());
    let registry = Arc::new(ControlRegistry::new());

    let store_dyn: Arc<dyn SuggestionStore> = store.clone();
    let transport_dyn: Arc<dyn ChatTransport> = transport.clone();

    let notifier = Arc::new(SuggestionNotifier::new(
        store_dyn.clone(),
        transport_dyn.clone(),
        registry.clone(),
        CHANNEL.to_string(),
    ));
    let poller = CursorPoller::new(store_dyn.clone(), notifier, Duration::from_secs(15));

    let authorizer = Authorizer::new(
        OWNER.to_string(),
        vec![MOD_ROLE.to_string()],
        transport_dyn.clone(),
    );
    let handler = DecisionHandler::new(
        DecisionEngine::new(store_dyn),
        transport_dyn,
        registry.clone(),
        authorizer,
    );

    Harness {
        store,
        transport,
        registry,
        poller,
        handler,
    }
}

pub fn pending_suggestion(
    id: i64,
    kind: SuggestionKind,
    target_record_id: Option<i64>,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
) -> Suggestion {
    Suggestion {
        id,
        kind,
        target_record_id,
        payload,
        submitted_by: format!("user-{id}"),
        status: SuggestionStatus::Pending,
        decided_by: None,
        notification_ref: None,
        created_at,
        updated_at: created_at,
    }
}
