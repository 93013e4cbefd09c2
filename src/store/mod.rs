pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::profile::SubmitterProfile;
use crate::models::suggestion::{Suggestion, SuggestionStatus};

/// Typed gateway to the two logical tables the engine owns a view of:
/// the pending-suggestions queue and the canonical records table.
///
/// The datastore is the single source of truth for suggestion status; the
/// engine keeps no status cache, so `compare_and_set_status` is the sole
/// authority for the at-most-one-transition invariant.
#[async_trait]
pub trait SuggestionStore: Send + Sync {
    /// Pending suggestions created strictly after `since`, oldest first
    /// (ties broken by id so dispatch order is deterministic).
    async fn list_pending_since(&self, since: DateTime<Utc>)
        -> anyhow::Result<Vec<Suggestion>>;

    /// Pending suggestions that already carry a posted notification ref.
    /// Used once at startup to rehydrate the control registry.
    async fn list_pending_notified(&self) -> anyhow::Result<Vec<Suggestion>>;

    async fn get_suggestion(&self, id: i64) -> anyhow::Result<Option<Suggestion>>;

    /// Conditionally move `id` from `from` to `to`, stamping the deciding
    /// actor and update time. Returns true iff this call won the transition.
    async fn compare_and_set_status(
        &self,
        id: i64,
        from: SuggestionStatus,
        to: SuggestionStatus,
        decided_by: &str,
    ) -> anyhow::Result<bool>;

    /// Persist the chat notification id posted for a suggestion so its
    /// controls can be rebound after a restart.
    async fn set_notification_ref(&self, id: i64, notification_ref: &str)
        -> anyhow::Result<()>;

    /// Insert a canonical record from an approved create-suggestion.
    /// Returns the new record id.
    async fn insert_record(
        &self,
        fields: &serde_json::Value,
        submitted_by: &str,
    ) -> anyhow::Result<i64>;

    /// Patch an existing canonical record from an approved
    /// update-suggestion. Returns false when the target does not resolve.
    async fn update_record(&self, id: i64, fields: &serde_json::Value)
        -> anyhow::Result<bool>;

    async fn lookup_submitter_profile(
        &self,
        user_ref: &str,
    ) -> anyhow::Result<Option<SubmitterProfile>>;
}
