pub mod rest;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two user-triggerable decision actions attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Approve,
    Reject,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Approve => "approve",
            ActionKind::Reject => "reject",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(ActionKind::Approve),
            "reject" => Some(ActionKind::Reject),
            _ => None,
        }
    }
}

/// A decision control bound to one suggestion. Serialized into the
/// notification so the transport can echo the binding back on click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    pub action: ActionKind,
    pub suggestion_id: i64,
}

impl Control {
    pub fn custom_id(&self) -> String {
        format!("suggestion:{}:{}", self.suggestion_id, self.action.as_str())
    }

    /// Inverse of [`Control::custom_id`].
    pub fn parse_custom_id(custom_id: &str) -> Option<Self> {
        let mut parts = custom_id.splitn(3, ':');
        if parts.next() != Some("suggestion") {
            return None;
        }
        let suggestion_id: i64 = parts.next()?.parse().ok()?;
        let action = ActionKind::parse(parts.next()?)?;
        Some(Control {
            action,
            suggestion_id,
        })
    }
}

/// Rendered notification body, transport-agnostic.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub submitter: String,
    pub submitted_at: DateTime<Utc>,
}

/// A control click delivered by the transport's callback webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionTrigger {
    pub notification_ref: String,
    pub action: ActionKind,
    pub actor_ref: String,
    pub guild_ref: String,
    /// Short-lived token the transport accepts private replies on.
    pub reply_token: String,
}

/// Boundary to the chat/notification platform. The engine never talks
/// HTTP directly; implementations carry the wire details.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post a notification with its decision controls.
    /// Returns the platform's notification id.
    async fn send_notification(
        &self,
        channel_ref: &str,
        content: &NotificationContent,
        controls: &[Control],
    ) -> anyhow::Result<String>;

    /// Reply privately to the actor behind a trigger.
    async fn respond_privately(&self, reply_token: &str, message: &str) -> anyhow::Result<()>;

    async fn resolve_channel_by_name(
        &self,
        guild_ref: &str,
        name: &str,
    ) -> anyhow::Result<Option<String>>;

    /// Role names the actor currently holds in the guild. Resolved fresh
    /// per decision so role changes take effect immediately.
    async fn actor_roles(&self, guild_ref: &str, actor_ref: &str)
        -> anyhow::Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_id_round_trips() {
        let control = Control {
            action: ActionKind::Approve,
            suggestion_id: 42,
        };
        assert_eq!(control.custom_id(), "suggestion:42:approve");

        let parsed = Control::parse_custom_id("suggestion:42:approve").unwrap();
        assert_eq!(parsed.action, ActionKind::Approve);
        assert_eq!(parsed.suggestion_id, 42);
    }

    #[test]
    fn malformed_custom_ids_are_rejected() {
        assert!(Control::parse_custom_id("ticket:42:approve").is_none());
        assert!(Control::parse_custom_id("suggestion:abc:approve").is_none());
        assert!(Control::parse_custom_id("suggestion:42:defer").is_none());
        assert!(Control::parse_custom_id("suggestion:42").is_none());
    }
}
