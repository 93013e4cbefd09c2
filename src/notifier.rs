//! Turns a pending suggestion into a channel notification with live
//! approve/reject controls, and records the control-to-suggestion binding.

use std::sync::Arc;

use tracing::debug;

use crate::errors::EngineError;
use crate::models::profile::SubmitterProfile;
use crate::models::suggestion::{Suggestion, SuggestionKind};
use crate::registry::ControlRegistry;
use crate::store::SuggestionStore;
use crate::transport::{ActionKind, ChatTransport, Control, NotificationContent};

pub struct SuggestionNotifier {
    store: Arc<dyn SuggestionStore>,
    transport: Arc<dyn ChatTransport>,
    registry: Arc<ControlRegistry>,
    channel_ref: String,
}

impl SuggestionNotifier {
    pub fn new(
        store: Arc<dyn SuggestionStore>,
        transport: Arc<dyn ChatTransport>,
        registry: Arc<ControlRegistry>,
        channel_ref: String,
    ) -> Self {
        Self {
            store,
            transport,
            registry,
            channel_ref,
        }
    }

    /// Render and post one suggestion, then register and persist its
    /// control binding. Returns the posted notification ref.
    ///
    /// Malformed suggestions surface as [`EngineError::Malformed`]; the
    /// caller decides whether that ends the cycle (it should not).
    pub async fn notify(&self, suggestion: &Suggestion) -> Result<String, EngineError> {
        suggestion.validate()?;

        let profile = self
            .store
            .lookup_submitter_profile(&suggestion.submitted_by)
            .await
            .map_err(EngineError::Store)?
            .unwrap_or_else(|| SubmitterProfile::fallback(&suggestion.submitted_by));

        let content = render(suggestion, &profile);
        let controls = [
            Control {
                action: ActionKind::Approve,
                suggestion_id: suggestion.id,
            },
            Control {
                action: ActionKind::Reject,
                suggestion_id: suggestion.id,
            },
        ];

        let notification_ref = self
            .transport
            .send_notification(&self.channel_ref, &content, &controls)
            .await
            .map_err(EngineError::Transport)?;

        self.registry.insert(&notification_ref, suggestion.id);
        self.store
            .set_notification_ref(suggestion.id, &notification_ref)
            .await
            .map_err(EngineError::Store)?;

        debug!(
            suggestion_id = suggestion.id,
            notification_ref = %notification_ref,
            "suggestion notified"
        );
        Ok(notification_ref)
    }
}

fn render(suggestion: &Suggestion, profile: &SubmitterProfile) -> NotificationContent {
    let title = match suggestion.kind {
        SuggestionKind::Create => {
            format!("Suggestion #{} — new record proposed", suggestion.id)
        }
        SuggestionKind::Update => format!(
            "Suggestion #{} — update to record #{}",
            suggestion.id,
            // validate() guarantees the target is present for update-kind
            suggestion.target_record_id.unwrap_or_default()
        ),
    };

    let body = serde_json::to_string_pretty(&suggestion.payload)
        .unwrap_or_else(|_| suggestion.payload.to_string());

    NotificationContent {
        title,
        body,
        submitter: profile.display_name.clone(),
        submitted_at: suggestion.created_at,
    }
}
