//! Decision handling: the only code path that moves a suggestion out of
//! `pending`, and the only writer of canonical records.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::auth::Authorizer;
use crate::errors::EngineError;
use crate::models::suggestion::{Suggestion, SuggestionKind, SuggestionStatus};
use crate::registry::ControlRegistry;
use crate::store::SuggestionStore;
use crate::transport::{ActionKind, ActionTrigger, ChatTransport};

/// What a decision attempt came to. Conflicts and denials live here, not
/// in `EngineError`; they are answers for the acting user, not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    Approved {
        suggestion_id: i64,
        /// Set when a create-suggestion produced a new canonical record.
        record_id: Option<i64>,
    },
    Rejected {
        suggestion_id: i64,
    },
    /// Lost the compare-and-set: someone else decided first.
    AlreadyDecided {
        suggestion_id: i64,
    },
    NotFound {
        suggestion_id: i64,
    },
    PermissionDenied,
    /// The notification ref does not map to any known suggestion.
    UnknownControl,
    /// The terminal transition stuck but the canonical apply did not; the
    /// suggestion stays approved with no canonical effect.
    ApplyFailed {
        suggestion_id: i64,
    },
}

impl DecisionOutcome {
    /// The private reply shown to the acting user.
    pub fn message(&self) -> String {
        match self {
            DecisionOutcome::Approved { suggestion_id, .. } => {
                format!("Suggestion {suggestion_id} approved.")
            }
            DecisionOutcome::Rejected { suggestion_id } => {
                format!("Suggestion {suggestion_id} rejected.")
            }
            DecisionOutcome::AlreadyDecided { suggestion_id } => {
                format!("Suggestion {suggestion_id} was already decided.")
            }
            DecisionOutcome::NotFound { suggestion_id } => {
                format!("Suggestion {suggestion_id} not found.")
            }
            DecisionOutcome::PermissionDenied => {
                "You do not have permission to decide suggestions.".to_string()
            }
            DecisionOutcome::UnknownControl => {
                "These controls no longer match a known suggestion.".to_string()
            }
            DecisionOutcome::ApplyFailed { suggestion_id } => format!(
                "Suggestion {suggestion_id} was approved, but applying the change failed; \
                 operators have been notified."
            ),
        }
    }
}

/// Core state machine: authorize-free, transport-free. The CLI drives it
/// directly as the owner; the trigger handler wraps it with authorization
/// and private responses.
pub struct DecisionEngine {
    store: Arc<dyn SuggestionStore>,
}

impl DecisionEngine {
    pub fn new(store: Arc<dyn SuggestionStore>) -> Self {
        Self { store }
    }

    /// Attempt the terminal transition for `suggestion_id` and, on
    /// approval, apply the proposed change to canonical records.
    pub async fn decide(
        &self,
        suggestion_id: i64,
        action: ActionKind,
        actor: &str,
    ) -> Result<DecisionOutcome, EngineError> {
        let Some(suggestion) = self
            .store
            .get_suggestion(suggestion_id)
            .await
            .map_err(EngineError::Store)?
        else {
            return Ok(DecisionOutcome::NotFound { suggestion_id });
        };

        let target_status = match action {
            ActionKind::Approve => SuggestionStatus::Approved,
            ActionKind::Reject => SuggestionStatus::Rejected,
        };

        // Conditioned on status still being pending: under concurrent
        // clicks exactly one caller wins, everyone else lands here false.
        let won = self
            .store
            .compare_and_set_status(
                suggestion_id,
                SuggestionStatus::Pending,
                target_status,
                actor,
            )
            .await
            .map_err(EngineError::Store)?;

        if !won {
            return Ok(DecisionOutcome::AlreadyDecided { suggestion_id });
        }

        info!(
            suggestion_id,
            action = action.as_str(),
            actor,
            "suggestion decided"
        );

        if action == ActionKind::Reject {
            return Ok(DecisionOutcome::Rejected { suggestion_id });
        }

        // The transition and the apply are two separate writes; a failure
        // past this point leaves the suggestion approved and is reported,
        // never silently swallowed.
        match self.apply(&suggestion).await {
            Ok(record_id) => Ok(DecisionOutcome::Approved {
                suggestion_id,
                record_id,
            }),
            Err(e) => {
                error!(
                    suggestion_id,
                    error = %e,
                    "canonical apply failed after approval"
                );
                Ok(DecisionOutcome::ApplyFailed { suggestion_id })
            }
        }
    }

    async fn apply(&self, suggestion: &Suggestion) -> anyhow::Result<Option<i64>> {
        match suggestion.kind {
            SuggestionKind::Create => {
                let record_id = self
                    .store
                    .insert_record(&suggestion.payload, &suggestion.submitted_by)
                    .await?;
                info!(
                    suggestion_id = suggestion.id,
                    record_id, "canonical record created"
                );
                Ok(Some(record_id))
            }
            SuggestionKind::Update => {
                let target = suggestion
                    .target_record_id
                    .ok_or_else(|| anyhow::anyhow!("update suggestion has no target record"))?;
                let updated = self
                    .store
                    .update_record(target, &suggestion.payload)
                    .await?;
                if !updated {
                    anyhow::bail!("target record {target} does not exist");
                }
                info!(
                    suggestion_id = suggestion.id,
                    record_id = target,
                    "canonical record updated"
                );
                Ok(None)
            }
        }
    }
}

/// Reacts to control triggers from the transport: resolves the binding,
/// authorizes the actor, runs the engine, and answers privately.
pub struct DecisionHandler {
    engine: DecisionEngine,
    transport: Arc<dyn ChatTransport>,
    registry: Arc<ControlRegistry>,
    authorizer: Authorizer,
}

impl DecisionHandler {
    pub fn new(
        engine: DecisionEngine,
        transport: Arc<dyn ChatTransport>,
        registry: Arc<ControlRegistry>,
        authorizer: Authorizer,
    ) -> Self {
        Self {
            engine,
            transport,
            registry,
            authorizer,
        }
    }

    pub async fn handle_trigger(
        &self,
        trigger: &ActionTrigger,
    ) -> Result<DecisionOutcome, EngineError> {
        let outcome = self.evaluate(trigger).await?;

        // A lost private reply should not undo or retry the decision.
        if let Err(e) = self
            .transport
            .respond_privately(&trigger.reply_token, &outcome.message())
            .await
        {
            warn!(
                notification_ref = %trigger.notification_ref,
                error = %e,
                "failed to deliver private response"
            );
        }
        Ok(outcome)
    }

    async fn evaluate(&self, trigger: &ActionTrigger) -> Result<DecisionOutcome, EngineError> {
        let Some(binding) = self.registry.lookup(&trigger.notification_ref) else {
            warn!(
                notification_ref = %trigger.notification_ref,
                "trigger for unknown notification"
            );
            return Ok(DecisionOutcome::UnknownControl);
        };

        if !self
            .authorizer
            .may_decide(&trigger.guild_ref, &trigger.actor_ref)
            .await?
        {
            return Ok(DecisionOutcome::PermissionDenied);
        }

        self.engine
            .decide(binding.suggestion_id, trigger.action, &trigger.actor_ref)
            .await
    }
}
