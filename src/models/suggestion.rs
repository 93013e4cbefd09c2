use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// A user-submitted change request awaiting moderation.
///
/// Rows are created by the external submission path and mutated exactly
/// once by the decision engine; `status` only ever moves out of `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Suggestion {
    pub id: i64,
    pub kind: SuggestionKind,
    /// Required iff `kind == Update`: the canonical record being changed.
    pub target_record_id: Option<i64>,
    /// Free-form proposed content, mirrored into the record on approval.
    pub payload: serde_json::Value,
    pub submitted_by: String,
    pub status: SuggestionStatus,
    pub decided_by: Option<String>,
    /// Chat notification id posted for this suggestion, persisted so the
    /// control binding can be rebuilt after a restart.
    pub notification_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum SuggestionKind {
    Create,
    Update,
}

#[derive(Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionKind::Create => write!(f, "create"),
            SuggestionKind::Update => write!(f, "update"),
        }
    }
}

impl Suggestion {
    /// Check the fields the notifier cannot render without.
    ///
    /// A suggestion failing this check is logged and skipped; the watermark
    /// has already moved past it, so it stays pending until an operator
    /// decides it through the CLI.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.id <= 0 {
            return Err(EngineError::Malformed {
                id: self.id,
                field: "id",
            });
        }
        if self.submitted_by.trim().is_empty() {
            return Err(EngineError::Malformed {
                id: self.id,
                field: "submitted_by",
            });
        }
        if self.kind == SuggestionKind::Update && self.target_record_id.is_none() {
            return Err(EngineError::Malformed {
                id: self.id,
                field: "target_record_id",
            });
        }
        Ok(())
    }
}
