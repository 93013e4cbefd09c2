use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The durable entity a suggestion proposes to create or modify.
/// Writes belong exclusively to the decision engine.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CanonicalRecord {
    pub id: i64,
    pub fields: serde_json::Value,
    pub submitted_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
