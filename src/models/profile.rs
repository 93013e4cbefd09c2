use serde::{Deserialize, Serialize};

/// Read-only submitter lookup used to decorate notifications.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubmitterProfile {
    pub user_ref: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl SubmitterProfile {
    /// Deterministic fallback when no profile row exists for a submitter.
    pub fn fallback(user_ref: &str) -> Self {
        Self {
            user_ref: user_ref.to_string(),
            display_name: format!("user {user_ref}"),
            avatar_url: None,
        }
    }
}
