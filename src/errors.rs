use thiserror::Error;

/// Failures the lifecycle engine can hit while polling, notifying, or
/// applying decisions.
///
/// Compare-and-set misses and authorization denials are *not* errors;
/// they are ordinary decision outcomes reported back to the acting user
/// (see [`crate::decision::DecisionOutcome`]). Everything here is either
/// transient infrastructure trouble, confined to the cycle or trigger it
/// occurred in, or a malformed row that needs operator follow-up.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("datastore error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),

    #[error("suggestion {id} is missing required field `{field}`")]
    Malformed { id: i64, field: &'static str },
}

impl EngineError {
    /// True for failures that clear up by waiting for the next poll tick,
    /// as opposed to rows that will never become valid.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Store(_) | EngineError::Transport(_))
    }
}
