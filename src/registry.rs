//! Process-wide map from a posted notification id to the suggestion its
//! controls decide.
//!
//! Bindings are plain data, not closures: they are persisted on the
//! suggestion row when a notification is sent and re-registered here at
//! startup, so controls posted before a restart keep working. No eviction;
//! volume is bounded by moderation throughput, not request rate.

use dashmap::DashMap;
use tracing::debug;

use crate::store::SuggestionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBinding {
    pub suggestion_id: i64,
}

#[derive(Default)]
pub struct ControlRegistry {
    bindings: DashMap<String, ControlBinding>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, notification_ref: &str, suggestion_id: i64) {
        self.bindings
            .insert(notification_ref.to_string(), ControlBinding { suggestion_id });
    }

    pub fn lookup(&self, notification_ref: &str) -> Option<ControlBinding> {
        self.bindings.get(notification_ref).map(|b| *b)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Re-register bindings for every still-pending suggestion that has a
    /// persisted notification ref. Returns how many were restored.
    pub async fn rehydrate(&self, store: &dyn SuggestionStore) -> anyhow::Result<usize> {
        let pending = store.list_pending_notified().await?;
        let mut restored = 0;
        for suggestion in &pending {
            if let Some(nref) = &suggestion.notification_ref {
                self.insert(nref, suggestion.id);
                restored += 1;
            }
        }
        debug!(restored, "control registry rehydrated");
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_lookup() {
        let registry = ControlRegistry::new();
        registry.insert("msg-1", 42);
        assert_eq!(registry.lookup("msg-1").unwrap().suggestion_id, 42);
        assert!(registry.lookup("msg-2").is_none());
    }

    #[test]
    fn reinsert_overwrites() {
        let registry = ControlRegistry::new();
        registry.insert("msg-1", 1);
        registry.insert("msg-1", 2);
        assert_eq!(registry.lookup("msg-1").unwrap().suggestion_id, 2);
        assert_eq!(registry.len(), 1);
    }
}
