use std::sync::Arc;

use crate::errors::EngineError;
use crate::transport::ChatTransport;

/// Decides whether an actor may approve or reject suggestions: the process
/// owner always may; anyone else needs one of the configured moderator
/// roles in the originating guild. Roles are resolved fresh on every
/// decision, never cached, so revocations take effect immediately.
pub struct Authorizer {
    owner_id: String,
    mod_roles: Vec<String>,
    transport: Arc<dyn ChatTransport>,
}

impl Authorizer {
    pub fn new(owner_id: String, mod_roles: Vec<String>, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            owner_id,
            mod_roles,
            transport,
        }
    }

    pub async fn may_decide(
        &self,
        guild_ref: &str,
        actor_ref: &str,
    ) -> Result<bool, EngineError> {
        if actor_ref == self.owner_id {
            return Ok(true);
        }
        let roles = self
            .transport
            .actor_roles(guild_ref, actor_ref)
            .await
            .map_err(EngineError::Transport)?;
        Ok(roles
            .iter()
            .any(|held| self.mod_roles.iter().any(|wanted| wanted == held)))
    }
}
