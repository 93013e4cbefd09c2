//! REST client for the chat platform: message posting with interactive
//! controls, ephemeral replies to triggers, and guild lookups.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::transport::{ChatTransport, Control, NotificationContent};

#[derive(Clone)]
pub struct RestTransport {
    client: reqwest::Client,
    base: String,
    token: String,
}

#[derive(Deserialize)]
struct MessageCreated {
    id: String,
}

#[derive(Deserialize)]
struct ChannelEntry {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct MemberEntry {
    roles: Vec<String>,
}

impl RestTransport {
    pub fn new(base: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .user_agent("Curator/1.0")
                .build()
                .expect("failed to build transport HTTP client"),
            base: base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl ChatTransport for RestTransport {
    async fn send_notification(
        &self,
        channel_ref: &str,
        content: &NotificationContent,
        controls: &[Control],
    ) -> anyhow::Result<String> {
        let payload = json!({
            "title": content.title,
            "body": content.body,
            "footer": format!("submitted by {} at {}", content.submitter,
                content.submitted_at.to_rfc3339()),
            "controls": controls.iter().map(|c| json!({
                "label": c.action.as_str(),
                "custom_id": c.custom_id(),
            })).collect::<Vec<_>>(),
        });

        let resp = self
            .client
            .post(format!("{}/channels/{}/messages", self.base, channel_ref))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .context("failed to post notification")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("transport returned error: status={}, body={}", status, body);
        }

        let created: MessageCreated = resp
            .json()
            .await
            .context("failed to decode notification response")?;
        Ok(created.id)
    }

    async fn respond_privately(&self, reply_token: &str, message: &str) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(format!("{}/interactions/{}/reply", self.base, reply_token))
            .bearer_auth(&self.token)
            .json(&json!({ "message": message, "private": true }))
            .send()
            .await
            .context("failed to send private response")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("transport returned error: status={}, body={}", status, body);
        }
        Ok(())
    }

    async fn resolve_channel_by_name(
        &self,
        guild_ref: &str,
        name: &str,
    ) -> anyhow::Result<Option<String>> {
        let resp = self
            .client
            .get(format!("{}/guilds/{}/channels", self.base, guild_ref))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("failed to list guild channels")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("transport returned error: status={}", status);
        }

        let channels: Vec<ChannelEntry> = resp
            .json()
            .await
            .context("failed to decode channel list")?;
        Ok(channels.into_iter().find(|c| c.name == name).map(|c| c.id))
    }

    async fn actor_roles(
        &self,
        guild_ref: &str,
        actor_ref: &str,
    ) -> anyhow::Result<Vec<String>> {
        let resp = self
            .client
            .get(format!(
                "{}/guilds/{}/members/{}",
                self.base, guild_ref, actor_ref
            ))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("failed to fetch guild member")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("transport returned error: status={}", status);
        }

        let member: MemberEntry = resp.json().await.context("failed to decode member")?;
        Ok(member.roles)
    }
}
