use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Credential for the chat transport REST API.
    pub transport_token: String,
    /// Base URL of the chat transport REST API.
    pub transport_api: String,
    /// Group/server the moderation channel lives in.
    pub guild_id: String,
    /// Channel name resolved at startup to post notifications into.
    pub channel_name: String,
    /// Actor allowed to decide regardless of roles.
    pub owner_id: String,
    /// Role names allowed to decide suggestions. Must be non-empty.
    pub mod_roles: Vec<String>,
    /// Poll period in seconds. Recommended 10–30.
    pub poll_secs: u64,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let transport_token = std::env::var("CURATOR_TRANSPORT_TOKEN")
        .map_err(|_| anyhow::anyhow!("CURATOR_TRANSPORT_TOKEN is not set"))?;
    if transport_token.trim().is_empty() {
        anyhow::bail!("CURATOR_TRANSPORT_TOKEN is empty");
    }

    let owner_id = std::env::var("CURATOR_OWNER_ID")
        .map_err(|_| anyhow::anyhow!("CURATOR_OWNER_ID is not set"))?;

    let mod_roles: Vec<String> = std::env::var("CURATOR_MOD_ROLES")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    // An empty role set would authorize nobody but the owner; refuse to
    // start rather than run misconfigured.
    if mod_roles.is_empty() {
        anyhow::bail!("CURATOR_MOD_ROLES is empty; configure at least one moderator role name");
    }

    Ok(Config {
        port: std::env::var("CURATOR_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8088),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/curator".into()),
        transport_token,
        transport_api: std::env::var("CURATOR_TRANSPORT_API")
            .unwrap_or_else(|_| "https://chat.example.com/api".into()),
        guild_id: std::env::var("CURATOR_GUILD_ID")
            .map_err(|_| anyhow::anyhow!("CURATOR_GUILD_ID is not set"))?,
        channel_name: std::env::var("CURATOR_CHANNEL_NAME")
            .unwrap_or_else(|_| "moderation".into()),
        owner_id,
        mod_roles,
        poll_secs: std::env::var("CURATOR_POLL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15),
    })
}
