use std::env;

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::db::DEFAULT_MAX_POOL_SIZE;
use crate::models::Topic;

/// A manager entry from the `MANAGERS` variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerConfig {
    pub vk_id: i64,
    pub topic: Topic,
    pub name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
    pub server_host: String,
    pub server_port: u16,
    pub vk_token: String,
    pub vk_group_id: i64,
    pub vk_api_url: String,
    pub vk_api_version: String,
    pub vk_confirmation_token: Option<String>,
    pub vk_secret: Option<String>,
    pub vk_longpoll_wait: u64,
    pub managers: Vec<ManagerConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_pool_size = env::var("DATABASE_MAX_POOL_SIZE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_POOL_SIZE);
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let vk_token = env::var("VK_TOKEN").context("VK_TOKEN must be set")?;
        let vk_group_id = env::var("VK_GROUP_ID")
            .context("VK_GROUP_ID must be set")?
            .parse()
            .context("VK_GROUP_ID must be an integer")?;
        let vk_api_url = env::var("VK_API_URL").unwrap_or_else(|_| "https://api.vk.com".to_string());
        let vk_api_version = env::var("VK_API_VERSION").unwrap_or_else(|_| "5.199".to_string());
        let vk_confirmation_token = env::var("VK_CONFIRMATION_TOKEN").ok();
        let vk_secret = env::var("VK_SECRET").ok().filter(|value| !value.is_empty());
        let vk_longpoll_wait = env::var("VK_LONGPOLL_WAIT")
            .unwrap_or_else(|_| "25".to_string())
            .parse()
            .context("VK_LONGPOLL_WAIT must be a number of seconds")?;
        let managers = parse_managers(&env::var("MANAGERS").unwrap_or_default())
            .context("MANAGERS must look like `vk_id:topic[:name],...`")?;

        Ok(Self {
            database_url,
            database_max_pool_size,
            server_host,
            server_port,
            vk_token,
            vk_group_id,
            vk_api_url,
            vk_api_version,
            vk_confirmation_token,
            vk_secret,
            vk_longpoll_wait,
            managers,
        })
    }

    pub fn redacted_database_url(&self) -> String {
        redact_database_url(&self.database_url)
    }
}

/// Parses `422634178:life,87654321:scholarship:Anna`.
pub fn parse_managers(raw: &str) -> Result<Vec<ManagerConfig>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let vk_id = parts
                .next()
                .unwrap_or_default()
                .trim()
                .parse()
                .with_context(|| format!("invalid manager vk id in `{entry}`"))?;
            let topic = parts
                .next()
                .ok_or_else(|| anyhow!("missing topic in `{entry}`"))?
                .parse()?;
            let name = parts
                .next()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty());
            Ok(ManagerConfig { vk_id, topic, name })
        })
        .collect()
}

fn redact_database_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) => {
            let _ = parsed.set_password(Some("*****"));
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}
