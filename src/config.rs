use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::github::cache::DEFAULT_CAPACITY;
use crate::github::{
    ClientConfig, DEFAULT_API_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};

/// Root configuration structure, deserialized from `.repoprobe/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubSettings,
}

/// The `[github]` table. Every key is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure.
    pub max_retries: u32,
    pub cache_capacity: usize,
    pub user_agent: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_retries: DEFAULT_MAX_RETRIES,
            cache_capacity: DEFAULT_CAPACITY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Build client settings. The token is taken from `token_override`, then the
    /// config file, then `env_token` (normally `GITHUB_TOKEN`).
    pub fn client_config(
        &self,
        token_override: Option<&str>,
        env_token: Option<&str>,
    ) -> ClientConfig {
        let token = [token_override, self.github.token.as_deref(), env_token]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(str::to_string);

        ClientConfig {
            api_url: self.github.api_url.clone(),
            token,
            timeout: Duration::from_secs(self.github.timeout_secs),
            max_retries: self.github.max_retries,
            cache_capacity: self.github.cache_capacity,
            user_agent: self.github.user_agent.clone(),
        }
    }
}

/// Load configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_dir>/.repoprobe/config.toml`
/// 3. `~/.config/repoprobe/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_dir.join(".repoprobe").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("repoprobe").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}
