mod defaults;
mod polling;

#[cfg(test)]
mod tests;

pub use polling::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::TelegrabError;
use defaults::*;

/// Bot API limit on `getUpdates` batch size.
const MAX_BATCH_LIMIT: u32 = 100;

/// Top-level Telegrab configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Bot token issued by @BotFather.
    #[serde(default)]
    pub token: String,
    /// Bot API root. Overridable for local Bot API servers and tests.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Root directory for downloaded files.
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Skip TLS certificate verification.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub polling: PollingConfig,
}

impl Config {
    /// Defaults for everything except the token.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: token.to_string(),
            api_url: default_api_url(),
            download_dir: default_download_dir(),
            log_level: default_log_level(),
            accept_invalid_certs: false,
            polling: PollingConfig::default(),
        }
    }

    /// Check the settings a bot cannot start without.
    pub fn validate(&self) -> Result<(), TelegrabError> {
        if self.token.trim().is_empty() {
            return Err(TelegrabError::Config("bot token is empty".into()));
        }
        if self.polling.limit == 0 || self.polling.limit > MAX_BATCH_LIMIT {
            return Err(TelegrabError::Config(format!(
                "polling.limit must be between 1 and {MAX_BATCH_LIMIT}, got {}",
                self.polling.limit
            )));
        }
        Ok(())
    }

    /// Download directory with `~` expanded.
    pub fn download_path(&self) -> PathBuf {
        PathBuf::from(shellexpand(&self.download_dir))
    }

    /// Token with everything after the bot id masked, for display.
    pub fn redacted_token(&self) -> String {
        match self.token.split_once(':') {
            Some((id, _)) => format!("{id}:***"),
            None if self.token.is_empty() => String::new(),
            None => "***".to_string(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
pub fn load(path: &str) -> Result<Config, TelegrabError> {
    let path = Path::new(path);
    let content = std::fs::read_to_string(path)
        .map_err(|e| TelegrabError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| TelegrabError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}

/// Load configuration, creating the file with defaults when it does not exist.
///
/// A supplied `token` overrides the one stored in the file. Creating a new
/// file requires a token.
pub fn load_or_init(path: &str, token: Option<&str>) -> Result<Config, TelegrabError> {
    let token = token.filter(|t| !t.trim().is_empty());

    if Path::new(path).exists() {
        let mut config = load(path)?;
        if let Some(t) = token {
            config.token = t.to_string();
        }
        return Ok(config);
    }

    let Some(token) = token else {
        return Err(TelegrabError::Config(format!(
            "config file {path} not found and no token supplied"
        )));
    };

    let config = Config::with_token(token);
    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| TelegrabError::Config(format!("failed to render config: {e}")))?;
    std::fs::write(path, rendered)
        .map_err(|e| TelegrabError::Config(format!("unable to create {path}: {e}")))?;
    info!("created config file {path} with default polling settings");

    Ok(config)
}
