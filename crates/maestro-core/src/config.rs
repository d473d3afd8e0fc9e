//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which selects the backend host and tunes the HTTP client.
//!
//! Configuration is stored at `~/.config/maestro/config.json`. The
//! `MAESTRO_API_URL` environment variable overrides the stored backend URL.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::auth::{SessionStorage, StartupExpiryPolicy};

/// Application name used for config/data directory paths
const APP_NAME: &str = "maestro";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that selects the backend host
pub const API_URL_ENV: &str = "MAESTRO_API_URL";

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub startup_expiry: StartupExpiryPolicy,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            startup_expiry: StartupExpiryPolicy::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load the config file (or defaults), then apply the environment override
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Replace the backend URL when an override is set and non-blank
    pub fn with_api_url_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        self.api_url = self.api_url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session and logs
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn session_storage(&self) -> Result<SessionStorage> {
        Ok(SessionStorage::new(self.data_dir()?))
    }

    /// Build an API client (and its session store) for the configured backend
    pub fn api_client(&self) -> Result<ApiClient> {
        let client = ApiClient::connect(
            &self.api_url,
            self.request_timeout_secs,
            self.session_storage()?,
            self.startup_expiry,
        )?;
        Ok(client)
    }
}
