//! Dashboard configuration loaded from TOML.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Session and assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Cash the seeded portfolio starts with
    pub starting_cash: f64,
    /// Milliseconds between price feed ticks
    pub tick_interval_ms: u64,
    pub assistant: AssistantConfig,
}

/// Where and how to reach the text-generation model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    /// Model name, e.g. `gemini-2.5-flash`
    pub model: String,
    /// API base URL, without a trailing slash
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            starting_cash: 100_000.0,
            tick_interval_ms: 2000,
            assistant: AssistantConfig::default(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AssistantConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DashboardConfig {
    /// Get the default config file path.
    ///
    /// Default path: `<config dir>/tradedesk/config.toml`
    /// Can be overridden with `TRADEDESK_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("TRADEDESK_CONFIG") {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("tradedesk/config.toml"))
            .unwrap_or_else(|| PathBuf::from("tradedesk.toml"))
    }

    /// Load config from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load config from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the session cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.starting_cash.is_finite() || self.starting_cash <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "starting_cash must be a positive amount, got {}",
                self.starting_cash
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.assistant.model.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "assistant.model must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
