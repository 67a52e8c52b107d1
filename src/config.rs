// ABOUTME: Configuration loading for coursebot.
// ABOUTME: Reads ~/.coursebot/config.toml; CLI flags and the environment override it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::chat::Language;

pub const DEFAULT_WELCOME: &str =
    "Hi! I'm the university course assistant. How can I help you today?";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub storage: StorageConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    /// Zero leaves requests unbounded.
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 0,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub language: Language,
    pub welcome_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            language: Language::En,
            welcome_message: DEFAULT_WELCOME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Empty means the platform data directory.
    pub data_dir: String,
}

impl Config {
    /// Load config from ~/.coursebot/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults when it is absent.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".coursebot")
            .join("config.toml")
    }

    /// Directory holding the session id, chat histories, and the log file.
    pub fn data_dir(&self) -> PathBuf {
        if !self.storage.data_dir.trim().is_empty() {
            return PathBuf::from(self.storage.data_dir.trim());
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coursebot")
    }
}
