//! Configuration loading and management for bookwise.
//!
//! Loads settings from `bookwise.toml` with environment variable overrides for
//! the API key. Every setting has a default, so the file itself is optional.

use crate::prompt::RequestMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "bookwise.toml";

/// Environment variables checked for the API key, in priority order
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key: set GEMINI_API_KEY or api.gemini_key")]
    MissingApiKey,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,
    /// Ground book summaries with Google Search instead of a response schema
    pub search_grounding: bool,
    /// Transport timeout for one model request
    pub timeout_secs: u64,
    /// API root, without the `/v1beta` path
    pub base_url: String,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub gemini_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of off, error, warn, info, debug, trace
    pub level: String,
    /// Log file used while the TUI owns the terminal
    pub file: PathBuf,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from the default location (bookwise.toml in cwd or home)
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::read(&path)?,
            None => Config::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Override the API key from the first non-empty environment variable
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            self.api.gemini_key = Some(key);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home_config = dirs::home_dir()?
            .join(".config")
            .join("bookwise")
            .join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }

    /// Get the API key. Its absence is fatal at startup.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api
            .gemini_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Request mode used by the summary flow
    pub fn summary_mode(&self) -> RequestMode {
        if self.agent.search_grounding {
            RequestMode::SearchGrounded
        } else {
            RequestMode::Structured
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            search_grounding: true,
            timeout_secs: 60,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: PathBuf::from("bookwise.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::default();
        assert_eq!(config.agent.model, "gemini-2.5-flash");
        assert_eq!(config.summary_mode(), RequestMode::SearchGrounded);
        assert_eq!(config.log.level, "info");
        assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[agent]\nsearch_grounding = false\ntimeout_secs = 5\n\n[api]\ngemini_key = \"from-file\""
        )
        .unwrap();

        let mut config = Config::read(file.path()).unwrap();
        config.apply_env(no_env);

        assert_eq!(config.agent.model, "gemini-2.5-flash");
        assert_eq!(config.agent.timeout_secs, 5);
        assert_eq!(config.summary_mode(), RequestMode::Structured);
        assert_eq!(config.api_key().unwrap(), "from-file");
        assert_eq!(config.log.file, PathBuf::from("bookwise.log"));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[agent\nmodel = ").unwrap();
        assert!(matches!(
            Config::read(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load_from(&dir.path().join("absent.toml")),
            Err(ConfigError::ReadError(_))
        ));
    }

    #[test]
    fn env_overrides_file_key_in_priority_order() {
        let mut config = Config::default();
        config.api.gemini_key = Some("from-file".into());

        config.apply_env(|name| match name {
            "GEMINI_API_KEY" => Some("  ".into()),
            "API_KEY" => Some("legacy".into()),
            _ => None,
        });
        assert_eq!(config.api_key().unwrap(), "legacy");

        config.apply_env(|name| (name == "GEMINI_API_KEY").then(|| "primary".to_string()));
        assert_eq!(config.api_key().unwrap(), "primary");
    }

    #[test]
    fn blank_key_is_missing() {
        let mut config = Config::default();
        config.api.gemini_key = Some("   ".into());
        assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey)));
    }
}
