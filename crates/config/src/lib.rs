//! Configuration loading and validation for Roster.
//!
//! Loads configuration from `~/.roster/config.toml` with environment
//! variable overrides. Validates all settings at startup. Configuration is
//! always passed explicitly into the session; nothing here is global.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Step bound applied to each invocation unless overridden.
pub const DEFAULT_RECURSION_LIMIT: u32 = 15;

/// Checkpoint backends understood by the session builder.
pub const CHECKPOINT_BACKENDS: &[&str] = &["sqlite", "file", "memory"];

/// The root configuration structure.
///
/// Maps directly to `~/.roster/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Checkpoint persistence
    #[serde(default)]
    pub checkpoint: CheckpointConfig,

    /// Employee vector index
    #[serde(default)]
    pub search: SearchConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("agent", &self.agent)
            .field("checkpoint", &self.checkpoint)
            .field("search", &self.search)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Display name used in logs
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model used for query vectors
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_provider_name() -> String {
    "gemini".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".into()
}
fn default_model() -> String {
    "gemini-2.0-flash-001".into()
}
fn default_embedding_model() -> String {
    "text-embedding-004".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Fills `{system_message}` in the prompt template
    #[serde(default = "default_system_message")]
    pub system_message: String,

    /// Maximum AGENT/TOOLS steps per invocation
    #[serde(default = "default_recursion_limit")]
    pub recursion_limit: u32,
}

fn default_system_message() -> String {
    "You are helpful HR Chatbot Agent.".into()
}
fn default_recursion_limit() -> u32 {
    DEFAULT_RECURSION_LIMIT
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_message: default_system_message(),
            recursion_limit: default_recursion_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// One of "sqlite", "file", "memory"
    #[serde(default = "default_checkpoint_backend")]
    pub backend: String,

    /// Database file (sqlite) or directory (file); unused for memory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_checkpoint_backend() -> String {
    "sqlite".into()
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            backend: default_checkpoint_backend(),
            path: None,
        }
    }
}

impl CheckpointConfig {
    /// Configured path, or the backend's default under the config dir.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None if self.backend == "file" => AppConfig::config_dir().join("checkpoints"),
            None => AppConfig::config_dir().join("checkpoints.db"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// JSONL file of pre-embedded employee documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,
}

impl SearchConfig {
    pub fn resolved_index_path(&self) -> PathBuf {
        self.index_path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("employees.jsonl"))
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.roster/config.toml).
    ///
    /// Also checks environment variables:
    /// - `ROSTER_API_KEY` (highest priority), `GEMINI_API_KEY`, `OPENAI_API_KEY`
    /// - `ROSTER_MODEL`, `ROSTER_BASE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("ROSTER_API_KEY")
                .or_else(|| lookup("GEMINI_API_KEY"))
                .or_else(|| lookup("OPENAI_API_KEY"));
        }
        if let Some(model) = lookup("ROSTER_MODEL") {
            self.provider.model = model;
        }
        if let Some(url) = lookup("ROSTER_BASE_URL") {
            self.provider.base_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".roster")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.recursion_limit == 0 {
            return Err(ConfigError::ValidationError(
                "agent.recursion_limit must be at least 1".into(),
            ));
        }

        if !CHECKPOINT_BACKENDS.contains(&self.checkpoint.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "checkpoint.backend must be one of {}, got '{}'",
                CHECKPOINT_BACKENDS.join(", "),
                self.checkpoint.backend
            )));
        }

        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("provider.base_url must not be empty".into()));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `roster init`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: ProviderConfig::default(),
            agent: AgentConfig::default(),
            checkpoint: CheckpointConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
