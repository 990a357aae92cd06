//! Configuration loading, validation, and management for Touchline.
//!
//! Loads configuration from `~/.touchline/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.touchline/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion/embedding endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Completion model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature (pinned to 0.0 for deterministic answers)
    #[serde(default)]
    pub temperature: f32,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Retrieval (vector index) configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Prompt configuration
    #[serde(default)]
    pub prompt: PromptConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_max_tokens() -> u32 {
    4096
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
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("retrieval", &self.retrieval)
            .field("prompt", &self.prompt)
            .finish()
    }
}

/// Vector index service configuration.
///
/// The index is a pre-built, read-only collaborator. `k`, `fetch_k`, and
/// `lambda_mult` parametrize its maximal-marginal-relevance search and are
/// fixed for the whole session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Base URL of the index service
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Collection to query
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Embedding model used for query vectors
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Number of passages returned per query
    #[serde(default = "default_k")]
    pub k: usize,

    /// Candidate pool size for the MMR search
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// MMR relevance/diversity balance (1.0 = pure relevance)
    #[serde(default = "default_lambda_mult")]
    pub lambda_mult: f32,
}

fn default_index_url() -> String {
    "http://127.0.0.1:8000".into()
}
fn default_collection() -> String {
    "matches_2425".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-large".into()
}
fn default_k() -> usize {
    30
}
fn default_fetch_k() -> usize {
    30
}
fn default_lambda_mult() -> f32 {
    0.8
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            collection: default_collection(),
            embedding_model: default_embedding_model(),
            k: default_k(),
            fetch_k: default_fetch_k(),
            lambda_mult: default_lambda_mult(),
        }
    }
}

/// Prompt assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PromptConfig {
    /// Override the built-in persona text entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_override: Option<String>,

    /// Load the column lexicon from a CSV file instead of the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon_file: Option<PathBuf>,

    /// Reporting date stated in the persona (free-form text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_date: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.touchline/config.toml).
    ///
    /// Also checks environment variables:
    /// - `TOUCHLINE_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `TOUCHLINE_BASE_URL`
    /// - `TOUCHLINE_MODEL`
    /// - `TOUCHLINE_INDEX_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("TOUCHLINE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(base_url) = std::env::var("TOUCHLINE_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(model) = std::env::var("TOUCHLINE_MODEL") {
            config.model = model;
        }

        if let Ok(index_url) = std::env::var("TOUCHLINE_INDEX_URL") {
            config.retrieval.index_url = index_url;
        }

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

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".touchline")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.k must be at least 1".into(),
            ));
        }

        if self.retrieval.fetch_k < self.retrieval.k {
            return Err(ConfigError::ValidationError(
                "retrieval.fetch_k must be >= retrieval.k".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.retrieval.lambda_mult) {
            return Err(ConfigError::ValidationError(
                "retrieval.lambda_mult must be between 0.0 and 1.0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            retrieval: RetrievalConfig::default(),
            prompt: PromptConfig::default(),
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
