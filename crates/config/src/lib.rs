//! Configuration loading, validation, and management for Coursebot.
//!
//! Loads configuration from `coursebot.toml` (or an explicit path) with
//! environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use coursebot_core::{
    ChapterConvention, ContextAssembler, ContextMode, DocumentStore, InstructionSource,
    KeywordIndex, Topic,
};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "coursebot.toml";

/// The root configuration structure.
///
/// Maps directly to `coursebot.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Anthropic API key. Usually supplied via `ANTHROPIC_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override of the Anthropic API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model used for every chat request
    #[serde(default = "default_model")]
    pub model: String,

    /// Max tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Client-side timeout for one completion call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Course material locations and context assembly
    #[serde(default)]
    pub course: CourseConfig,

    /// Replacement keyword index. Empty = built-in chapters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<TopicConfig>,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_request_timeout_secs() -> u64 {
    60
}

/// Redact a secret string for Debug output.
/// A blank key counts as unset.
fn non_blank(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

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
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("gateway", &self.gateway)
            .field("course", &self.course)
            .field("topics", &self.topics.len())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// CORS origins. Empty = any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "0.0.0.0".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseConfig {
    /// Directory holding the course materials (scanned recursively)
    #[serde(default = "default_knowledge_base_dir")]
    pub knowledge_base_dir: PathBuf,

    /// Optional system instructions file
    #[serde(default = "default_instructions_file")]
    pub instructions_file: PathBuf,

    /// Name prefix marking chapter documents, followed by a digit
    #[serde(default = "default_chapter_prefix")]
    pub chapter_prefix: String,

    /// "selective" (default) or "full"
    #[serde(default)]
    pub context_mode: ContextMode,
}

fn default_knowledge_base_dir() -> PathBuf {
    PathBuf::from("knowledge_base")
}
fn default_instructions_file() -> PathBuf {
    PathBuf::from("instructions.txt")
}
fn default_chapter_prefix() -> String {
    "Ch".into()
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            knowledge_base_dir: default_knowledge_base_dir(),
            instructions_file: default_instructions_file(),
            chapter_prefix: default_chapter_prefix(),
            context_mode: ContextMode::default(),
        }
    }
}

/// One `[[topics]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    pub id: String,
    pub keywords: Vec<String>,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Path resolution: `explicit`, then `$COURSEBOT_CONFIG`, then
    /// `./coursebot.toml`. Environment overrides are applied afterwards:
    /// - `ANTHROPIC_API_KEY` (only if the file sets no key)
    /// - `COURSEBOT_MODEL`
    /// - `COURSEBOT_KNOWLEDGE_BASE`
    /// - `COURSEBOT_INSTRUCTIONS`
    /// - `COURSEBOT_PORT`
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("COURSEBOT_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
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

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.api_key = non_blank(config.api_key.take());

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.api_key = non_blank(self.api_key.take());
        if self.api_key.is_none() {
            self.api_key = non_blank(lookup("ANTHROPIC_API_KEY"));
        }
        if let Some(model) = lookup("COURSEBOT_MODEL") {
            self.model = model;
        }
        if let Some(dir) = lookup("COURSEBOT_KNOWLEDGE_BASE") {
            self.course.knowledge_base_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("COURSEBOT_INSTRUCTIONS") {
            self.course.instructions_file = PathBuf::from(file);
        }
        if let Some(port) = lookup("COURSEBOT_PORT") {
            self.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("COURSEBOT_PORT is not a valid port: {port}"))
            })?;
        }
        Ok(())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError("max_tokens must be > 0".into()));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if self.course.chapter_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "course.chapter_prefix must not be empty".into(),
            ));
        }

        self.keyword_index()?;
        Ok(())
    }

    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// The configured keyword index, or the built-in one.
    pub fn keyword_index(&self) -> Result<KeywordIndex, ConfigError> {
        if self.topics.is_empty() {
            return Ok(KeywordIndex::builtin());
        }

        let topics = self
            .topics
            .iter()
            .map(|t| Topic::new(t.id.clone(), t.keywords.iter().cloned()))
            .collect();
        KeywordIndex::new(topics).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    pub fn document_store(&self) -> DocumentStore {
        DocumentStore::new(&self.course.knowledge_base_dir)
    }

    pub fn instruction_source(&self) -> InstructionSource {
        InstructionSource::file(&self.course.instructions_file)
    }

    pub fn context_assembler(&self) -> ContextAssembler {
        ContextAssembler::new(
            ChapterConvention::new(self.course.chapter_prefix.trim()),
            self.course.context_mode,
        )
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            gateway: GatewayConfig::default(),
            course: CourseConfig::default(),
            topics: vec![],
        }
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
