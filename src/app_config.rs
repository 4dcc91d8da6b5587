use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO), or "auto" for auto-detection
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation engine to use
    #[serde(default)]
    pub engine: TranslationEngine,

    /// Translator tuning settings
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Retry policy for orchestration-level resilience
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Engine credentials and endpoint overrides
    #[serde(default)]
    pub secrets: EngineSecrets,

    /// Path of the durable translation memory file.
    /// Defaults to a file under the user data directory when absent.
    #[serde(default)]
    pub memory_path: Option<PathBuf>,
}

/// Translation engine type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranslationEngine {
    // @engine: Multi-endpoint Google with Lingva fallback
    #[default]
    Google,
    // @engine: DeepL web scraper (free, no API key)
    DeeplWeb,
    // @engine: Official DeepL API (free or pro plan)
    DeeplApi,
}

impl TranslationEngine {
    // @returns: Human-readable engine name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google Translate",
            Self::DeeplWeb => "DeepL Web (Free)",
            Self::DeeplApi => "DeepL API",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::DeeplWeb => "deepl_web".to_string(),
            Self::DeeplApi => "deepl_api".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "deepl_web" => Ok(Self::DeeplWeb),
            "deepl_api" => Ok(Self::DeeplApi),
            _ => Err(anyhow!("Unsupported translator engine: {}", s)),
        }
    }
}

/// Translator tuning settings shared by all engines
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslatorConfig {
    // @field: Max cumulative characters per batch
    #[serde(default = "default_batch_char_limit")]
    pub batch_char_limit: usize,

    // @field: Max entries per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    // @field: Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Optional proxy URL for outbound requests
    #[serde(default)]
    pub proxy: Option<String>,

    // @field: Similarity threshold for near-duplicate grouping
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            batch_char_limit: default_batch_char_limit(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            proxy: None,
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

/// Retry policy for the orchestration-level retry executor
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct RetryPolicy {
    // @field: Total attempts before the last error is propagated
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    // @field: Multiplier applied to the delay after each failure
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    // @field: Upper bound of the uniform jitter added to each delay, in seconds
    #[serde(default = "default_backoff_jitter")]
    pub backoff_jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_factor: default_backoff_factor(),
            backoff_jitter: default_backoff_jitter(),
        }
    }
}

/// Engine credentials and endpoint overrides
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EngineSecrets {
    // @field: DeepL API key (required for the deepl_api engine)
    #[serde(default)]
    pub deepl_api_key: Option<String>,

    // @field: DeepL plan ("free" or "pro"), auto-detected from the key if absent
    #[serde(default)]
    pub deepl_api_plan: Option<String>,

    // @field: DeepL API URL override
    #[serde(default)]
    pub deepl_api_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            engine: TranslationEngine::default(),
            translator: TranslatorConfig::default(),
            retry: RetryPolicy::default(),
            secrets: EngineSecrets::default(),
            memory_path: None,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration")?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<()> {
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language cannot be empty"));
        }
        if self.translator.batch_char_limit == 0 {
            return Err(anyhow!("batch_char_limit must be greater than zero"));
        }
        if self.translator.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(anyhow!("max_attempts must be greater than zero"));
        }
        if self.retry.backoff_factor < 1.0 {
            return Err(anyhow!("backoff_factor must be at least 1.0"));
        }
        if !(0.0..=1.0).contains(&self.translator.similarity_threshold) {
            return Err(anyhow!("similarity_threshold must be within [0.0, 1.0]"));
        }
        Ok(())
    }

    /// Resolve the durable translation memory path, falling back to the
    /// user data directory when no explicit path is configured
    pub fn resolve_memory_path(&self) -> PathBuf {
        if let Some(path) = &self.memory_path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sublocalizer")
            .join("translation_memory.json")
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "tr".to_string()
}

fn default_batch_char_limit() -> usize {
    6000
}

fn default_batch_size() -> usize {
    20
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_similarity_threshold() -> f64 {
    0.985
}

fn default_max_attempts() -> u32 {
    4
}

fn default_backoff_factor() -> f64 {
    1.5
}

fn default_backoff_jitter() -> f64 {
    0.25
}
