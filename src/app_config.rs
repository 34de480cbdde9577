use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::database::DatabaseConnection;
use crate::errors::AppError;

/// Environment variable consulted when a provider has no API key configured
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Retry behavior for provider calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Batch processing settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// Result cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: OpenRouter chat-completion API
    #[default]
    OpenRouter,
    // @provider: Offline mock, always succeeds
    Mock,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenRouter => "OpenRouter",
            Self::Mock => "Mock",
        }
    }

    // @returns: Whether the provider needs an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenRouter)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenRouter => write!(f, "openrouter"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration entry
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type", default)]
    pub kind: ProviderKind,

    // @field: Model name
    #[serde(default = "default_openrouter_model")]
    pub model: String,

    // @field: API key, empty means use OPENROUTER_API_KEY
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_openrouter_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param kind: Provider enum
    // @returns: Provider config with defaults
    pub fn new(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::OpenRouter => Self {
                kind,
                model: default_openrouter_model(),
                api_key: String::new(),
                endpoint: default_openrouter_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            ProviderKind::Mock => Self {
                kind,
                model: String::new(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }

    /// The configured key, or `fallback` when the key is empty
    pub fn api_key_or(&self, fallback: Option<String>) -> String {
        if !self.api_key.trim().is_empty() {
            return self.api_key.clone();
        }
        fallback.unwrap_or_default()
    }

    /// The configured key, falling back to the `OPENROUTER_API_KEY` variable
    pub fn resolved_api_key(&self) -> String {
        self.api_key_or(std::env::var(API_KEY_ENV).ok())
    }
}

/// Translation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Language the Russian words are translated into
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Providers in priority order
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,

    /// Custom system prompt; `{target_language}` is substituted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: default_target_language(),
            providers: default_providers(),
            system_prompt: None,
        }
    }
}

impl TranslationConfig {
    /// Set the model of every provider that takes one
    pub fn override_model(&mut self, model: &str) {
        for provider in self
            .providers
            .iter_mut()
            .filter(|p| p.kind == ProviderKind::OpenRouter)
        {
            provider.model = model.to_string();
        }
    }
}

/// Retry settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts per provider and word
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the second attempt, in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

/// Batch settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchConfig {
    /// Words translated concurrently
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

/// Cache settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheConfig {
    /// Whether results are cached at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Database file; the platform data directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl CacheConfig {
    /// The database file the cache should use
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => DatabaseConnection::default_cache_path(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "German".to_string()
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![ProviderConfig::new(ProviderKind::OpenRouter)]
}

fn default_openrouter_model() -> String {
    "google/gemini-2.0-flash-lite-001".to_string()
}

fn default_openrouter_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3 // Total attempts, not additional ones
}

fn default_initial_backoff_ms() -> u64 {
    2000 // Doubled on each retry
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_max_workers() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load a configuration file, writing the defaults first if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        warn!(
            "Config file not found at '{}', creating default config.",
            path.display()
        );
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        self.validate_with_env_key(std::env::var(API_KEY_ENV).ok())
    }

    /// Validate using `env_key` as the fallback credential
    pub fn validate_with_env_key(&self, env_key: Option<String>) -> Result<(), AppError> {
        if self.translation.target_language.trim().is_empty() {
            return Err(AppError::Configuration(
                "Target language must not be empty".to_string(),
            ));
        }

        if self.translation.providers.is_empty() {
            return Err(AppError::Configuration(
                "No translation providers configured".to_string(),
            ));
        }

        for provider in &self.translation.providers {
            if provider.kind.requires_api_key() && provider.api_key_or(env_key.clone()).is_empty() {
                return Err(AppError::Configuration(format!(
                    "API key is required for {} provider (set api_key or {})",
                    provider.kind.display_name(),
                    API_KEY_ENV
                )));
            }
            if provider.timeout_secs == 0 {
                return Err(AppError::Configuration(format!(
                    "Timeout for {} provider must be greater than zero",
                    provider.kind.display_name()
                )));
            }
        }

        if self.retry.max_retries == 0 {
            return Err(AppError::Configuration(
                "retry.max_retries must be at least 1".to_string(),
            ));
        }

        if !self.retry.backoff_factor.is_finite() || self.retry.backoff_factor < 1.0 {
            return Err(AppError::Configuration(format!(
                "retry.backoff_factor must be at least 1.0, got {}",
                self.retry.backoff_factor
            )));
        }

        if self.batch.max_workers == 0 {
            return Err(AppError::Configuration(
                "batch.max_workers must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
