use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::types::{Entitlement, Tier};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for VentureLens
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VentureLensConfig {
    /// Completion provider configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Web search provider configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Prompt and enrichment settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Retry settings shared by the completion and search clients.
///
/// The default is a single attempt with no backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Growth factor applied to the delay after each retry
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Upper bound for any single delay
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Retry connection failures and timeouts
    #[serde(default = "default_true")]
    pub retry_on_transport: bool,

    /// Retry 5xx responses
    #[serde(default = "default_true")]
    pub retry_on_server_error: bool,

    /// Retry 429 responses
    #[serde(default = "default_true")]
    pub retry_on_rate_limit: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_backoff_ms: default_max_backoff_ms(),
            retry_on_transport: true,
            retry_on_server_error: true,
            retry_on_rate_limit: true,
        }
    }
}

/// LLM completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Provider: "openai", "openai-compatible", "lmstudio" or "ollama"
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model identifier (e.g., "gpt-4o-mini")
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Base URL of the chat completions API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// API key. Never written back to disk.
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Temperature for the analysis flows
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate for the analysis flows
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

/// How many search queries a flow issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Only the flow's primary query
    #[default]
    Single,
    /// Every candidate query concurrently, merged and deduplicated by URL
    FanOut,
}

/// Web search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search API
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// API key. Without one, searches are skipped and prompts fall back to general knowledge.
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Results requested per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Search depth: "basic" or "advanced"
    #[serde(default = "default_search_depth")]
    pub search_depth: String,

    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub strategy: SearchStrategy,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            api_key: None,
            max_results: default_max_results(),
            search_depth: default_search_depth(),
            timeout_secs: default_search_timeout_secs(),
            strategy: SearchStrategy::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Prompt composition and enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Characters of each search snippet embedded in prompts
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,

    /// Maximum number of search results backfilled into report sources
    #[serde(default = "default_sources_cap")]
    pub sources_cap: usize,

    /// Plan every flow runs under. Set by the operator, never by callers.
    #[serde(default = "default_tier")]
    pub tier: Tier,
}

impl PipelineConfig {
    pub fn entitlement(&self) -> Entitlement {
        Entitlement::new(self.tier)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            snippet_chars: default_snippet_chars(),
            sources_cap: default_sources_cap(),
            tier: default_tier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace" ... "error") or a full filter such as "info,hyper=off"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_max_attempts() -> u32 {
    1
}
fn default_initial_backoff_ms() -> u64 {
    500
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_max_backoff_ms() -> u64 {
    8_000
}
fn default_llm_provider() -> String {
    "openai".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> usize {
    4096
}
fn default_llm_timeout_secs() -> u64 {
    120
}
fn default_search_base_url() -> String {
    "https://api.tavily.com".to_string()
}
fn default_max_results() -> usize {
    5
}
fn default_search_depth() -> String {
    "basic".to_string()
}
fn default_search_timeout_secs() -> u64 {
    20
}
fn default_snippet_chars() -> usize {
    200
}
fn default_sources_cap() -> usize {
    3
}
fn default_tier() -> Tier {
    Tier::Pro
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with layered sources
#[derive(Debug)]
pub struct ConfigManager {
    config: VentureLensConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.venturelens.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        info!("Loading VentureLens configuration...");

        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Log what was loaded. Call after the tracing subscriber is installed.
    pub fn log_summary(&self) {
        let config = &self.config;
        match self.config_path {
            Some(ref path) => info!("Config file: {}", path.display()),
            None => info!("Config file: NONE (using defaults)"),
        }
        info!(
            provider = %config.llm.provider,
            model = %config.llm.model,
            completion_key = config.llm.api_key.is_some(),
            search_key = config.search.api_key.is_some(),
            search_strategy = ?config.search.strategy,
            tier = %config.pipeline.tier,
            "Configuration loaded"
        );
        for warning in Self::startup_warnings(config) {
            warn!("{}", warning);
        }
    }

    /// Problems that do not stop startup but break flows at request time
    pub fn startup_warnings(config: &VentureLensConfig) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if config.llm.api_key.is_none() && config.llm.provider == "openai" {
            warnings.push(
                "No completion API key configured; every flow will fail until OPENAI_API_KEY is set",
            );
        }
        if config.search.api_key.is_none() {
            warnings.push("No search API key configured; prompts will carry no real-time context");
        }
        warnings
    }

    /// Load a specific file, then apply environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(Self::read_toml_file(path)?);
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an already-built configuration
    pub fn from_config(config: VentureLensConfig) -> Result<Self, ConfigError> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".venturelens.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .venturelens.env: {}", e);
                } else {
                    info!("Loaded .venturelens.env from home directory");
                }
            }
        }
    }

    /// Search order:
    /// 1. ./.venturelens.toml
    /// 2. ~/.venturelens/config.toml
    /// 3. Defaults
    fn load_config_file() -> Result<(VentureLensConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".venturelens.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".venturelens").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("No config file found, using defaults");
        Ok((VentureLensConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<VentureLensConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(config: VentureLensConfig) -> VentureLensConfig {
        Self::apply_overrides_with(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Empty values are ignored.
    pub fn apply_overrides_with<F>(mut config: VentureLensConfig, lookup: F) -> VentureLensConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // Completion provider
        if let Some(key) = var("VENTURELENS_LLM_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            config.llm.api_key = Some(SecretString::from(key));
        }
        if let Some(provider) = var("VENTURELENS_LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Some(url) = var("VENTURELENS_LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Some(model) = var("VENTURELENS_MODEL") {
            config.llm.model = model;
        }
        if let Some(temp) = var("VENTURELENS_TEMPERATURE") {
            if let Ok(t) = temp.parse() {
                config.llm.temperature = t;
            }
        }
        if let Some(max_tokens) = var("VENTURELENS_MAX_TOKENS") {
            if let Ok(n) = max_tokens.parse() {
                config.llm.max_tokens = n;
            }
        }

        // Search provider
        if let Some(key) = var("VENTURELENS_SEARCH_API_KEY").or_else(|| var("TAVILY_API_KEY")) {
            config.search.api_key = Some(SecretString::from(key));
        }
        if let Some(url) = var("VENTURELENS_SEARCH_BASE_URL") {
            config.search.base_url = url;
        }
        if let Some(max) = var("VENTURELENS_SEARCH_MAX_RESULTS") {
            if let Ok(n) = max.parse() {
                config.search.max_results = n;
            }
        }
        if let Some(strategy) = var("VENTURELENS_SEARCH_STRATEGY") {
            match strategy.to_lowercase().as_str() {
                "single" => config.search.strategy = SearchStrategy::Single,
                "fan-out" | "fanout" => config.search.strategy = SearchStrategy::FanOut,
                other => warn!("Ignoring unknown VENTURELENS_SEARCH_STRATEGY '{}'", other),
            }
        }

        if let Some(tier) = var("VENTURELENS_TIER") {
            match tier.parse() {
                Ok(tier) => config.pipeline.tier = tier,
                Err(e) => warn!("Ignoring VENTURELENS_TIER: {}", e),
            }
        }

        // Server
        if let Some(host) = var("VENTURELENS_HOST") {
            config.server.host = host;
        }
        if let Some(port) = var("VENTURELENS_PORT") {
            if let Ok(p) = port.parse() {
                config.server.port = p;
            }
        }

        // Logging
        if let Some(level) = var("RUST_LOG") {
            config.logging.level = level;
        }

        config
    }

    pub fn validate_config(config: &VentureLensConfig) -> Result<(), ConfigError> {
        match config.llm.provider.as_str() {
            "openai" | "openai-compatible" | "lmstudio" | "ollama" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid LLM provider: {}. Must be one of: openai, openai-compatible, lmstudio, ollama",
                    other
                )))
            }
        }

        if !(0.0..=2.0).contains(&config.llm.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                config.llm.temperature
            )));
        }

        for (name, retry) in [("llm", &config.llm.retry), ("search", &config.search.retry)] {
            if retry.max_attempts == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{}.retry.max_attempts must be at least 1",
                    name
                )));
            }
            if retry.backoff_multiplier < 1.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{}.retry.backoff_multiplier must be >= 1.0",
                    name
                )));
            }
        }

        match config.search.search_depth.as_str() {
            "basic" | "advanced" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid search depth: {}. Must be one of: basic, advanced",
                    other
                )))
            }
        }

        if config.pipeline.snippet_chars == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.snippet_chars must be greater than 0".to_string(),
            ));
        }

        // Accepts a bare level or any RUST_LOG-style directive list
        if let Err(e) = EnvFilter::try_new(&config.logging.level) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level or filter '{}': {}",
                config.logging.level, e
            )));
        }

        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &VentureLensConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file. API keys are left out.
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = VentureLensConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
