//! Configuration loading, validation, and management for graphhook.
//!
//! Loads configuration from `~/.graphhook/config.toml` with environment
//! variable overrides. Validated once at startup and then passed by value
//! into every component that needs it.

use graphhook_core::ResultLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.graphhook/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookConfig {
    /// Knowledge-graph search server
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Context injection settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Transcript capture settings
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where the capture counter and anchor live
    #[serde(default)]
    pub state: StateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_node_search_path")]
    pub node_search_path: String,

    #[serde(default = "default_fact_search_path")]
    pub fact_search_path: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_node_search_path() -> String {
    "/search/nodes".into()
}
fn default_fact_search_path() -> String {
    "/search".into()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            node_search_path: default_node_search_path(),
            fact_search_path: default_fact_search_path(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// The secondary query fetches `primary * overfetch_multiplier` to leave
    /// room for backfill after deduplication
    #[serde(default = "default_overfetch_multiplier")]
    pub overfetch_multiplier: usize,

    /// Total time after which the injection is flagged as degraded
    #[serde(default = "default_latency_budget_ms")]
    pub latency_budget_ms: u64,

    /// Results shown per context section
    #[serde(default = "default_primary_limits")]
    pub primary: ResultLimits,
}

fn default_primary_limits() -> ResultLimits {
    ResultLimits::new(3, 6)
}
fn default_overfetch_multiplier() -> usize {
    2
}
fn default_latency_budget_ms() -> u64 {
    5_000
}

impl ContextConfig {
    /// Limits for the secondary (over-fetched) query.
    pub fn secondary(&self) -> ResultLimits {
        self.primary.scaled(self.overfetch_multiplier)
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_limits(),
            overfetch_multiplier: default_overfetch_multiplier(),
            latency_budget_ms: default_latency_budget_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Qualifying user turns per periodic capture
    #[serde(default = "default_interval")]
    pub interval: u32,

    /// Window size when the anchor is missing or not found
    #[serde(default = "default_fallback_window")]
    pub fallback_window: usize,

    /// Substrings marking a user turn as non-conversational
    #[serde(default = "default_control_markers")]
    pub control_markers: Vec<String>,

    /// A session-end capture within this many seconds of a pre-compaction
    /// capture is skipped
    #[serde(default = "default_forced_dedup_secs")]
    pub forced_dedup_secs: u64,

    /// Pause before reading the transcript on a forced trigger
    #[serde(default = "default_forced_settle_ms")]
    pub forced_settle_ms: u64,
}

fn default_interval() -> u32 {
    10
}
fn default_fallback_window() -> usize {
    10
}
fn default_control_markers() -> Vec<String> {
    vec![
        "[Request interrupted".into(),
        "<command-name>".into(),
        "<local-command".into(),
        "Examine the conversation transcript provided in the system prompt".into(),
    ]
}
fn default_forced_dedup_secs() -> u64 {
    600
}
fn default_forced_settle_ms() -> u64 {
    1_000
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            fallback_window: default_fallback_window(),
            control_markers: default_control_markers(),
            forced_dedup_secs: default_forced_dedup_secs(),
            forced_settle_ms: default_forced_settle_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory (default `~/.graphhook/logs`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Write logs to `<directory>/graphhook.log` instead of stderr
    #[serde(default)]
    pub to_file: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    /// State directory (default `~/.graphhook/state`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl HookConfig {
    /// Load configuration from the default location with env overrides.
    ///
    /// Precedence: env vars > config file > defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply env overrides.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
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

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("GRAPHHOOK_SERVER_URL") {
            self.retrieval.base_url = url;
        }
        if let Ok(dir) = std::env::var("GRAPHHOOK_LOG_DIR") {
            self.logging.directory = Some(PathBuf::from(dir));
        }
        if let Ok(dir) = std::env::var("GRAPHHOOK_STATE_DIR") {
            self.state.directory = Some(PathBuf::from(dir));
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".graphhook")
    }

    /// Effective log directory.
    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .directory
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("logs"))
    }

    /// Effective state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.state
            .directory
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("state"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context.primary.nodes == 0 || self.context.primary.edges == 0 {
            return Err(ConfigError::ValidationError(
                "context.primary node and edge targets must be > 0".into(),
            ));
        }

        if self.context.overfetch_multiplier < 1 {
            return Err(ConfigError::ValidationError(
                "context.overfetch_multiplier must be >= 1".into(),
            ));
        }

        if self.capture.interval == 0 {
            return Err(ConfigError::ValidationError(
                "capture.interval must be > 0".into(),
            ));
        }

        if self.capture.fallback_window == 0 {
            return Err(ConfigError::ValidationError(
                "capture.fallback_window must be > 0".into(),
            ));
        }

        if self.retrieval.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "retrieval.base_url must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
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
