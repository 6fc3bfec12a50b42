//! Engine configuration with documented defaults
//!
//! Loaded from TOML; every section and field may be omitted, in which case
//! the default below applies.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Upper bound for every day-count setting (about ten years)
pub const MAX_CONFIG_DAYS: i64 = 3650;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for the interpretation engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub model: ModelConfig,
    pub retry: RetryConfig,
    pub grounding: GroundingConfig,
    pub defaults: DefaultsConfig,
}

/// Generative backend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Endpoint URL; the wire format is detected from the host
    pub api_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-3-haiku-20240307".into(),
            api_key_env: "LLM_API_KEY".into(),
            timeout_secs: 60,
        }
    }
}

/// Rate-limit retry policy for model calls
///
/// With the defaults a request makes at most 3 calls, sleeping 2s then 4s
/// between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of calls, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on every further retry
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    /// Delay to wait after the given failed attempt (0-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Size of the reference data embedded in prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingConfig {
    /// Events starting this many days before now are still offered as targets
    pub event_lookback_days: i64,
    /// Maximum number of events included
    pub event_limit: usize,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            event_lookback_days: 1,
            event_limit: 30,
        }
    }
}

/// Business defaults applied during resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Meeting action items without a due date are due this many days after the meeting
    pub meeting_task_due_days: i64,
    /// Duration of a generated plan task that states no estimate
    pub plan_task_days: i64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            meeting_task_due_days: 7,
            plan_task_days: 1,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.grounding.event_limit == 0 {
            return Err(ConfigError::Invalid(
                "grounding.event_limit must be at least 1".into(),
            ));
        }
        if !(0..=MAX_CONFIG_DAYS).contains(&self.grounding.event_lookback_days) {
            return Err(ConfigError::Invalid(format!(
                "grounding.event_lookback_days ({}) must be between 0 and {}",
                self.grounding.event_lookback_days, MAX_CONFIG_DAYS
            )));
        }
        if !(0..=MAX_CONFIG_DAYS).contains(&self.defaults.meeting_task_due_days)
            || !(1..=MAX_CONFIG_DAYS).contains(&self.defaults.plan_task_days)
        {
            return Err(ConfigError::Invalid(format!(
                "defaults.meeting_task_due_days must be 0..={max} and defaults.plan_task_days 1..={max}",
                max = MAX_CONFIG_DAYS
            )));
        }
        Ok(())
    }
}
