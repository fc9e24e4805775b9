//! Configuration for the NeuroPath engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Engine parameters handed to a session at construction.
///
/// Sessions are explicit owned objects; there is no process-wide engine
/// instance. Callers hold and pass their own configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Window capacity `C`
    pub capacity: usize,

    /// Minimum samples `M` before the score math runs (`2 <= M <= C`;
    /// gaze stability is computed over consecutive sample pairs)
    pub min_to_score: usize,

    /// Tick period
    #[serde(with = "duration_ms_serde")]
    pub tick_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: 600,
            min_to_score: 10,
            tick_interval: Duration::from_millis(100),
        }
    }
}

impl EngineConfig {
    /// Check invariants: non-zero window, `2 <= min_to_score <= capacity`,
    /// non-zero tick period.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be non-zero".to_string()));
        }
        if self.min_to_score < 2 || self.min_to_score > self.capacity {
            return Err(ConfigError::Invalid(format!(
                "min_to_score must be in 2..={} (got {}); gaze stability \
                 needs at least one consecutive sample pair",
                self.capacity, self.min_to_score
            )));
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "tick_interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Persistent configuration for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Engine parameters
    pub engine: EngineConfig,

    /// Path for exported record stores
    pub export_path: PathBuf,

    /// Path for state and logs
    pub data_path: PathBuf,

    /// Remote analysis endpoint, if configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    /// Bearer token for the remote endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neuropath-engine");

        Self {
            engine: EngineConfig::default(),
            export_path: data_dir.join("exports"),
            data_path: data_dir,
            remote_url: None,
            remote_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::Io(e.to_string()))?;
            let config: Config =
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
            config.engine.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::Io(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neuropath-engine")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path).map_err(|e| ConfigError::Io(e.to_string()))?;
        std::fs::create_dir_all(&self.data_path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("serialize error: {0}")]
    Serialize(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Serde support for Duration as milliseconds.
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
