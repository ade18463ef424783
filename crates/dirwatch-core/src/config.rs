use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::DirwatchError;

/// Global dirwatch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// What to watch and how often
    pub watch: WatchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Event output
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory to watch (not recursive)
    pub directory: PathBuf,

    /// File name suffix to watch, including the dot (case-sensitive)
    pub extension: String,

    /// Text to search for; empty matches every line
    pub magic: String,

    /// Seconds between ticks
    pub interval_secs: f64,

    /// Multiplier of the interval to wait after the directory could not be read
    pub error_backoff: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (e.g. "info", "dirwatch_core=debug")
    pub level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// How events are reported
    pub format: EventFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFormat {
    /// Log lines only
    #[default]
    Log,
    /// JSON lines on stdout, plus log lines
    Json,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            extension: ".txt".to_string(),
            magic: String::new(),
            interval_secs: 3.0,
            error_backoff: 2.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl WatchConfig {
    /// Reject settings the polling loop cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if !self.interval_secs.is_finite() || self.interval_secs <= 0.0 {
            return Err(DirwatchError::Config(format!(
                "interval must be a positive number of seconds, got {}",
                self.interval_secs
            )));
        }
        if !self.error_backoff.is_finite() || self.error_backoff < 1.0 {
            return Err(DirwatchError::Config(format!(
                "error backoff must be at least 1.0, got {}",
                self.error_backoff
            )));
        }
        if Duration::try_from_secs_f64(self.interval_secs).is_err() {
            return Err(DirwatchError::Config(format!(
                "interval of {} seconds is too large",
                self.interval_secs
            )));
        }
        let delay = self.interval_secs * self.error_backoff;
        if Duration::try_from_secs_f64(delay).is_err() {
            return Err(DirwatchError::Config(format!(
                "error delay of {} seconds (interval x backoff) is too large",
                delay
            )));
        }
        Ok(())
    }

    /// Time between ticks, saturating for settings `validate` rejects
    pub fn poll_interval(&self) -> Duration {
        secs_to_duration(self.interval_secs)
    }

    /// Time to wait after a directory error
    pub fn error_delay(&self) -> Duration {
        secs_to_duration(self.interval_secs * self.error_backoff)
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

impl Config {
    /// Load config from default locations (in order of precedence):
    /// 1. $PWD/.dirwatch.toml
    /// 2. $XDG_CONFIG_HOME/dirwatch/config.toml
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(content) = std::fs::read_to_string(".dirwatch.toml") {
            match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Ignoring invalid .dirwatch.toml: {}", e),
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("dirwatch").join("config.toml");
            if let Ok(content) = std::fs::read_to_string(&config_path) {
                match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring invalid {}: {}", config_path.display(), e),
                }
            }
        }

        Self::default()
    }

    /// Load config from a specific file
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
