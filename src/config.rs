//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::{PylonError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub publish: PublishConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot source configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

/// Telemetry publishing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PublishConfig {
    #[serde(default = "default_topic_root")]
    pub topic_root: String,

    #[serde(default = "default_interval_s")]
    pub interval_s: u64,

    #[serde(default = "default_per_battery")]
    pub per_battery: bool,

    #[serde(default = "default_publish_format")]
    pub format: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Empty means log to stderr only
    #[serde(default)]
    pub log_dir: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            topic_root: default_topic_root(),
            interval_s: default_interval_s(),
            per_battery: default_per_battery(),
            format: default_publish_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

// Default value functions
fn default_snapshot_path() -> String { "./stack.json".to_string() }

fn default_topic_root() -> String { "pylontech/sensor/grid_battery/".to_string() }
fn default_interval_s() -> u64 { 2 }
fn default_per_battery() -> bool { true }
fn default_publish_format() -> String { "jsonl".to_string() }

fn default_log_level() -> String { "info".to_string() }

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn invalid(message: impl std::fmt::Display) -> PylonError {
    PylonError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pylon_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.source.snapshot_path.is_empty() {
            return Err(invalid("snapshot_path cannot be empty"));
        }

        if self.publish.topic_root.is_empty() {
            return Err(invalid("topic_root cannot be empty"));
        }

        // Topics are appended directly to the root
        if !self.publish.topic_root.ends_with('/') {
            return Err(invalid("topic_root must end with '/'"));
        }

        if self.publish.interval_s == 0 || self.publish.interval_s > 3600 {
            return Err(invalid("interval_s must be between 1 and 3600"));
        }

        if self.publish.format != "jsonl" {
            return Err(invalid("publish format must be 'jsonl' (only supported format)"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!(
                "log level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
