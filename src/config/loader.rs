//! Configuration loader for remote-cmdline
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,

    #[serde(default = "default_extraction")]
    pub extraction: ExtractionConfig,

    #[serde(default = "default_output")]
    pub output: OutputConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Upper bound on a whole batch, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    #[serde(default = "default_include_image_path")]
    pub include_image_path: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// `"text"` or `"json"`
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_split_arguments")]
    pub split_arguments: bool,
}

impl OutputConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if the file doesn't exist
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }
}

/// Loads `remote-cmdline.toml` from the working directory, or the defaults
pub fn load_config() -> Result<Config, ConfigError> {
    ConfigLoader::new("remote-cmdline.toml").load_or_default()
}

// Default functions for serde
fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_config().logging.level,
    }
}

fn default_extraction() -> ExtractionConfig {
    let defaults = default_config();
    ExtractionConfig {
        timeout_ms: defaults.extraction.timeout_ms,
        worker_threads: defaults.extraction.worker_threads,
        include_image_path: defaults.extraction.include_image_path,
    }
}

fn default_output() -> OutputConfig {
    let defaults = default_config();
    OutputConfig {
        format: defaults.output.format,
        split_arguments: defaults.output.split_arguments,
    }
}

// Individual field defaults
fn default_log_level() -> String {
    default_config().logging.level
}

fn default_timeout_ms() -> u64 {
    default_config().extraction.timeout_ms
}

fn default_worker_threads() -> usize {
    default_config().extraction.worker_threads
}

fn default_include_image_path() -> bool {
    default_config().extraction.include_image_path
}

fn default_format() -> String {
    default_config().output.format
}

fn default_split_arguments() -> bool {
    default_config().output.split_arguments
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging: default_logging(),
            extraction: default_extraction(),
            output: default_output(),
        }
    }
}
