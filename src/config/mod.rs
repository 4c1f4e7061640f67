//! Configuration module for remote-cmdline
//!
//! Provides configuration loading, validation, and default settings
//! for the command line tool.

mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, ConfigDefaults};
pub use loader::{
    load_config, Config, ConfigError, ConfigLoader, ExtractionConfig, LoggingConfig, OutputConfig,
};
pub use validator::{validate_config, ConfigValidator};

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;
