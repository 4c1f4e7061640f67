//! Configuration validator for remote-cmdline
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, ExtractionConfig, LoggingConfig, OutputConfig};

const VALID_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
const VALID_FORMATS: [&str; 2] = ["text", "json"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_logging(&config.logging)?;
        Self::validate_extraction(&config.extraction)?;
        Self::validate_output(&config.output)?;
        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        if !VALID_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, VALID_LEVELS
            )));
        }
        Ok(())
    }

    fn validate_extraction(extraction: &ExtractionConfig) -> Result<(), ConfigError> {
        if extraction.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "Extraction timeout must be greater than 0".to_string(),
            ));
        }

        if extraction.worker_threads == 0 {
            return Err(ConfigError::Invalid(
                "Worker threads must be at least 1".to_string(),
            ));
        }

        if extraction.worker_threads > 128 {
            return Err(ConfigError::Invalid(
                "Worker threads cannot exceed 128".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_output(output: &OutputConfig) -> Result<(), ConfigError> {
        if !VALID_FORMATS.contains(&output.format.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid output format: {}. Must be one of: {:?}",
                output.format, VALID_FORMATS
            )));
        }
        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = Config::default();
        config.extraction.timeout_ms = 0;
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn test_invalid_thread_count() {
        let mut config = Config::default();
        config.extraction.worker_threads = 0;
        assert!(validate_config(&config).is_err());

        config.extraction.worker_threads = 129;
        assert!(validate_config(&config).is_err());

        config.extraction.worker_threads = 128;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("log level"));
    }

    #[test]
    fn test_format_is_case_insensitive() {
        let mut config = Config::default();
        config.output.format = "JSON".to_string();
        assert!(validate_config(&config).is_ok());

        config.output.format = "yaml".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("output format"));
    }
}
