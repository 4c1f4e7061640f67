//! Default configuration values for remote-cmdline

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub logging: LoggingDefaults,
    pub extraction: ExtractionDefaults,
    pub output: OutputDefaults,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Default extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionDefaults {
    pub timeout_ms: u64,
    pub worker_threads: usize,
    pub include_image_path: bool,
}

/// Default output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDefaults {
    pub format: String,
    pub split_arguments: bool,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        logging: LoggingDefaults {
            level: "warn".to_string(),
        },
        extraction: ExtractionDefaults {
            timeout_ms: 5000,
            worker_threads: num_cpus::get().min(8),
            include_image_path: false,
        },
        output: OutputDefaults {
            format: "text".to_string(),
            split_arguments: false,
        },
    }
}
