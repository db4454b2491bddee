//! Error types for spendscope-config

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML format: {message}")]
    InvalidYaml { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field value: {field} - {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Dotted path of the offending field, e.g. `charts.legend_limit`
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { field } | ConfigError::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }

    /// What to do about it
    pub fn hint(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => {
                "Run `spendscope --print-default-config > config.yaml` to create one".to_string()
            }
            ConfigError::Io { .. } => "Check the file permissions".to_string(),
            ConfigError::InvalidYaml { .. } => "Compare the file with `spendscope --print-default-config`".to_string(),
            ConfigError::MissingField { field } => format!("Set '{}' in the config file", field),
            ConfigError::InvalidValue { field, .. } => {
                format!("Fix '{}' or remove it to use the default", field)
            }
        }
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
