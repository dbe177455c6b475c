//! Core error types for wgwatch.
//!
//! Configuration is the only failure the core crate owns; every other
//! subsystem defines its own error enum and the binary composes them.

use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting was provided neither by environment nor by file
    #[error("missing required setting {name} (set the {name} environment variable)")]
    MissingVar {
        /// Environment variable name
        name: String,
    },

    /// Config file not found at an explicitly requested path
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
