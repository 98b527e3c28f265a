//! Configuration errors.
//!
//! Stage failures (fetch, extraction, write) belong to the crates that own
//! those stages.

use thiserror::Error;

/// Errors raised while locating, parsing or checking the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The platform has no per-user config directory
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// An explicitly requested config file does not exist
    #[error("config file not found at {path}")]
    NotFound {
        /// Requested path
        path: String,
    },

    /// The file is not valid TOML for [`crate::AppConfig`]
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The effective config could not be rendered back to TOML
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Reading the config file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value is present but unusable
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Dotted key, e.g. `target.url`
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
