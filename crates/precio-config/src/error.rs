//! # Config Error Types

use thiserror::Error;

/// Result type alias for settings operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures while loading, validating or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read or written.
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML or has wrongly typed values.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but is outside what the engine accepts.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// No explicit path was given and the platform has no config directory.
    #[error("No config path available")]
    NoConfigPath,
}
