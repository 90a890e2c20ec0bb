//! Error types for sentry-core

use std::path::PathBuf;

/// Result type for sentry-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sentry-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No user configuration directory is available on this platform
    #[error("No user configuration directory available")]
    NoConfigDir,

    /// Configuration file extension is not a supported format
    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Configuration file exists but could not be parsed
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from sentry-fs
    #[error(transparent)]
    Fs(#[from] sentry_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
