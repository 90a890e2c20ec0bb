//! Error types for the CLI

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the terminal
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] sentry_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
