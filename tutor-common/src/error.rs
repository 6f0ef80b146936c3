//! Common error types for the tutor services

use thiserror::Error;

/// Common result type for tutor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the store, configuration and service layers
#[derive(Error, Debug)]
pub enum Error {
    /// Store failure (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O failure while preparing the root folder or reading config
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML configuration file
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Stored JSON column could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

}

impl Error {
    /// True when the error came from the SQLite store
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Database(_))
    }
}
