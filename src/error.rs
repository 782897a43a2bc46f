//! Error types for nrstore
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for nrstore operations
#[derive(Debug, Error)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store is not connected")]
    NotConnected,

    #[error("Backend error: {0}")]
    Backend(String),

    // -------------------------------------------------------------------------
    // Library Errors
    // -------------------------------------------------------------------------
    /// A library key holds a value that is not a `{meta, body}` document
    #[error("Corrupt library entry at {key}: {reason}")]
    CorruptEntry { key: String, reason: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error came from the transport and a fresh connection may fix it
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Network(_) | Error::NotConnected)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        if err.kind() == redis::ErrorKind::InvalidClientConfig {
            Error::Config(err.to_string())
        } else if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
            Error::Network(err.to_string())
        } else {
            Error::Backend(err.to_string())
        }
    }
}
