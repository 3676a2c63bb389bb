//! Error types for Passview core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these to
//! user-facing messages and exit codes.

use thiserror::Error;

/// Result type alias for Passview operations.
pub type Result<T> = std::result::Result<T, PassviewError>;

/// Core error type for Passview operations.
#[derive(Debug, Error)]
pub enum PassviewError {
    /// Missing or invalid passphrase/URL; recoverable through the config form
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fetch failure or non-success HTTP status (status text kept verbatim)
    #[error("Network error: {0}")]
    Network(String),

    /// Wrong passphrase or corrupt ciphertext/key material
    #[error("Decryption error: {0}")]
    Decrypt(String),

    /// Export content does not have the expected shape
    #[error("Data error: {0}")]
    Data(String),

    /// Clipboard access failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Operation not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl PassviewError {
    /// Whether this error means the user has to revisit the configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, PassviewError::Config(_))
    }
}
