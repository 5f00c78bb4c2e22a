//! Error types for the Intervue client

use thiserror::Error;

/// The main error type for intervue core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local input validation errors (empty username, etc.)
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors from the persistent store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state that fails to deserialize into the expected shape
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Session lifecycle errors
    #[error("Session error: {0}")]
    Session(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for intervue core operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Deserialization(e.to_string())
    }
}
