//! Error types for engine operations

use intervue_client::TransportError;
use thiserror::Error;

/// The error type for session and conversation operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Local input validation, never sent to the backend
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation needs an active session and there is none
    #[error("No active session")]
    NoSession,

    /// Network or HTTP failure; state is left unchanged apart from
    /// optimistic appends
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Persistence or core-level failures
    #[error(transparent)]
    Core(#[from] intervue_core::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
