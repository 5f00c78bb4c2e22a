//! Base trait for chat transports

use async_trait::async_trait;
use thiserror::Error;

/// Error type for transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// One backend reply, common to all three operations.
///
/// `session_id` and `current_node` are optional on the wire; when absent the
/// caller keeps its previous values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Bot-authored response text
    pub response: String,
    /// Canonical session id, when the server chose to send one
    pub session_id: Option<String>,
    /// Backend-side conversation cursor
    pub current_node: Option<String>,
}

/// The three backend operations, each a single request/response exchange
/// with no implicit retry.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Establish a session for `username`, offering a client-minted id the
    /// server may override.
    async fn init(&self, username: &str, candidate_session_id: &str)
        -> TransportResult<ChatReply>;

    /// Send one user message within an established session.
    async fn exchange(&self, session_id: &str, message: &str) -> TransportResult<ChatReply>;

    /// Restart the conversation behind an established session.
    async fn reset(&self, session_id: &str) -> TransportResult<ChatReply>;
}
