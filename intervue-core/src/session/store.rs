//! Session data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No identity established yet
    Uninitialized,
    /// Identity established with the backend
    Active,
}

/// A session identifier, tagged by how trustworthy it is.
///
/// A `Candidate` is minted locally before the backend has seen it; only a
/// `Confirmed` id (acknowledged or overridden by the server) is ever stored
/// inside a [`Session`]. Keeping the two apart avoids a half-initialized
/// session when an init request fails mid-flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionId {
    /// Client-minted id the backend has not acknowledged yet
    Candidate(String),
    /// Id the backend has acknowledged (or substituted)
    Confirmed(String),
}

impl SessionId {
    /// Mint a fresh random candidate id
    pub fn mint() -> Self {
        SessionId::Candidate(Uuid::new_v4().to_string())
    }

    /// The raw id value
    pub fn as_str(&self) -> &str {
        match self {
            SessionId::Candidate(id) | SessionId::Confirmed(id) => id,
        }
    }

    /// Resolve this id against the one the server returned.
    ///
    /// The server may override the client-chosen id; when it sends a
    /// different non-empty id, the server wins. Otherwise the local value is
    /// promoted to confirmed.
    pub fn confirm(self, server_id: Option<&str>) -> SessionId {
        match server_id {
            Some(id) if !id.is_empty() => SessionId::Confirmed(id.to_string()),
            _ => SessionId::Confirmed(self.into_inner()),
        }
    }

    fn into_inner(self) -> String {
        match self {
            SessionId::Candidate(id) | SessionId::Confirmed(id) => id,
        }
    }
}

/// The identity and cursor state tying a user to a backend conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedSession", into = "PersistedSession")]
pub struct Session {
    /// Name the user entered; empty until initialized
    pub username: String,
    /// Confirmed session id, absent until initialized
    pub id: Option<SessionId>,
    /// Opaque backend-side conversation cursor, informational only
    pub current_node: Option<String>,
}

impl Session {
    /// A session with no identity
    pub fn uninitialized() -> Self {
        Self {
            username: String::new(),
            id: None,
            current_node: None,
        }
    }

    /// Build an active session from a confirmed identity
    pub fn active(
        username: impl Into<String>,
        id: SessionId,
        current_node: Option<String>,
    ) -> Self {
        Self {
            username: username.into(),
            id: Some(id),
            current_node,
        }
    }

    /// Status derived from field presence; `Active` always implies a
    /// non-empty username and id.
    pub fn status(&self) -> SessionStatus {
        if !self.username.is_empty() && self.id.is_some() {
            SessionStatus::Active
        } else {
            SessionStatus::Uninitialized
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == SessionStatus::Active
    }

    /// The raw session id, if any
    pub fn session_id(&self) -> Option<&str> {
        self.id.as_ref().map(|id| id.as_str())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::uninitialized()
    }
}

/// On-disk shape of a session, matching the web client's localStorage layout
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    username: String,
    session_id: String,
    is_init: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_node: Option<String>,
}

impl From<Session> for PersistedSession {
    fn from(session: Session) -> Self {
        let is_init = session.is_active();
        Self {
            username: session.username,
            session_id: session.id.map(SessionId::into_inner).unwrap_or_default(),
            is_init,
            current_node: session.current_node,
        }
    }
}

impl TryFrom<PersistedSession> for Session {
    type Error = String;

    fn try_from(persisted: PersistedSession) -> Result<Self, Self::Error> {
        if !persisted.is_init {
            return Ok(Session::uninitialized());
        }
        if persisted.username.is_empty() || persisted.session_id.is_empty() {
            return Err("initialized session with empty username or id".to_string());
        }
        Ok(Session {
            username: persisted.username,
            id: Some(SessionId::Confirmed(persisted.session_id)),
            current_node: persisted.current_node,
        })
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// 1-based position in the log, strictly increasing
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    pub fn bot(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_status() {
        let session = Session::uninitialized();
        assert_eq!(session.status(), SessionStatus::Uninitialized);
        assert!(session.session_id().is_none());
    }

    #[test]
    fn test_active_requires_identity() {
        let session = Session::active("Alex", SessionId::Confirmed("s1".to_string()), None);
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.session_id(), Some("s1"));

        // An empty username never reads as active
        let session = Session {
            username: String::new(),
            id: Some(SessionId::Confirmed("s1".to_string())),
            current_node: None,
        };
        assert_eq!(session.status(), SessionStatus::Uninitialized);
    }

    #[test]
    fn test_confirm_prefers_server_id() {
        let candidate = SessionId::mint();
        let confirmed = candidate.confirm(Some("server-1"));
        assert_eq!(confirmed, SessionId::Confirmed("server-1".to_string()));
    }

    #[test]
    fn test_confirm_keeps_candidate_when_server_silent() {
        let candidate = SessionId::Candidate("local-1".to_string());
        assert_eq!(
            candidate.clone().confirm(None),
            SessionId::Confirmed("local-1".to_string())
        );
        assert_eq!(
            candidate.confirm(Some("")),
            SessionId::Confirmed("local-1".to_string())
        );
    }

    #[test]
    fn test_session_round_trip() {
        let session = Session::active(
            "Alex",
            SessionId::Confirmed("s1".to_string()),
            Some("node-2".to_string()),
        );
        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn test_persisted_field_names() {
        let session = Session::active("Alex", SessionId::Confirmed("s1".to_string()), None);
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&session).unwrap()).unwrap();
        assert_eq!(value["username"], "Alex");
        assert_eq!(value["sessionId"], "s1");
        assert_eq!(value["isInit"], true);
        assert!(value.get("currentNode").is_none());
    }

    #[test]
    fn test_malformed_persisted_session_rejected() {
        let raw = r#"{"username":"","sessionId":"s1","isInit":true}"#;
        assert!(serde_json::from_str::<Session>(raw).is_err());
    }

    #[test]
    fn test_uninit_persisted_session_restores_empty() {
        let raw = r#"{"username":"left-over","sessionId":"","isInit":false}"#;
        let session: Session = serde_json::from_str(raw).unwrap();
        assert_eq!(session, Session::uninitialized());
    }

    #[test]
    fn test_message_sender_serialization() {
        let message = Message::user(1, "Hello");
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&message).unwrap()).unwrap();
        assert_eq!(value["sender"], "user");
        assert_eq!(value["id"], 1);

        let bot = Message::bot(2, "Hi there");
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&bot).unwrap()).unwrap();
        assert_eq!(value["sender"], "bot");
    }
}
