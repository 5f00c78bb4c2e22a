//! Session lifecycle management

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use intervue_client::{ChatReply, ChatTransport};
use intervue_core::session::{Session, SessionId};
use intervue_core::storage::{self, StateStore, MESSAGES_KEY, SESSION_KEY};

use crate::error::{EngineError, EngineResult};

/// Owns the [`Session`] entity, its lifecycle transitions and its mirror in
/// the persistent store.
///
/// All methods take `&self`; the session lives behind a lock so the manager
/// can be shared with the conversation engine. The generation counter ticks
/// whenever the active session is replaced or discarded, which lets callers
/// detect that a response they are holding belongs to a dead session.
pub struct SessionManager {
    transport: Arc<dyn ChatTransport>,
    store: Arc<dyn StateStore>,
    session: RwLock<Session>,
    generation: AtomicU64,
    reset_greeting: String,
}

impl SessionManager {
    /// Create a manager with no session; call [`restore`](Self::restore) to
    /// pick up persisted state.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        store: Arc<dyn StateStore>,
        reset_greeting: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            store,
            session: RwLock::new(Session::uninitialized()),
            generation: AtomicU64::new(0),
            reset_greeting: reset_greeting.into(),
        }
    }

    /// Load the persisted session, if any. Absent or malformed state falls
    /// back to an uninitialized session; no backend round-trip happens.
    pub fn restore(&self) -> Session {
        let session = storage::load_json_or_default::<Session>(self.store.as_ref(), SESSION_KEY)
            .unwrap_or_default();
        if session.is_active() {
            info!(username = %session.username, "Restored session");
        }
        *self.session.write() = session.clone();
        session
    }

    /// A copy of the current session
    pub fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    pub fn is_active(&self) -> bool {
        self.session.read().is_active()
    }

    /// Current session generation; bumped when the active session changes
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Establish a session for `username`.
    ///
    /// A candidate id is minted locally so the client never waits on the
    /// server merely to learn an id; the server's id wins if it differs. On
    /// transport failure the current session is left untouched. Returns the
    /// bot's opening message.
    pub async fn initialize(&self, username: &str) -> EngineResult<String> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::Validation("Please enter your name".to_string()));
        }

        let candidate = SessionId::mint();
        let reply = self.transport.init(username, candidate.as_str()).await?;

        let id = candidate.confirm(reply.session_id.as_deref());
        let session = Session::active(username, id, reply.current_node.clone());
        storage::save_json(self.store.as_ref(), SESSION_KEY, &session)?;

        info!(username, session_id = session.session_id(), "Session initialized");
        *self.session.write() = session;
        self.generation.fetch_add(1, Ordering::SeqCst);

        Ok(reply.response)
    }

    /// Restart the conversation behind the active session.
    ///
    /// On success the session adopts any new id/node the server returned and
    /// the returned greeting should replace the message log. A reply with an
    /// empty response falls back to the configured greeting template.
    pub async fn reset_session(&self) -> EngineResult<String> {
        let current = self.snapshot();
        let session_id = match current.session_id() {
            Some(id) if current.is_active() => id.to_string(),
            _ => return Err(EngineError::NoSession),
        };

        let reply = self.transport.reset(&session_id).await?;
        self.adopt_reply(&reply)?;

        let greeting = if reply.response.trim().is_empty() {
            self.reset_greeting.replace("{username}", &current.username)
        } else {
            reply.response
        };
        info!("Session reset");
        Ok(greeting)
    }

    /// Discard the session and wipe both persisted keys. Idempotent; safe to
    /// call with no active session.
    pub fn end_session(&self) -> intervue_core::Result<()> {
        *self.session.write() = Session::uninitialized();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.store.clear(SESSION_KEY)?;
        self.store.clear(MESSAGES_KEY)?;
        info!("Session ended");
        Ok(())
    }

    /// Apply the server-id override rule for a reply.
    ///
    /// The session only moves when the server sent a non-empty id different
    /// from the current one; the cursor travels with it. A changed session
    /// is persisted before returning. No-op without an active session.
    pub fn adopt_reply(&self, reply: &ChatReply) -> intervue_core::Result<()> {
        let mut session = self.session.write();
        if !session.is_active() {
            debug!("Ignoring reply for inactive session");
            return Ok(());
        }

        let new_id = match reply.session_id.as_deref() {
            Some(id) if !id.is_empty() && Some(id) != session.session_id() => id.to_string(),
            _ => return Ok(()),
        };

        debug!(old = session.session_id(), new = %new_id, "Server overrode session id");
        session.id = Some(SessionId::Confirmed(new_id));
        session.current_node = reply.current_node.clone();
        storage::save_json(self.store.as_ref(), SESSION_KEY, &*session)
    }
}
