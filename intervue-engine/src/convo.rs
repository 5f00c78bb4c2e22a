//! Conversation log and exchange engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use intervue_client::ChatTransport;
use intervue_core::session::Message;
use intervue_core::storage::{self, StateStore, MESSAGES_KEY};

use crate::error::{EngineError, EngineResult};
use crate::session::SessionManager;

/// Owns the ordered message log and drives user/bot exchanges.
///
/// Log mutations are serialized: a second send arriving while one is in
/// flight queues behind the exchange gate, so message ids stay strictly
/// increasing with no gaps.
pub struct ConversationEngine {
    transport: Arc<dyn ChatTransport>,
    store: Arc<dyn StateStore>,
    log: Mutex<Vec<Message>>,
    exchange_gate: tokio::sync::Mutex<()>,
    pending: AtomicBool,
}

impl ConversationEngine {
    pub fn new(transport: Arc<dyn ChatTransport>, store: Arc<dyn StateStore>) -> Self {
        Self {
            transport,
            store,
            log: Mutex::new(Vec::new()),
            exchange_gate: tokio::sync::Mutex::new(()),
            pending: AtomicBool::new(false),
        }
    }

    /// Load the persisted log; absent or malformed state yields an empty log
    pub fn restore_log(&self) -> Vec<Message> {
        let messages =
            storage::load_json_or_default::<Vec<Message>>(self.store.as_ref(), MESSAGES_KEY)
                .unwrap_or_default();
        *self.log.lock() = messages.clone();
        messages
    }

    /// A copy of the current log
    pub fn messages(&self) -> Vec<Message> {
        self.log.lock().clone()
    }

    /// Whether an exchange is currently in flight
    pub fn is_busy(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Drop the in-memory log. The persisted copy is wiped by
    /// [`SessionManager::end_session`].
    pub fn clear_log(&self) {
        self.log.lock().clear();
    }

    /// Replace the whole log with a single bot greeting (message id 1) and
    /// persist it. Used after `init` and `reset`.
    pub fn replace_log_with_greeting(&self, text: &str) -> intervue_core::Result<()> {
        {
            let mut log = self.log.lock();
            log.clear();
            log.push(Message::bot(1, text));
        }
        self.persist_log()
    }

    /// Send one user message within the active session.
    ///
    /// Empty input is a no-op, mirroring the disabled send control. The user
    /// message is appended optimistically and kept even when the exchange
    /// fails; the bot message is appended only on success. The updated log
    /// is persisted before returning on both paths. A response whose session
    /// was discarded while the request was in flight is dropped silently.
    pub async fn send_user_message(
        &self,
        sessions: &SessionManager,
        text: &str,
    ) -> EngineResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let _turn = self.exchange_gate.lock().await;

        let session = sessions.snapshot();
        let session_id = match session.session_id() {
            Some(id) if session.is_active() => id.to_string(),
            _ => return Err(EngineError::NoSession),
        };
        let generation = sessions.generation();

        self.pending.store(true, Ordering::SeqCst);
        self.append(Message::user(self.next_id(), text));

        let result = self.transport.exchange(&session_id, text).await;

        if sessions.generation() != generation {
            debug!("Dropping exchange response for discarded session");
            self.pending.store(false, Ordering::SeqCst);
            return Ok(());
        }

        let outcome = match result {
            Ok(reply) => {
                self.append(Message::bot(self.next_id(), &reply.response));
                sessions
                    .adopt_reply(&reply)
                    .map_err(EngineError::from)
            }
            Err(e) => Err(EngineError::from(e)),
        };

        let persisted = self.persist_log();
        self.pending.store(false, Ordering::SeqCst);
        outcome.and(persisted.map_err(EngineError::from))
    }

    fn next_id(&self) -> u64 {
        self.log.lock().len() as u64 + 1
    }

    fn append(&self, message: Message) {
        self.log.lock().push(message);
    }

    fn persist_log(&self) -> intervue_core::Result<()> {
        let log = self.log.lock();
        storage::save_json(self.store.as_ref(), MESSAGES_KEY, &*log)
    }
}
