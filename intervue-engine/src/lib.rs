//! Session and conversation engine for the Intervue client
//!
//! [`SessionManager`] owns the session identity and its persistence;
//! [`ConversationEngine`] owns the ordered message log and drives exchanges
//! through a [`intervue_client::ChatTransport`]. The UI layer wires the two
//! together per user action.

pub mod convo;
pub mod error;
pub mod session;

pub use convo::ConversationEngine;
pub use error::{EngineError, EngineResult};
pub use session::SessionManager;
