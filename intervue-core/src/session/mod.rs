//! Session and message data model
//!
//! A session ties a user to a backend conversation; the message log is the
//! ordered record of one session's exchanges. Both are persisted through the
//! storage module in the same JSON shapes the backend's web client uses.

pub mod store;

pub use store::{Message, Sender, Session, SessionId, SessionStatus};
