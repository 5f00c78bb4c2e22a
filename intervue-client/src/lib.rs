//! Transport gateway for the Intervue backend
//!
//! This crate provides the typed surface over the backend's three
//! conversational operations and the reqwest-based implementation.

pub mod base;
pub mod http;

pub use base::{ChatReply, ChatTransport, TransportError, TransportResult};
pub use http::HttpChatClient;
