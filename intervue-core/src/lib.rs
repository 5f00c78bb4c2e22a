//! Core types and utilities for the Intervue client
//!
//! This crate provides the session and message data model, the persistent
//! state store, configuration loading and logging bootstrap used by the
//! other intervue components.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod storage;

pub use error::{Error, Result};
