//! Durable key-value state storage
//!
//! The store is a passive mirror: it serializes and deserializes values but
//! never interprets them. [`FileStore`] is the production implementation;
//! [`MemoryStore`] backs tests.

pub mod file;
pub mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::{Error, Result};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key under which the session record is persisted
pub const SESSION_KEY: &str = "chatSession";
/// Key under which the message log is persisted
pub const MESSAGES_KEY: &str = "chatMessages";

/// Durable string storage surviving restarts
pub trait StateStore: Send + Sync {
    /// Store `raw` under `key`, overwriting any prior value
    fn save(&self, key: &str, raw: &str) -> Result<()>;

    /// The last saved value, or `None` if absent or cleared
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Remove the value under `key`; absent keys are fine
    fn clear(&self, key: &str) -> Result<()>;
}

/// Serialize `value` as JSON and store it under `key`
pub fn save_json<T: Serialize>(store: &dyn StateStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.save(key, &raw)
}

/// Load and deserialize the value under `key`.
///
/// A value that fails to deserialize into `T` yields
/// [`Error::Deserialization`]; callers treat that like absence and fall back
/// to an uninitialized state.
pub fn load_json<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Result<Option<T>> {
    match store.load(key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw)
                .map_err(|e| Error::Deserialization(format!("key {}: {}", key, e)))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Load `key`, falling back to `None` (with a log line) on corrupt state
pub fn load_json_or_default<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Option<T> {
    match load_json(store, key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Discarding corrupt persisted state: {}", e);
            None
        }
    }
}
