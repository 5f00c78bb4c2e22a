//! In-memory state store for tests

use parking_lot::Mutex;
use std::collections::HashMap;

use super::StateStore;
use crate::Result;

/// Volatile store with the same contract as [`super::FileStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn save(&self, key: &str, raw: &str) -> Result<()> {
        self.values
            .lock()
            .insert(key.to_string(), raw.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_contract() {
        let store = MemoryStore::new();
        assert!(store.load("k").unwrap().is_none());

        store.save("k", "v1").unwrap();
        store.save("k", "v2").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("v2"));

        store.clear("k").unwrap();
        assert!(store.load("k").unwrap().is_none());
    }
}
