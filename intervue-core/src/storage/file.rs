//! File-backed state store

use std::path::{Path, PathBuf};

use super::StateStore;
use crate::Result;

/// Stores each key as one JSON file under a state directory
#[derive(Debug)]
pub struct FileStore {
    state_dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(state_dir: P) -> Self {
        Self {
            state_dir: state_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the file path for a key
    fn key_path(&self, key: &str) -> PathBuf {
        let safe_key = key.replace([':', '/', '\\'], "_");
        self.state_dir.join(format!("{}.json", safe_key))
    }
}

impl StateStore for FileStore {
    fn save(&self, key: &str, raw: &str) -> Result<()> {
        std::fs::create_dir_all(&self.state_dir)?;
        std::fs::write(self.key_path(key), raw)?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn clear(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
