//! In-memory key-value store.
//!
//! Clones share the same map, so a test can keep one handle while the cart's
//! writer owns another.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    writes: u64,
}

/// Process-local store with no durability.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.entries.insert(key.into(), value.into());
        }
        store
    }

    /// Number of successful `set_item` calls since creation.
    pub fn write_count(&self) -> u64 {
        self.lock().map_or(0, |state| state.writes)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("memory"))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut state = self.lock()?;
        state.entries.insert(key.to_string(), value.to_string());
        state.writes += 1;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.lock()?.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueStore;
    use crate::storage::KeyValueStore;

    #[test]
    fn clones_share_entries_and_write_count() {
        let store = MemoryKeyValueStore::new();
        let other = store.clone();

        store.set_item("k", "v1").unwrap();
        store.set_item("k", "v2").unwrap();

        assert_eq!(other.get_item("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(other.write_count(), 2);

        other.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }
}
