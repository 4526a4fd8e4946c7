//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use super::KeyValueStore;

/// Process-local [`KeyValueStore`].
///
/// `MemoryStore::unavailable()` behaves like disabled browser storage:
/// every write is rejected and every read comes back empty.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects every operation.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            entries: Mutex::default(),
            unavailable: true,
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        if self.unavailable {
            return None;
        }
        self.entries().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        if self.unavailable {
            warn!(key, "Storage unavailable, value kept in memory only");
            return;
        }
        self.entries().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        if self.unavailable {
            return;
        }
        self.entries().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_remove() {
        let store = MemoryStore::new();
        store.write("k", "v");
        assert_eq!(store.read("k").as_deref(), Some("v"));

        store.remove("k");
        assert_eq!(store.read("k"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let store = MemoryStore::new();
        store.write("other", "v");
        store.remove("k");
        store.remove("k");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unavailable_store() {
        let store = MemoryStore::unavailable();
        store.write("k", "v");
        assert_eq!(store.read("k"), None);
        assert!(store.is_empty());
    }
}
