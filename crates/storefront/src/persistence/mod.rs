//! Persistent key-value bridge.
//!
//! The stores persist two JSON blobs, [`keys::USER`] and
//! [`keys::CART_ITEMS`], through a [`KeyValueStore`] port. Implementations
//! never fail loudly: reads return `None` on any problem and writes are
//! best-effort, so a broken or disabled storage backend degrades the client
//! to memory-only operation instead of interrupting the shopper.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - process-local map (tests, ephemeral sessions)
//! - [`FileStore`] - one `<key>.json` file per key under a data directory

mod file;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Keys under which the stores persist their state.
pub mod keys {
    /// Serialized [`Identity`](khushiv_core::Identity) of the logged-in user.
    pub const USER: &str = "user";

    /// Serialized [`Cart`](khushiv_core::Cart) line array.
    pub const CART_ITEMS: &str = "cartItems";
}

/// Durable client-local key-value storage.
///
/// Contract:
/// - `read` returns `None` if the key was never written or storage is
///   unavailable; it must not panic.
/// - `write` is best-effort; failures are logged and swallowed.
/// - `remove` is idempotent.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn read(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str);

    /// Delete `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

/// Typed JSON access on top of a [`KeyValueStore`].
///
/// Cheaply cloneable; every store holds its own handle to the same backend.
#[derive(Clone)]
pub struct PersistentBridge {
    store: Arc<dyn KeyValueStore>,
}

impl PersistentBridge {
    /// Wrap a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Bridge over a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load and deserialize the value under `key`.
    ///
    /// A value that does not parse as `T` is treated as absent: it is logged,
    /// removed from storage, and `None` is returned.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.read(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "Loaded persisted value");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding malformed persisted value");
                self.store.remove(key);
                None
            }
        }
    }

    /// Serialize `value` and write it under `key` (best-effort).
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.store.write(key, &json),
            Err(e) => warn!(key, error = %e, "Failed to serialize value for persistence"),
        }
    }

    /// Remove `key` (idempotent).
    pub fn remove(&self, key: &str) {
        self.store.remove(key);
    }
}

impl std::fmt::Debug for PersistentBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentBridge").finish_non_exhaustive()
    }
}
