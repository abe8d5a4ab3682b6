//! Raw key-value access and the in-memory backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, instrument, warn};

use crate::store::StoreError;

/// String key-value storage backing the game state.
///
/// Implementations must fail with [`StoreError`] when the backend cannot be
/// reached rather than pretending a key is absent.
pub trait KvStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<K: KvStore + ?Sized> KvStore for Arc<K> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Shared, type-erased store handle.
pub type DynStore = Arc<dyn KvStore>;

/// Process-local store.
///
/// State lives only as long as the process. [`MemoryStore::set_unavailable`]
/// makes every call fail, which is how tests reach the unavailable path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing (or regaining) the backend.
    #[instrument(skip(self))]
    pub fn set_unavailable(&self, unavailable: bool) {
        warn!(unavailable, "Memory store availability changed");
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    /// True when no key has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::new("memory store marked unavailable"))
        } else {
            Ok(())
        }
    }
}

impl KvStore for MemoryStore {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::new(format!("memory store lock poisoned: {}", e)))?;
        let value = entries.get(key).cloned();
        debug!(found = value.is_some(), "Memory store read");
        Ok(value)
    }

    #[instrument(skip(self, value))]
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::new(format!("memory store lock poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        debug!("Memory store write");
        Ok(())
    }
}
