//! In-memory document store
//!
//! BTreeMap-based store with RwLock for concurrency. Keys enumerate in
//! sorted order.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::{glob_match, DocumentStore};
use crate::error::{Error, Result};

/// In-process document store
///
/// Holds every value in memory behind a `RwLock`: many concurrent readers,
/// one writer at a time. Operations fail with [`Error::NotConnected`] until
/// [`DocumentStore::connect`] is called and after [`DocumentStore::close`].
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
    connected: AtomicBool,
}

impl MemoryStore {
    /// Create a new, disconnected, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that is already connected
    pub fn connected() -> Self {
        let store = Self::new();
        store.connected.store(true, Ordering::Release);
        store
    }

    /// Whether `connect` has been called (and `close` has not)
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }
}

impl DocumentStore for MemoryStore {
    fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.ensure_connected()?;
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.ensure_connected()?;
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.ensure_connected()?;
        let data = self.data.read();
        Ok(data
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("key_count", &self.len())
            .field("connected", &self.is_connected())
            .finish()
    }
}
