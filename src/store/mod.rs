//! Store Module
//!
//! The document store capability the adapter is built on: byte-level
//! get/set and glob key enumeration over a flat key space.
//!
//! ## Backends
//! - [`MemoryStore`]: ordered in-process map, for tests and embedding
//! - [`RemoteStore`]: TCP client for a store server (see `network::Server`)
//! - [`RedisStore`]: a Redis server, via GET/SET/KEYS
//!
//! ## Guarantees Relied Upon
//! - Single-key writes are atomic
//! - No multi-key transactions; `keys` is a point-in-time-ish enumeration
//!   that may race with concurrent writes

mod backoff;
mod memory;
mod pattern;
mod redis_store;
mod remote;

pub use memory::MemoryStore;
pub use pattern::{glob_escape, glob_match};
pub use redis_store::RedisStore;
pub use remote::RemoteStore;

use crate::error::Result;

/// A connected key-value backend
///
/// All methods take `&self`; implementations use interior mutability so a
/// single store can be shared across threads.
pub trait DocumentStore: Send + Sync {
    /// Establish the connection (idempotent)
    fn connect(&self) -> Result<()>;

    /// Release the connection (idempotent)
    fn close(&self) -> Result<()>;

    /// Fetch the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Enumerate keys matching a glob `pattern`
    ///
    /// Supported syntax: `*` (any run), `?` (one character), `\x` (literal
    /// `x`). Order is whatever the backend enumerates in.
    fn keys(&self, pattern: &str) -> Result<Vec<String>>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    fn connect(&self) -> Result<()> {
        (**self).connect()
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        (**self).keys(pattern)
    }
}
