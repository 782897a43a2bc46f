//! Storage Adapter
//!
//! The interface the calling application persists its state through.
//!
//! ## Responsibilities
//! - Own the document store connection for the adapter's lifetime
//! - Read and write the flows, credentials, settings and sessions documents
//! - Map library entries and listings onto the flat key space
//!
//! ## Error Policy
//! Two tiers, kept deliberately apart:
//! - Document reads (`get_flows`, `get_settings`, ...) never fail: a missing
//!   key, a store error, or an undecodable value all yield the fallback, and
//!   the failure is logged
//! - Everything else propagates: all writes, library listings, and library
//!   leaf reads (a corrupt entry is [`Error::CorruptEntry`])
//!
//! "Not found" is never an error anywhere.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::keyspace::{
    library_key, library_listing_pattern, CREDENTIALS_KEY, FLOWS_KEY, SESSIONS_KEY, SETTINGS_KEY,
};
use crate::library::{LibraryEntry, LibraryReply, LibraryRequest, Listing};
use crate::store::{DocumentStore, RedisStore, RemoteStore};

/// Storage adapter over a document store
///
/// ## Concurrency
/// All operations take `&self` and issue their store requests directly, with
/// no locking, queuing or batching of their own. Calls on different keys are
/// independent; a listing is not isolated from concurrent writes under the
/// same prefix.
pub struct Storage<S: DocumentStore> {
    store: S,
    config: Config,
}

impl Storage<RemoteStore> {
    /// Connect to the remote store described by `config`
    pub fn init(config: Config) -> Result<Self> {
        let store = RemoteStore::new(config.store.clone(), config.reconnect);
        Self::with_store(store, config)
    }
}

impl Storage<RedisStore> {
    /// Connect to the Redis server at `config.redis.url`
    pub fn init_redis(config: Config) -> Result<Self> {
        let store = RedisStore::new(config.redis.clone(), config.store.clone(), config.reconnect);
        Self::with_store(store, config)
    }
}

impl<S: DocumentStore> Storage<S> {
    /// Take ownership of `store` and connect it
    pub fn with_store(store: S, config: Config) -> Result<Self> {
        if config.debug {
            tracing::info!("Initialized with settings: {:?}", config);
        }
        store.connect()?;
        Ok(Self { store, config })
    }

    /// Release the store connection
    pub fn close(self) -> Result<()> {
        self.trace(format_args!("close called"));
        self.store.close()
    }

    // =========================================================================
    // Application Documents
    // =========================================================================

    pub fn get_flows(&self) -> Value {
        self.trace(format_args!("getFlows called"));
        self.fetch_json(FLOWS_KEY, Value::Array(Vec::new()))
    }

    pub fn save_flows(&self, flows: &Value) -> Result<()> {
        self.trace(format_args!("saveFlows called with: {}", flows));
        self.save_json(FLOWS_KEY, flows)
    }

    pub fn get_credentials(&self) -> Value {
        self.trace(format_args!("getCredentials called"));
        self.fetch_json(CREDENTIALS_KEY, empty_object())
    }

    pub fn save_credentials(&self, credentials: &Value) -> Result<()> {
        // Credential values are never logged
        self.trace(format_args!("saveCredentials called"));
        self.save_json(CREDENTIALS_KEY, credentials)
    }

    pub fn get_settings(&self) -> Value {
        self.trace(format_args!("getSettings called"));
        self.fetch_json(SETTINGS_KEY, empty_object())
    }

    pub fn save_settings(&self, settings: &Value) -> Result<()> {
        self.trace(format_args!("saveSettings called with: {}", settings));
        self.save_json(SETTINGS_KEY, settings)
    }

    pub fn get_sessions(&self) -> Value {
        self.trace(format_args!("getSessions called"));
        self.fetch_json(SESSIONS_KEY, empty_object())
    }

    pub fn save_sessions(&self, sessions: &Value) -> Result<()> {
        self.trace(format_args!("saveSessions called"));
        self.save_json(SESSIONS_KEY, sessions)
    }

    // =========================================================================
    // Library
    // =========================================================================

    /// List a directory or fetch a leaf body, depending on `path`
    ///
    /// A path starting with `/` lists; anything else fetches.
    pub fn get_library_entry(&self, entry_type: &str, path: &str) -> Result<LibraryReply> {
        self.trace(format_args!(
            "getLibraryEntry called with type: {}, path: {}",
            entry_type, path
        ));

        match LibraryRequest::parse(path) {
            LibraryRequest::List { rel } => self.list_library(entry_type, rel).map(LibraryReply::Listing),
            LibraryRequest::Entry { path } => self
                .fetch_library_body(entry_type, path)
                .map(LibraryReply::Body),
        }
    }

    /// List the library directory `rel` (no leading separator)
    ///
    /// One entry per matching key, in store enumeration order.
    pub fn list_library(&self, entry_type: &str, rel: &str) -> Result<Listing> {
        let prefix = library_key(entry_type, rel);
        let pattern = library_listing_pattern(entry_type, rel);
        let keys = self.store.keys(&pattern)?;
        tracing::debug!("Listing {} matched {} keys", pattern, keys.len());
        Ok(Listing::from_keys(&prefix, keys))
    }

    /// Body of the entry at `path`, `None` if nothing is stored there
    pub fn fetch_library_body(&self, entry_type: &str, path: &str) -> Result<Option<String>> {
        Ok(self
            .fetch_library_entry(entry_type, path)?
            .map(|entry| entry.body))
    }

    /// Full entry (meta and body) at `path`, `None` if nothing is stored there
    pub fn fetch_library_entry(&self, entry_type: &str, path: &str) -> Result<Option<LibraryEntry>> {
        let key = library_key(entry_type, path);
        match self.store.get(&key)? {
            Some(bytes) => LibraryEntry::decode(&key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Store `{meta, body}` at `path`, replacing any existing entry
    pub fn save_library_entry(
        &self,
        entry_type: &str,
        path: &str,
        meta: Value,
        body: impl Into<String>,
    ) -> Result<()> {
        let entry = LibraryEntry::new(meta, body);
        self.trace(format_args!(
            "saveLibraryEntry called with type: {}, path: {}, meta: {}, body: {} bytes",
            entry_type,
            path,
            entry.meta,
            entry.body.len()
        ));

        let key = library_key(entry_type, path);
        self.store.set(&key, &entry.encode()?)
    }

    // =========================================================================
    // Document Helpers
    // =========================================================================

    /// Serialize `value` and store it under `key`
    pub fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Read and decode `key`, `Ok(None)` if absent
    ///
    /// Store and decode failures propagate.
    pub fn try_fetch_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read and decode `key`, falling back on absence or any failure
    pub fn fetch_json<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.try_fetch_json(key) {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!("Error fetching JSON for key {}: {}", key, e);
                fallback
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The underlying document store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn trace(&self, message: fmt::Arguments<'_>) {
        if self.config.debug {
            tracing::info!("{}", message);
        } else {
            tracing::debug!("{}", message);
        }
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
