//! # nrstore
//!
//! A persistence adapter that keeps application state in a flat key-value
//! store:
//! - Flows, credentials, settings and sessions as JSON documents
//! - A hierarchical library of entries emulated with key prefixes
//! - Pluggable document store: in-memory, remote over TCP, or Redis
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Calling Application                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Storage Adapter                            │
//! │       (documents: fallback on read, library: propagate)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Keyspace   │          │   Library   │
//!   │ (nr:* keys) │          │ (listings)  │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬────────────┘
//!                       ▼
//!              ┌─────────────────┐        ┌─────────────┐
//!              │  DocumentStore  │──TCP──▶│   Server    │
//!              │ (Mem/Remote/    │        │ (workers)   │
//!              │  Redis)         │        │             │
//!              └─────────────────┘        └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod keyspace;
pub mod library;
pub mod store;
pub mod network;
pub mod protocol;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Error, Result};
pub use config::{Config, ReconnectStrategy, RedisConfig, ServerConfig};
pub use storage::Storage;
pub use library::{LibraryEntry, LibraryReply, Listing, ListingEntry};
pub use store::{DocumentStore, MemoryStore, RedisStore, RemoteStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of nrstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
