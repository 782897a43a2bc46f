//! Key-space layout
//!
//! Every key the adapter reads or writes is built here.
//!
//! ```text
//! nr:flows                      flows document
//! nr:credentials                credentials document
//! nr:settings                   settings document
//! nr:sessions                   sessions document
//! nr:lib:<type>:<path>          library leaf entry
//! nr:lib:<type>:<rel>*          library listing pattern
//! ```

use crate::store::glob_escape;

pub const FLOWS_KEY: &str = "nr:flows";
pub const CREDENTIALS_KEY: &str = "nr:credentials";
pub const SETTINGS_KEY: &str = "nr:settings";
pub const SESSIONS_KEY: &str = "nr:sessions";

/// Namespace shared by all library keys
pub const LIBRARY_NAMESPACE: &str = "nr:lib";

/// Literal key prefix for `(type, path)`
///
/// For a leaf this is the full entry key; for a listing it is the part every
/// matching key starts with.
pub fn library_key(entry_type: &str, path: &str) -> String {
    format!("{}:{}:{}", LIBRARY_NAMESPACE, entry_type, path)
}

/// Glob pattern enumerating every key under `library_key(entry_type, rel)`
///
/// The literal part is escaped so metacharacters in the type or path never
/// widen the match.
pub fn library_listing_pattern(entry_type: &str, rel: &str) -> String {
    let mut pattern = glob_escape(&library_key(entry_type, rel));
    pattern.push('*');
    pattern
}
