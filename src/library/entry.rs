//! Library entry encoding

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A leaf of the library: metadata plus body content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Opaque metadata document
    #[serde(default)]
    pub meta: Value,

    /// Opaque text content
    pub body: String,
}

impl LibraryEntry {
    pub fn new(meta: Value, body: impl Into<String>) -> Self {
        Self {
            meta,
            body: body.into(),
        }
    }

    /// Serialize to the stored JSON form
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode the value stored under `key`
    ///
    /// Anything that is not a `{meta, body}` document is reported as
    /// [`Error::CorruptEntry`].
    pub fn decode(key: &str, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::CorruptEntry {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}
