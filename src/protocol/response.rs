//! Response definitions
//!
//! Represents replies from the store server.

use crate::error::{Error, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value for GET, key list for KEYS, message for ERROR)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an OK response carrying a key list
    pub fn keys(keys: &[String]) -> Result<Self> {
        let payload =
            bincode::serialize(keys).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(Self::ok(Some(payload)))
    }

    /// Decode the key list of a KEYS reply
    ///
    /// An OK reply without payload is an empty list.
    pub fn into_keys(self) -> Result<Vec<String>> {
        let payload = self.into_result()?.unwrap_or_default();
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        bincode::deserialize(&payload)
            .map_err(|e| Error::Protocol(format!("Malformed KEYS reply: {}", e)))
    }

    /// Turn an ERROR status into `Err`; OK and NOT_FOUND pass through
    ///
    /// NOT_FOUND maps to `Ok(None)`.
    pub fn into_result(self) -> Result<Option<Vec<u8>>> {
        match self.status {
            Status::Ok => Ok(self.payload),
            Status::NotFound => Ok(None),
            Status::Error => {
                let message = self
                    .payload
                    .map(|p| String::from_utf8_lossy(&p).into_owned())
                    .unwrap_or_default();
                Err(Error::Backend(message))
            }
        }
    }
}
