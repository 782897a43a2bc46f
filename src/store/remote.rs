//! Remote document store
//!
//! Talks to a store server over the binary protocol, holding a single
//! connection that is (re)established according to the configured
//! `ReconnectStrategy`.

use parking_lot::Mutex;

use super::backoff::dial_with_backoff;
use super::DocumentStore;
use crate::config::{ReconnectStrategy, StoreConfig};
use crate::error::{Error, Result};
use crate::network::Client;
use crate::protocol::{Command, Response};

/// Document store backed by a remote server
///
/// ## Connection Handling
/// - `connect` dials the server, retrying per the reconnect strategy
/// - Requests are serialized over the one connection by a mutex
/// - A request that fails at the transport level drops the connection,
///   reconnects, and is retried once
/// - `close` sends QUIT and drops the connection
pub struct RemoteStore {
    config: StoreConfig,
    reconnect: ReconnectStrategy,
    client: Mutex<Option<Client>>,
}

impl RemoteStore {
    /// Create a store for `config`; no connection is made until `connect`
    pub fn new(config: StoreConfig, reconnect: ReconnectStrategy) -> Self {
        Self {
            config,
            reconnect,
            client: Mutex::new(None),
        }
    }

    /// Whether a connection is currently held
    pub fn is_connected(&self) -> bool {
        self.client.lock().is_some()
    }

    /// Health check against the server
    pub fn ping(&self) -> Result<()> {
        self.request(Command::Ping)?.into_result().map(|_| ())
    }

    /// Dial with backoff until connected or the strategy gives up
    fn dial(&self) -> Result<Client> {
        dial_with_backoff(&self.config.addr, &self.reconnect, || {
            Client::connect(&self.config)
        })
    }

    /// Send a command, reconnecting once on transport failure
    fn request(&self, command: Command) -> Result<Response> {
        let mut guard = self.client.lock();

        if guard.is_none() {
            *guard = Some(self.dial()?);
        }

        let first = match guard.as_mut() {
            Some(client) => client.request(&command),
            None => Err(Error::NotConnected),
        };

        match first {
            Err(e) if e.is_connection_error() => {
                tracing::warn!("Store request failed ({}), reconnecting", e);
                *guard = None;
                let mut client = self.dial()?;
                let response = client.request(&command)?;
                *guard = Some(client);
                Ok(response)
            }
            other => other,
        }
    }
}

impl DocumentStore for RemoteStore {
    fn connect(&self) -> Result<()> {
        let mut guard = self.client.lock();
        if guard.is_none() {
            *guard = Some(self.dial()?);
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if let Some(mut client) = self.client.lock().take() {
            // The server may already have dropped an idle connection
            if let Err(e) = client.request(&Command::Quit) {
                tracing::debug!("QUIT to {} failed: {}", client.peer_addr(), e);
            }
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.request(Command::Get {
            key: key.to_string(),
        })?
        .into_result()
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.request(Command::Set {
            key: key.to_string(),
            value: value.to_vec(),
        })?
        .into_result()
        .map(|_| ())
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.request(Command::Keys {
            pattern: pattern.to_string(),
        })?
        .into_keys()
    }
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("addr", &self.config.addr)
            .field("connected", &self.is_connected())
            .finish()
    }
}
