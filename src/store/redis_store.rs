//! Redis document store
//!
//! Keeps documents in a Redis server using plain GET, SET and KEYS, so the
//! data is shared with anything else reading the same `nr:*` keys.

use std::time::Duration;

use parking_lot::Mutex;

use super::backoff::dial_with_backoff;
use super::DocumentStore;
use crate::config::{ReconnectStrategy, RedisConfig, StoreConfig};
use crate::error::{Error, Result};

/// Document store backed by a Redis server
///
/// Connection handling mirrors [`RemoteStore`](super::RemoteStore): one
/// synchronous connection under a mutex, dialed with the reconnect
/// strategy, and a transport failure mid-request reconnects and retries the
/// command once.
pub struct RedisStore {
    url: String,
    timeouts: StoreConfig,
    reconnect: ReconnectStrategy,
    conn: Mutex<Option<redis::Connection>>,
}

impl RedisStore {
    /// Create a store for `redis`; the URL is parsed and dialed on `connect`
    ///
    /// Connect, read and write timeouts are taken from `timeouts`.
    pub fn new(redis: RedisConfig, timeouts: StoreConfig, reconnect: ReconnectStrategy) -> Self {
        Self {
            url: redis.url,
            timeouts,
            reconnect,
            conn: Mutex::new(None),
        }
    }

    /// Whether a connection is currently held
    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Health check against the server
    pub fn ping(&self) -> Result<()> {
        let reply: String = self.query(&redis::cmd("PING"))?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(Error::Backend(format!("unexpected PING reply: {}", reply)))
        }
    }

    fn dial(&self) -> Result<redis::Connection> {
        dial_with_backoff(&self.url, &self.reconnect, || {
            let client = redis::Client::open(self.url.as_str())?;
            let conn = match millis(self.timeouts.connect_timeout_ms) {
                Some(timeout) => client.get_connection_with_timeout(timeout)?,
                None => client.get_connection()?,
            };
            conn.set_read_timeout(millis(self.timeouts.read_timeout_ms))?;
            conn.set_write_timeout(millis(self.timeouts.write_timeout_ms))?;
            tracing::debug!("Connected to redis at {}", self.url);
            Ok(conn)
        })
    }

    /// Run a command, reconnecting once on transport failure
    fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T> {
        let mut guard = self.conn.lock();

        if guard.is_none() {
            *guard = Some(self.dial()?);
        }

        let first = match guard.as_mut() {
            Some(conn) => cmd.query::<T>(conn).map_err(Error::from),
            None => Err(Error::NotConnected),
        };

        match first {
            Err(e) if e.is_connection_error() => {
                tracing::warn!("Redis request failed ({}), reconnecting", e);
                *guard = None;
                let mut conn = self.dial()?;
                let value = cmd.query::<T>(&mut conn)?;
                *guard = Some(conn);
                Ok(value)
            }
            other => other,
        }
    }
}

impl DocumentStore for RedisStore {
    fn connect(&self) -> Result<()> {
        let mut guard = self.conn.lock();
        if guard.is_none() {
            *guard = Some(self.dial()?);
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if let Some(mut conn) = self.conn.lock().take() {
            if let Err(e) = redis::cmd("QUIT").query::<()>(&mut conn) {
                tracing::debug!("QUIT to {} failed: {}", self.url, e);
            }
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.query(redis::cmd("GET").arg(key))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.query(redis::cmd("SET").arg(key).arg(value))
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.query(redis::cmd("KEYS").arg(pattern))
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("url", &self.url)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Zero means "no timeout"
fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
