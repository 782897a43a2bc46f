//! Configuration for nrstore
//!
//! Centralized configuration with sensible defaults. A `Config` can be built
//! in code through [`ConfigBuilder`] or loaded from a JSON settings document
//! with [`Config::from_json`]; fields missing from the document keep their
//! defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration for a storage adapter instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Connection
    // -------------------------------------------------------------------------
    /// Connection parameters for the backing document store
    pub store: StoreConfig,

    /// Redis server, used by `Storage::init_redis`
    pub redis: RedisConfig,

    /// Reconnect policy, passed through to the store client unexamined
    pub reconnect: ReconnectStrategy,

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------
    /// Log call traces at `info` instead of `debug`
    pub debug: bool,
}

/// Connection parameters for a remote document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store server address (host:port)
    pub addr: String,

    /// TCP connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Response read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Request write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

/// Connection parameters for a Redis server
///
/// Timeouts are shared with [`StoreConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL (`redis://[:password@]host[:port][/db]`)
    pub url: String,
}

/// How long to wait before each reconnect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconnectStrategy {
    /// Wait `min(retries * step_ms, max_delay_ms)`
    ///
    /// `max_retries: None` retries forever.
    Linear {
        step_ms: u64,
        max_delay_ms: u64,
        #[serde(default)]
        max_retries: Option<u32>,
    },

    /// Wait the same delay before every retry
    Fixed {
        delay_ms: u64,
        #[serde(default)]
        max_retries: Option<u32>,
    },

    /// Fail on the first connection error
    Never,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            redis: RedisConfig::default(),
            reconnect: ReconnectStrategy::default(),
            debug: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6380".to_string(),
            connect_timeout_ms: 2000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/".to_string(),
        }
    }
}

impl Default for ReconnectStrategy {
    fn default() -> Self {
        ReconnectStrategy::Linear {
            step_ms: 50,
            max_delay_ms: 500,
            max_retries: None,
        }
    }
}

impl ReconnectStrategy {
    /// Delay before reconnect attempt number `retries`
    ///
    /// Attempt 0 is the initial connect and never waits. Returns `None`
    /// once the policy gives up.
    pub fn delay_for(&self, retries: u32) -> Option<Duration> {
        if retries == 0 {
            return Some(Duration::ZERO);
        }

        match *self {
            ReconnectStrategy::Linear {
                step_ms,
                max_delay_ms,
                max_retries,
            } => {
                if exhausted(retries, max_retries) {
                    return None;
                }
                let delay = step_ms.saturating_mul(u64::from(retries)).min(max_delay_ms);
                Some(Duration::from_millis(delay))
            }
            ReconnectStrategy::Fixed {
                delay_ms,
                max_retries,
            } => {
                if exhausted(retries, max_retries) {
                    return None;
                }
                Some(Duration::from_millis(delay_ms))
            }
            ReconnectStrategy::Never => None,
        }
    }
}

fn exhausted(retries: u32, max_retries: Option<u32>) -> bool {
    max_retries.map_or(false, |max| retries > max)
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load a config from a JSON settings document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store server address
    pub fn store_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.store.addr = addr.into();
        self
    }

    /// Set the Redis connection URL
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis.url = url.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.store.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.store.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.store.write_timeout_ms = ms;
        self
    }

    /// Set the reconnect strategy
    pub fn reconnect(mut self, strategy: ReconnectStrategy) -> Self {
        self.config.reconnect = strategy;
        self
    }

    /// Enable verbose call tracing
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the store server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Number of connection worker threads
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:6380".to_string(),
            max_connections: 1024,
            worker_threads: 16,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    /// Create a new server config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}
