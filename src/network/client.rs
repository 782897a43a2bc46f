//! Store Client
//!
//! A single blocking connection to a store server.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::protocol::{read_response, write_command, Command, Response};

/// Client side of one connection
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    peer_addr: String,
}

impl Client {
    /// Connect to the server named in `config`
    ///
    /// Tries every resolved address in turn and applies the configured
    /// timeouts to the established stream.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let addrs = config
            .addr
            .to_socket_addrs()
            .map_err(|e| Error::Config(format!("Invalid store address {}: {}", config.addr, e)))?;

        let mut last_err = None;
        for addr in addrs {
            let attempt = if config.connect_timeout_ms > 0 {
                TcpStream::connect_timeout(&addr, Duration::from_millis(config.connect_timeout_ms))
            } else {
                TcpStream::connect(addr)
            };
            match attempt {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => last_err = Some(e),
            }
        }

        Err(match last_err {
            Some(e) => Error::Io(e),
            None => Error::Network(format!("No address resolved for {}", config.addr)),
        })
    }

    fn from_stream(stream: TcpStream, config: &StoreConfig) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        let read_stream = stream.try_clone()?;

        tracing::debug!("Connected to store at {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            peer_addr,
        })
    }

    /// Send one command and wait for its response
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        tracing::trace!("Sending to {}: {:?}", self.peer_addr, command.command_type());
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
