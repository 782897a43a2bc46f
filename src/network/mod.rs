//! Network Module
//!
//! TCP client and server for the store protocol.
//!
//! ## Architecture
//! - `Client`: one blocking connection, one request in flight
//! - `Server`: single acceptor thread, worker thread pool for connections
//! - Commands executed directly against a shared `DocumentStore`

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::Connection;
pub use server::{Server, ShutdownHandle};
