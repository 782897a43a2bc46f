//! nrstore Server Binary
//!
//! Serves an in-memory document store over TCP for development and testing.

use std::sync::Arc;

use clap::Parser;
use nrstore::network::Server;
use nrstore::{DocumentStore, MemoryStore, ServerConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// nrstore development store server
#[derive(Parser, Debug)]
#[command(name = "nrstore-server")]
#[command(about = "In-memory document store server for nrstore")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6380")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Connection worker threads
    #[arg(short, long, default_value = "16")]
    workers: usize,

    /// Idle connection timeout in seconds
    #[arg(long, default_value = "30")]
    idle_timeout_secs: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nrstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("nrstore server v{}", nrstore::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = ServerConfig::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .read_timeout_ms(args.idle_timeout_secs * 1000)
        .build();

    let store = Arc::new(MemoryStore::new());
    if let Err(e) = store.connect() {
        tracing::error!("Failed to open store: {}", e);
        std::process::exit(1);
    }

    let server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    // Ctrl+C (and SIGTERM) stop the accept loop and close open clients
    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        shutdown.shutdown();
    }) {
        tracing::error!("Failed to install signal handler: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
