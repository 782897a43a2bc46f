//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.
//!
//! Every accepted socket is registered until its worker finishes with it, so
//! shutdown can close idle clients instead of waiting out their read timeout.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel;
use parking_lot::Mutex;

use super::Connection;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::protocol::{write_response, Response};
use crate::store::DocumentStore;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server exposing a `DocumentStore`
pub struct Server {
    config: ServerConfig,
    store: Arc<dyn DocumentStore>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    open: Arc<OpenStreams>,
}

/// Sockets handed to workers, keyed by connection id
#[derive(Default)]
struct OpenStreams {
    next_id: AtomicU64,
    streams: Mutex<HashMap<u64, TcpStream>>,
}

impl OpenStreams {
    /// Keep a clone of `stream` so it can be closed from another thread
    fn register(&self, stream: &TcpStream) -> std::io::Result<u64> {
        let clone = stream.try_clone()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.streams.lock().insert(id, clone);
        Ok(id)
    }

    fn release(&self, id: u64) {
        self.streams.lock().remove(&id);
    }

    /// Shut down both halves of every registered socket
    ///
    /// Blocked reads in the workers return EOF and their loops end.
    fn close_all(&self) -> usize {
        let streams = self.streams.lock();
        for stream in streams.values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        streams.len()
    }
}

/// Signals a running server to stop accepting and drain its workers
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Request shutdown; `Server::run` returns once workers finish
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl Server {
    /// Bind the listener described by `config`
    ///
    /// The store is shared by every connection and must already be connected.
    pub fn bind(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            store,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
            open: Arc::new(OpenStreams::default()),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle that stops `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Number of connections currently queued or being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Run the accept loop (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        let (tx, rx) = channel::unbounded::<(u64, TcpStream)>();
        let worker_count = self.config.worker_threads.max(1);

        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let rx = rx.clone();
            let store = Arc::clone(&self.store);
            let active = Arc::clone(&self.active);
            let open = Arc::clone(&self.open);
            let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

            let handle = thread::Builder::new()
                .name(format!("nrstore-worker-{}", id))
                .spawn(move || {
                    for (id, stream) in rx.iter() {
                        if let Err(e) = serve(stream, Arc::clone(&store), read_ms, write_ms) {
                            tracing::warn!("Connection ended with error: {}", e);
                        }
                        open.release(id);
                        active.fetch_sub(1, Ordering::AcqRel);
                    }
                })?;
            workers.push(handle);
        }
        drop(rx);

        tracing::info!(
            "Listening on {} ({} workers, max {} connections)",
            self.listener.local_addr()?,
            worker_count,
            self.config.max_connections
        );

        while !self.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    // Accepted sockets may inherit non-blocking mode from the listener
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping {}: {}", peer, e);
                        continue;
                    }

                    if self.active.load(Ordering::Acquire) >= self.config.max_connections {
                        tracing::warn!("Refusing {}: connection limit reached", peer);
                        let mut stream = stream;
                        let _ = write_response(&mut stream, &Response::error("too many connections"));
                        continue;
                    }

                    let id = match self.open.register(&stream) {
                        Ok(id) => id,
                        Err(e) => {
                            tracing::warn!("Dropping {}: {}", peer, e);
                            continue;
                        }
                    };

                    self.active.fetch_add(1, Ordering::AcqRel);
                    if tx.send((id, stream)).is_err() {
                        // All workers are gone
                        break;
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        let closed = self.open.close_all();
        tracing::info!(
            "Shutting down, closed {} open connections, waiting for {} workers",
            closed,
            workers.len()
        );
        drop(tx);
        for worker in workers {
            let _ = worker.join();
        }

        Ok(())
    }
}

fn serve(stream: TcpStream, store: Arc<dyn DocumentStore>, read_ms: u64, write_ms: u64) -> Result<()> {
    let mut connection = Connection::new(stream, store)?;
    connection.set_timeouts(read_ms, write_ms)?;
    connection.handle()
}
