//! RedisStore Tests
//!
//! Tests verify:
//! - URL and connection failures map to the right error kinds
//! - get/set/keys through the redis client against a minimal RESP server
//! - The storage adapter end to end over the Redis backend
//!
//! `test_live_redis_roundtrip` needs a real server and is ignored by default:
//! `NRSTORE_REDIS_URL=redis://127.0.0.1:6379/15 cargo test -- --ignored`

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use nrstore::config::{RedisConfig, StoreConfig};
use nrstore::store::glob_match;
use nrstore::{
    Config, DocumentStore, Error, LibraryReply, ListingEntry, MemoryStore, ReconnectStrategy,
    RedisStore, Storage,
};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

/// Speaks just enough RESP2 for GET, SET, KEYS, PING and QUIT over a
/// `MemoryStore`; anything else is acknowledged with `+OK`
struct RespServer {
    addr: SocketAddr,
    backing: Arc<MemoryStore>,
}

impl RespServer {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let backing = Arc::new(MemoryStore::connected());

        let store = Arc::clone(&backing);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let store = Arc::clone(&store);
                thread::spawn(move || serve_resp(stream, &store));
            }
        });

        Self { addr, backing }
    }

    fn url(&self) -> String {
        format!("redis://{}/", self.addr)
    }

    fn store(&self) -> RedisStore {
        RedisStore::new(
            RedisConfig { url: self.url() },
            StoreConfig::default(),
            ReconnectStrategy::Never,
        )
    }
}

fn serve_resp(stream: TcpStream, store: &MemoryStore) {
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);

    while let Some(args) = read_array(&mut reader) {
        let name = String::from_utf8_lossy(&args[0]).to_ascii_uppercase();
        let reply = match name.as_str() {
            "GET" => match store.get(&String::from_utf8_lossy(&args[1])).unwrap() {
                Some(value) => bulk(&value),
                None => b"$-1\r\n".to_vec(),
            },
            "SET" => {
                store
                    .set(&String::from_utf8_lossy(&args[1]), &args[2])
                    .unwrap();
                b"+OK\r\n".to_vec()
            }
            "KEYS" => {
                let pattern = String::from_utf8_lossy(&args[1]).into_owned();
                let keys = store.keys("*").unwrap();
                let matching: Vec<&String> =
                    keys.iter().filter(|k| glob_match(&pattern, k)).collect();
                let mut out = format!("*{}\r\n", matching.len()).into_bytes();
                for key in matching {
                    out.extend(bulk(key.as_bytes()));
                }
                out
            }
            "PING" => b"+PONG\r\n".to_vec(),
            "QUIT" => {
                let _ = writer.write_all(b"+OK\r\n");
                return;
            }
            _ => b"+OK\r\n".to_vec(),
        };
        if writer.write_all(&reply).is_err() {
            return;
        }
    }
}

fn read_array(reader: &mut BufReader<TcpStream>) -> Option<Vec<Vec<u8>>> {
    let count = read_header(reader, b'*')?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        let len = read_header(reader, b'$')?;
        let mut arg = vec![0u8; len + 2];
        reader.read_exact(&mut arg).ok()?;
        arg.truncate(len);
        args.push(arg);
    }
    Some(args)
}

fn read_header(reader: &mut BufReader<TcpStream>, marker: u8) -> Option<usize> {
    let mut line = String::new();
    if reader.read_line(&mut line).ok()? == 0 || line.as_bytes()[0] != marker {
        return None;
    }
    line[1..].trim_end().parse().ok()
}

fn bulk(value: &[u8]) -> Vec<u8> {
    let mut out = format!("${}\r\n", value.len()).into_bytes();
    out.extend_from_slice(value);
    out.extend_from_slice(b"\r\n");
    out
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_invalid_url_is_config_error() {
    let store = RedisStore::new(
        RedisConfig {
            url: "not a url".to_string(),
        },
        StoreConfig::default(),
        ReconnectStrategy::default(),
    );

    // Rejected on the first attempt even though the default strategy retries forever
    assert!(matches!(store.connect(), Err(Error::Config(_))));
    assert!(!store.is_connected());
}

#[test]
fn test_connect_refused_gives_up() {
    // Reserve a port, then free it so nothing is listening
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let store = RedisStore::new(
        RedisConfig {
            url: format!("redis://{}/", addr),
        },
        StoreConfig::default(),
        ReconnectStrategy::Fixed {
            delay_ms: 10,
            max_retries: Some(2),
        },
    );

    let err = store.connect().unwrap_err();
    assert!(err.is_connection_error(), "unexpected error: {}", err);
    assert!(!store.is_connected());
}

// =============================================================================
// Basic Operation Tests
// =============================================================================

#[test]
fn test_set_get_and_keys() {
    let server = RespServer::start();
    let store = server.store();
    store.connect().unwrap();
    store.ping().unwrap();

    store.set("nr:lib:flows:a/one", b"1").unwrap();
    store.set("nr:lib:flows:a/two", b"2").unwrap();
    store.set("nr:flows", b"[]").unwrap();

    assert_eq!(store.get("nr:lib:flows:a/one").unwrap(), Some(b"1".to_vec()));
    assert_eq!(server.backing.get("nr:flows").unwrap(), Some(b"[]".to_vec()));
    assert_eq!(store.get("missing").unwrap(), None);

    let mut keys = store.keys("nr:lib:flows:a/*").unwrap();
    keys.sort();
    assert_eq!(keys, vec!["nr:lib:flows:a/one", "nr:lib:flows:a/two"]);
}

#[test]
fn test_empty_value_is_not_absence() {
    let server = RespServer::start();
    let store = server.store();

    store.set("k", b"").unwrap();
    assert_eq!(store.get("k").unwrap(), Some(Vec::new()));
}

#[test]
fn test_close_is_idempotent() {
    let server = RespServer::start();
    let store = server.store();
    store.connect().unwrap();

    store.close().unwrap();
    assert!(!store.is_connected());
    store.close().unwrap();

    // Operations after close dial again
    store.set("k", b"v").unwrap();
    assert!(store.is_connected());
}

// =============================================================================
// Storage Adapter Tests
// =============================================================================

#[test]
fn test_storage_init_redis_end_to_end() {
    let server = RespServer::start();
    let config = Config::builder().redis_url(server.url()).build();
    let storage = Storage::init_redis(config).unwrap();

    storage.save_flows(&json!([{"id": "n1"}])).unwrap();
    assert_eq!(storage.get_flows(), json!([{"id": "n1"}]));
    assert_eq!(storage.get_settings(), json!({}));

    storage
        .save_library_entry("functions", "util/trim.js", json!({"name": "trim"}), "return x;")
        .unwrap();

    match storage.get_library_entry("functions", "/").unwrap() {
        LibraryReply::Listing(listing) => {
            assert_eq!(listing.entries(), &[ListingEntry::Directory("util".to_string())]);
        }
        other => panic!("expected listing, got {:?}", other),
    }
    assert_eq!(
        storage
            .fetch_library_body("functions", "util/trim.js")
            .unwrap()
            .as_deref(),
        Some("return x;")
    );

    storage.close().unwrap();
}

#[test]
#[ignore]
fn test_live_redis_roundtrip() {
    let Ok(url) = std::env::var("NRSTORE_REDIS_URL") else {
        return;
    };
    let storage = Storage::init_redis(Config::builder().redis_url(url).build()).unwrap();
    storage.store().ping().unwrap();

    storage.save_sessions(&json!({"token": {"user": "admin"}})).unwrap();
    assert_eq!(storage.get_sessions(), json!({"token": {"user": "admin"}}));

    storage
        .save_library_entry("flows", "live/test.json", json!({}), "[]")
        .unwrap();
    assert_eq!(
        storage.fetch_library_body("flows", "live/test.json").unwrap().as_deref(),
        Some("[]")
    );

    storage.close().unwrap();
}
