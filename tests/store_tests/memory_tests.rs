//! MemoryStore Tests
//!
//! Tests verify:
//! - Connect/close lifecycle
//! - Basic get/set
//! - Pattern enumeration and ordering
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use nrstore::{DocumentStore, Error, MemoryStore};

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_new_store_is_disconnected_and_empty() {
    let store = MemoryStore::new();
    assert!(!store.is_connected());
    assert!(store.is_empty());
}

#[test]
fn test_operations_require_connection() {
    let store = MemoryStore::new();

    assert!(matches!(store.get("k"), Err(Error::NotConnected)));
    assert!(matches!(store.set("k", b"v"), Err(Error::NotConnected)));
    assert!(matches!(store.keys("*"), Err(Error::NotConnected)));
}

#[test]
fn test_connect_and_close_are_idempotent() {
    let store = MemoryStore::new();

    store.connect().unwrap();
    store.connect().unwrap();
    assert!(store.is_connected());

    store.close().unwrap();
    store.close().unwrap();
    assert!(!store.is_connected());
}

#[test]
fn test_data_is_kept_across_reconnect() {
    let store = MemoryStore::connected();
    store.set("k", b"v").unwrap();

    store.close().unwrap();
    store.connect().unwrap();

    assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_set_and_get() {
    let store = MemoryStore::connected();

    store.set("hello", b"world").unwrap();

    assert_eq!(store.get("hello").unwrap(), Some(b"world".to_vec()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_get_nonexistent_key() {
    let store = MemoryStore::connected();
    assert_eq!(store.get("nonexistent").unwrap(), None);
}

#[test]
fn test_empty_value_is_not_absent() {
    let store = MemoryStore::connected();
    store.set("empty", b"").unwrap();
    assert_eq!(store.get("empty").unwrap(), Some(Vec::new()));
}

#[test]
fn test_set_overwrites_existing() {
    let store = MemoryStore::connected();

    store.set("k", b"one").unwrap();
    store.set("k", b"two").unwrap();

    assert_eq!(store.get("k").unwrap(), Some(b"two".to_vec()));
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Enumeration Tests
// =============================================================================

#[test]
fn test_keys_prefix_match_in_sorted_order() {
    let store = MemoryStore::connected();
    for key in ["nr:lib:t:c", "nr:flows", "nr:lib:t:a", "nr:lib:u:b", "nr:lib:t:b/x"] {
        store.set(key, b"{}").unwrap();
    }

    let keys = store.keys("nr:lib:t:*").unwrap();
    assert_eq!(keys, vec!["nr:lib:t:a", "nr:lib:t:b/x", "nr:lib:t:c"]);
}

#[test]
fn test_keys_without_match_is_empty() {
    let store = MemoryStore::connected();
    store.set("nr:flows", b"[]").unwrap();

    assert!(store.keys("nr:lib:*").unwrap().is_empty());
}

#[test]
fn test_keys_escaped_pattern_is_literal() {
    let store = MemoryStore::connected();
    store.set("a?c", b"1").unwrap();
    store.set("abc", b"2").unwrap();

    assert_eq!(store.keys(r"a\?c").unwrap(), vec!["a?c"]);
    assert_eq!(store.keys("a?c").unwrap(), vec!["a?c", "abc"]);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers_and_readers() {
    let store = Arc::new(MemoryStore::connected());
    let mut handles = vec![];

    for t in 0..4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                let key = format!("t{}:k{}", t, i);
                store.set(&key, key.as_bytes()).unwrap();
                assert_eq!(store.get(&key).unwrap(), Some(key.into_bytes()));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 200);
    assert_eq!(store.keys("t2:*").unwrap().len(), 50);
}
