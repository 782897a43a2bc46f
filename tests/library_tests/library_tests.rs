//! Library Tests
//!
//! Tests verify:
//! - Listing synthesis from enumerated keys
//! - Listing JSON shape
//! - Entry encoding and corruption detection

use nrstore::library::{LibraryEntry, Listing, ListingEntry};
use nrstore::Error;
use serde_json::json;

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

// =============================================================================
// Listing Synthesis Tests
// =============================================================================

#[test]
fn test_suffix_without_separator_is_file() {
    assert_eq!(
        ListingEntry::from_suffix("c.txt"),
        ListingEntry::File {
            name: "c.txt".to_string()
        }
    );
}

#[test]
fn test_suffix_with_separator_is_first_segment() {
    assert_eq!(
        ListingEntry::from_suffix("a/b/c.txt"),
        ListingEntry::Directory("a".to_string())
    );
}

#[test]
fn test_suffix_single_leading_separator_is_dropped() {
    assert_eq!(
        ListingEntry::from_suffix("/c.txt"),
        ListingEntry::File {
            name: "c.txt".to_string()
        }
    );
    // Only one is dropped: the empty first segment becomes a directory marker
    assert_eq!(
        ListingEntry::from_suffix("//c.txt"),
        ListingEntry::Directory(String::new())
    );
}

#[test]
fn test_listing_preserves_enumeration_order() {
    let listing = Listing::from_keys(
        "nr:lib:t:",
        keys(&["nr:lib:t:z.txt", "nr:lib:t:a/b.txt", "nr:lib:t:m.txt"]),
    );

    let names: Vec<&str> = listing.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["z.txt", "a", "m.txt"]);
}

#[test]
fn test_listing_without_trailing_separator_matches_siblings() {
    // Listing "/a" uses the raw prefix "a", so "abc.txt" is reported as a file
    let listing = Listing::from_keys(
        "nr:lib:t:a",
        keys(&["nr:lib:t:a/b.txt", "nr:lib:t:abc.txt"]),
    );

    assert_eq!(
        listing.entries(),
        &[
            ListingEntry::File {
                name: "b.txt".to_string()
            },
            ListingEntry::File {
                name: "bc.txt".to_string()
            },
        ]
    );
}

#[test]
fn test_listing_skips_foreign_keys() {
    let listing = Listing::from_keys("nr:lib:t:", keys(&["nr:flows", "nr:lib:t:x"]));
    assert_eq!(listing.len(), 1);
}

#[test]
fn test_deduplicated_keeps_files_and_first_directory() {
    let listing = Listing::from(vec![
        ListingEntry::Directory("a".to_string()),
        ListingEntry::File {
            name: "x".to_string(),
        },
        ListingEntry::Directory("a".to_string()),
        ListingEntry::Directory("b".to_string()),
    ]);

    let deduped = listing.deduplicated();
    let names: Vec<&str> = deduped.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["a", "x", "b"]);
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_listing_json_shape() {
    let listing = Listing::from(vec![
        ListingEntry::Directory("a".to_string()),
        ListingEntry::File {
            name: "c.txt".to_string(),
        },
    ]);

    assert_eq!(serde_json::to_value(&listing).unwrap(), json!(["a", {"fn": "c.txt"}]));
}

#[test]
fn test_listing_json_parses_back() {
    let listing: Listing = serde_json::from_value(json!(["a", {"fn": "c.txt"}])).unwrap();
    assert!(listing.entries()[0].is_directory());
    assert!(!listing.entries()[1].is_directory());
}

#[test]
fn test_entry_stored_form() {
    let entry = LibraryEntry::new(json!({"tags": ["x"]}), "body text");
    let stored: serde_json::Value = serde_json::from_slice(&entry.encode().unwrap()).unwrap();

    assert_eq!(stored, json!({"meta": {"tags": ["x"]}, "body": "body text"}));
}

#[test]
fn test_entry_decode_reports_key_on_corruption() {
    let err = LibraryEntry::decode("nr:lib:t:x", b"{\"meta\": {}}").unwrap_err();

    match err {
        Error::CorruptEntry { key, .. } => assert_eq!(key, "nr:lib:t:x"),
        other => panic!("Expected CorruptEntry, got {:?}", other),
    }
}

#[test]
fn test_entry_decode_without_meta_defaults_to_null() {
    let entry = LibraryEntry::decode("k", br#"{"body": "b"}"#).unwrap();
    assert_eq!(entry.meta, serde_json::Value::Null);
    assert_eq!(entry.body, "b");
}
