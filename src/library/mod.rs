//! Library Module
//!
//! Emulates a directory hierarchy of library entries on a flat key space.
//!
//! ## Path Convention
//! - A path starting with `/` names a directory to list; the leading `/` is
//!   stripped and the remainder (`rel`, possibly empty) is used as a key
//!   prefix
//! - Any other path names a leaf entry and is used verbatim in its key
//!
//! ## Stored Form
//! Each leaf is one JSON document `{"meta": ..., "body": "..."}` under
//! `nr:lib:<type>:<path>`. Directories are never stored; listings are
//! synthesized from key prefixes.

mod entry;
mod listing;

pub use entry::LibraryEntry;
pub use listing::{Listing, ListingEntry};

/// Path separator of the virtual hierarchy
pub const SEPARATOR: char = '/';

/// What a `getLibraryEntry` path asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryRequest<'a> {
    /// List the directory at `rel` (leading separator stripped)
    List { rel: &'a str },

    /// Fetch the leaf entry at `path`
    Entry { path: &'a str },
}

impl<'a> LibraryRequest<'a> {
    /// Classify a caller-supplied path
    pub fn parse(path: &'a str) -> Self {
        match path.strip_prefix(SEPARATOR) {
            Some(rel) => LibraryRequest::List { rel },
            None => LibraryRequest::Entry { path },
        }
    }
}

/// Result of `getLibraryEntry`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryReply {
    /// Directory listing
    Listing(Listing),

    /// Body of a leaf entry, `None` when nothing is stored there
    Body(Option<String>),
}
