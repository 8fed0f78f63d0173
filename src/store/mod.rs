//! Store Module
//!
//! The ordered in-memory record sequence behind one object store or index.
//!
//! ## Responsibilities
//! - Keep records sorted by `(key, value)` at all times
//! - O(log n) positioning through binary search
//! - Exact-key and range lookups, deletes and bounded cursors
//! - Write every mutation through to the persistent cache
//!
//! ## Data Structure Choice
//! A sorted `Vec<Record>`:
//! - Index stores need duplicate keys, which rules out a plain `BTreeMap<Key, _>`
//! - Cursors walk contiguous memory in either direction
//! - Inserts shift the tail; acceptable for the working sets this targets

pub mod position;

mod cursor;
mod record_store;

pub use cursor::{Cursor, Direction};
pub use record_store::RecordStore;

use crate::key::{Key, KeyRange};

/// Either an exact key or a key range, as accepted by store lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyQuery {
    Key(Key),
    Range(KeyRange),
}

impl KeyQuery {
    /// True iff `key` equals the exact key or lies in the range
    pub fn matches(&self, key: &Key) -> bool {
        match self {
            KeyQuery::Key(k) => k == key,
            KeyQuery::Range(range) => range.includes(key),
        }
    }
}

impl From<Key> for KeyQuery {
    fn from(key: Key) -> Self {
        KeyQuery::Key(key)
    }
}

impl From<&Key> for KeyQuery {
    fn from(key: &Key) -> Self {
        KeyQuery::Key(key.clone())
    }
}

impl From<KeyRange> for KeyQuery {
    fn from(range: KeyRange) -> Self {
        KeyQuery::Range(range)
    }
}

impl From<&KeyRange> for KeyQuery {
    fn from(range: &KeyRange) -> Self {
        KeyQuery::Range(range.clone())
    }
}
