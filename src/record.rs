//! Record definitions
//!
//! A record is a `(key, value)` pair held by a record store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::key::Key;

/// A `(key, value)` pair.
///
/// In an object store `value` is the encoded payload; in an index store
/// `key` is the indexed field and `value` the referenced primary key.
///
/// The derived ordering is `(key, value)`, which is exactly the order a
/// record store keeps its records in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Record {
    pub key: Key,
    pub value: Key,
}

impl Record {
    pub fn new(key: impl Into<Key>, value: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Check both halves are orderable keys
    pub fn validate(&self) -> Result<()> {
        self.key.validate()?;
        self.value.validate()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.key, self.value)
    }
}

/// What a record store holds: primary records or index entries.
///
/// Both obey the same sort order; the type only namespaces cache addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreType {
    Object,
    Index,
}

impl StoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::Object => "object",
            StoreType::Index => "index",
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
