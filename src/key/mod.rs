//! Key Module
//!
//! The key domain shared by every record store.
//!
//! ## Responsibilities
//! - A closed set of key kinds (number, date, string, binary, array)
//! - One total order over all of them (see [`compare`])
//! - Bounded intervals over that order ([`KeyRange`])
//! - A textual literal syntax used for cache addressing and the CLI
//!
//! ## Kind Rank
//! ```text
//! Number < Date < Text < Binary < Array
//! ```
//! Keys of different kinds never compare by content, only by rank.

mod compare;
mod literal;
mod range;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShelfError};

pub use compare::compare;
pub use range::KeyRange;

/// A value that can be used to order and address records.
///
/// Numbers and dates must not be NaN. Build them through [`Key::number`] /
/// [`Key::date`] (or the infallible integer `From` impls) to get that check;
/// [`Key::validate`] re-checks keys that came from elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Key {
    /// A finite or infinite number
    Number(f64),

    /// An instant, as milliseconds since the Unix epoch
    Date(f64),

    /// A string, ordered by UTF-16 code unit
    Text(String),

    /// A byte sequence, ordered bytewise
    Binary(Vec<u8>),

    /// A sequence of keys, ordered element-wise
    Array(Vec<Key>),
}

/// The kind of a key. Declaration order is the cross-kind rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyKind {
    Number,
    Date,
    Text,
    Binary,
    Array,
}

impl Key {
    /// Create a number key, rejecting NaN
    pub fn number(value: f64) -> Result<Self> {
        if value.is_nan() {
            return Err(ShelfError::InvalidKey("number key is NaN".to_string()));
        }
        Ok(Key::Number(value))
    }

    /// Create a date key from milliseconds since the Unix epoch, rejecting NaN
    pub fn date(millis: f64) -> Result<Self> {
        if millis.is_nan() {
            return Err(ShelfError::InvalidKey("date key is NaN".to_string()));
        }
        Ok(Key::Date(millis))
    }

    /// Create a string key
    pub fn text(value: impl Into<String>) -> Self {
        Key::Text(value.into())
    }

    /// Create a binary key
    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Key::Binary(value.into())
    }

    /// Create an array key
    pub fn array(items: impl IntoIterator<Item = Key>) -> Self {
        Key::Array(items.into_iter().collect())
    }

    /// The kind of this key
    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Number(_) => KeyKind::Number,
            Key::Date(_) => KeyKind::Date,
            Key::Text(_) => KeyKind::Text,
            Key::Binary(_) => KeyKind::Binary,
            Key::Array(_) => KeyKind::Array,
        }
    }

    /// Check that this key (and every nested key) is orderable.
    pub fn validate(&self) -> Result<()> {
        match self {
            Key::Number(n) if n.is_nan() => {
                Err(ShelfError::InvalidKey("number key is NaN".to_string()))
            }
            Key::Date(d) if d.is_nan() => {
                Err(ShelfError::InvalidKey("date key is NaN".to_string()))
            }
            Key::Array(items) => items.iter().try_for_each(Key::validate),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Ordering (all of it goes through `compare`)
// =============================================================================

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Number(value as f64)
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key::Number(value as f64)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Number(value as f64)
    }
}

impl TryFrom<f64> for Key {
    type Error = ShelfError;

    fn try_from(value: f64) -> Result<Self> {
        Key::number(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Text(value)
    }
}

impl From<&[u8]> for Key {
    fn from(value: &[u8]) -> Self {
        Key::Binary(value.to_vec())
    }
}

impl From<Vec<u8>> for Key {
    fn from(value: Vec<u8>) -> Self {
        Key::Binary(value)
    }
}

impl From<Vec<Key>> for Key {
    fn from(value: Vec<Key>) -> Self {
        Key::Array(value)
    }
}
