//! Key ranges
//!
//! An immutable, optionally open interval over the key order.

use std::cmp::Ordering;

use crate::error::{Result, ShelfError};

use super::Key;

/// An interval over keys. A missing bound is unbounded on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    lower: Option<Key>,
    upper: Option<Key>,
    lower_open: bool,
    upper_open: bool,
}

impl KeyRange {
    /// A range matching exactly one key
    pub fn only(key: Key) -> Self {
        Self {
            lower: Some(key.clone()),
            upper: Some(key),
            lower_open: false,
            upper_open: false,
        }
    }

    /// A range with both bounds.
    ///
    /// Fails if `lower > upper`, or if the bounds are equal and either side
    /// is open (such a range could never match anything).
    pub fn bound(lower: Key, upper: Key, lower_open: bool, upper_open: bool) -> Result<Self> {
        match lower.cmp(&upper) {
            Ordering::Greater => {
                return Err(ShelfError::InvalidRange(format!(
                    "lower bound {} is greater than upper bound {}",
                    lower, upper
                )));
            }
            Ordering::Equal if lower_open || upper_open => {
                return Err(ShelfError::InvalidRange(format!(
                    "bounds are both {} but the range is open",
                    lower
                )));
            }
            _ => {}
        }

        Ok(Self {
            lower: Some(lower),
            upper: Some(upper),
            lower_open,
            upper_open,
        })
    }

    /// A range bounded below only
    pub fn lower_bound(lower: Key, open: bool) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
            lower_open: open,
            upper_open: false,
        }
    }

    /// A range bounded above only
    pub fn upper_bound(upper: Key, open: bool) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
            lower_open: false,
            upper_open: open,
        }
    }

    /// A range matching every key
    pub fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
            lower_open: false,
            upper_open: false,
        }
    }

    pub fn lower(&self) -> Option<&Key> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&Key> {
        self.upper.as_ref()
    }

    pub fn lower_open(&self) -> bool {
        self.lower_open
    }

    pub fn upper_open(&self) -> bool {
        self.upper_open
    }

    /// True iff `key` satisfies both bounds
    pub fn includes(&self, key: &Key) -> bool {
        !self.below_lower(key) && !self.above_upper(key)
    }

    /// True iff `key` falls before the lower bound (or on it, when open)
    pub fn below_lower(&self, key: &Key) -> bool {
        match &self.lower {
            None => false,
            Some(lower) => match key.cmp(lower) {
                Ordering::Less => true,
                Ordering::Equal => self.lower_open,
                Ordering::Greater => false,
            },
        }
    }

    /// True iff `key` falls after the upper bound (or on it, when open)
    pub fn above_upper(&self, key: &Key) -> bool {
        match &self.upper {
            None => false,
            Some(upper) => match key.cmp(upper) {
                Ordering::Greater => true,
                Ordering::Equal => self.upper_open,
                Ordering::Less => false,
            },
        }
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::unbounded()
    }
}
