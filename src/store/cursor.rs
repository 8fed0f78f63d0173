//! Record cursors
//!
//! A single-pass, directional walk over a record store, bounded by a key
//! range.

use std::iter::FusedIterator;

use crate::key::KeyRange;
use crate::record::Record;

use super::position;

/// Traversal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending key order
    #[default]
    Next,

    /// Descending key order
    Prev,
}

/// A bounded cursor over a store's records.
///
/// The cursor borrows the store, so the store cannot change under it.
/// Abandoning a scan is just dropping the cursor.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    records: &'a [Record],
    range: KeyRange,
    direction: Direction,
    /// `Next`: index of the next candidate.
    /// `Prev`: one past the index of the next candidate.
    position: usize,
    finished: bool,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(records: &'a [Record], range: Option<&KeyRange>, direction: Direction) -> Self {
        let range = range.cloned().unwrap_or_default();
        let position = match direction {
            Direction::Next => position::lower_edge(records, &range),
            Direction::Prev => position::upper_edge(records, &range),
        };

        Self {
            records,
            range,
            direction,
            position,
            finished: false,
        }
    }

    /// Move to the next record, or `None` once the far bound (or the end of
    /// the store) is reached. Exhaustion is permanent.
    pub fn advance(&mut self) -> Option<&'a Record> {
        if self.finished {
            return None;
        }

        let records = self.records;
        let candidate = match self.direction {
            Direction::Next => records
                .get(self.position)
                .filter(|r| !self.range.above_upper(&r.key)),
            Direction::Prev => self
                .position
                .checked_sub(1)
                .and_then(|i| records.get(i))
                .filter(|r| !self.range.below_lower(&r.key)),
        };

        match candidate {
            Some(record) => {
                match self.direction {
                    Direction::Next => self.position += 1,
                    Direction::Prev => self.position -= 1,
                }
                Some(record)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn range(&self) -> &KeyRange {
        &self.range
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

impl FusedIterator for Cursor<'_> {}
