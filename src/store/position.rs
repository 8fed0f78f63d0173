//! Positioning primitives
//!
//! Binary searches over a sorted record slice. Every function assumes the
//! slice is ordered by `(key, value)`; results are unspecified otherwise.

use crate::key::{Key, KeyRange};
use crate::record::Record;

/// Find a record with exactly `key`.
///
/// When several records share the key (index stores) any one of them may
/// be returned.
pub fn find_by_key<'a>(records: &'a [Record], key: &Key) -> Option<&'a Record> {
    index_of_key(records, key).map(|i| &records[i])
}

/// Find the first record (ascending) whose key lies in `range`
pub fn find_by_key_range<'a>(records: &'a [Record], range: &KeyRange) -> Option<&'a Record> {
    index_of_key_range(records, range).map(|i| &records[i])
}

/// Index of some record with exactly `key`
pub fn index_of_key(records: &[Record], key: &Key) -> Option<usize> {
    records.binary_search_by(|r| r.key.cmp(key)).ok()
}

/// Index of the first record whose key is `>= key`
pub fn index_of_key_gte(records: &[Record], key: &Key) -> Option<usize> {
    let index = records.partition_point(|r| r.key < *key);
    (index < records.len()).then_some(index)
}

/// Index of the first record whose key lies in `range`
pub fn index_of_key_range(records: &[Record], range: &KeyRange) -> Option<usize> {
    let index = lower_edge(records, range);
    records
        .get(index)
        .filter(|r| range.includes(&r.key))
        .map(|_| index)
}

// =============================================================================
// Crate-internal positions
// =============================================================================

/// Index of the first record with exactly `key` (the lowest value among
/// duplicates)
pub(crate) fn first_index_of_key(records: &[Record], key: &Key) -> Option<usize> {
    index_of_key_gte(records, key).filter(|&i| records[i].key == *key)
}

/// Number of leading records that fail the range's lower bound
pub(crate) fn lower_edge(records: &[Record], range: &KeyRange) -> usize {
    records.partition_point(|r| range.below_lower(&r.key))
}

/// Number of leading records that satisfy the range's upper bound; the
/// exclusive end of a reverse scan.
pub(crate) fn upper_edge(records: &[Record], range: &KeyRange) -> usize {
    records.partition_point(|r| !range.above_upper(&r.key))
}

/// Where `record` goes: before the first existing record `>=` it, so a
/// record equal to an existing one lands immediately in front of it.
pub(crate) fn insertion_point(records: &[Record], record: &Record) -> usize {
    records.partition_point(|r| r < record)
}
