//! Record store implementation
//!
//! Sorted-vector store with write-through to a shared persistent cache.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{self, PersistentCache, SEPARATOR};
use crate::error::{Result, ShelfError};
use crate::key::KeyRange;
use crate::record::{Record, StoreType};

use super::{position, Cursor, Direction, KeyQuery};

/// The ordered records of one object store or index.
///
/// ## Ownership
/// - `records`: exclusively owned; mutations need `&mut self`
/// - `cache`: shared with every other store of the same database, each
///   store writing under its own prefix
///
/// Every mutation hits the cache first and memory second, so a failed
/// cache write leaves the in-memory record where it was.
pub struct RecordStore {
    /// Namespace of this store inside the cache
    key_prefix: String,

    /// Object store or index (only affects cache addressing)
    store_type: StoreType,

    /// Write-through target, also the hydration source
    cache: Arc<dyn PersistentCache>,

    /// Sorted by `(key, value)`
    records: Vec<Record>,
}

impl RecordStore {
    /// Open a store, hydrating it from every cached record under its prefix.
    ///
    /// Fails with `CacheNotLoaded` if the cache has not finished loading, and
    /// with `InvalidPrefix` if the prefix contains the address separator.
    pub fn open(
        cache: Arc<dyn PersistentCache>,
        key_prefix: impl Into<String>,
        store_type: StoreType,
    ) -> Result<Self> {
        let key_prefix = key_prefix.into();

        if !cache.is_loaded() {
            return Err(ShelfError::CacheNotLoaded);
        }
        if key_prefix.contains(SEPARATOR) {
            return Err(ShelfError::InvalidPrefix(format!(
                "{:?} contains the separator {:?}",
                key_prefix, SEPARATOR
            )));
        }

        let mut records = cache.values_with_prefix(&cache::scan_prefix(store_type, &key_prefix))?;
        for record in &records {
            record.validate()?;
        }
        // Cache order is address order, not key order
        records.sort();

        debug!(
            prefix = %key_prefix,
            store_type = %store_type,
            records = records.len(),
            "Hydrated record store"
        );

        Ok(Self {
            key_prefix,
            store_type,
            cache,
            records,
        })
    }

    /// The record with an exact key (any one, if the key repeats) or the
    /// first record in a range.
    pub fn get(&self, query: impl Into<KeyQuery>) -> Option<&Record> {
        match query.into() {
            KeyQuery::Key(key) => position::find_by_key(&self.records, &key),
            KeyQuery::Range(range) => position::find_by_key_range(&self.records, &range),
        }
    }

    /// Insert a record in `(key, value)` order.
    ///
    /// Duplicate keys are legal. A record equal to an existing one is placed
    /// immediately before it.
    pub fn add(&mut self, record: Record) -> Result<()> {
        record.validate()?;

        self.cache.set(&self.address(&record), &record)?;

        let index = position::insertion_point(&self.records, &record);
        self.records.insert(index, record);
        Ok(())
    }

    /// Remove every record whose key matches, returning them in removal
    /// order (ascending).
    pub fn delete(&mut self, query: impl Into<KeyQuery>) -> Result<Vec<Record>> {
        let query = query.into();
        let mut removed = Vec::new();

        while let Some(index) = self.first_match(&query) {
            removed.push(self.remove_at(index)?);
        }

        Ok(removed)
    }

    /// Remove every record whose *value* matches; used to purge index
    /// entries that point at a deleted primary key.
    pub fn delete_by_value(&mut self, query: impl Into<KeyQuery>) -> Result<Vec<Record>> {
        let query = query.into();
        let mut removed = Vec::new();

        let mut index = 0;
        while index < self.records.len() {
            if query.matches(&self.records[index].value) {
                removed.push(self.remove_at(index)?);
            } else {
                index += 1;
            }
        }

        Ok(removed)
    }

    /// Remove and return every record.
    ///
    /// If a cache delete fails, the records already deleted from the cache
    /// are dropped from memory too and the error is returned.
    pub fn clear(&mut self) -> Result<Vec<Record>> {
        let mut deleted = 0;
        let mut outcome = Ok(());

        for record in &self.records {
            if let Err(e) = self.cache.delete(&self.address(record)) {
                outcome = Err(e);
                break;
            }
            deleted += 1;
        }

        let removed: Vec<Record> = self.records.drain(..deleted).collect();
        outcome.map(|()| removed)
    }

    /// A cursor over the records in `range` (all records when `None`)
    pub fn values(&self, range: Option<&KeyRange>, direction: Direction) -> Cursor<'_> {
        Cursor::new(&self.records, range, direction)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn store_type(&self) -> StoreType {
        self.store_type
    }

    /// All records, in `(key, value)` order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn address(&self, record: &Record) -> String {
        cache::record_address(self.store_type, &self.key_prefix, record)
    }

    fn first_match(&self, query: &KeyQuery) -> Option<usize> {
        match query {
            KeyQuery::Key(key) => position::first_index_of_key(&self.records, key),
            KeyQuery::Range(range) => position::index_of_key_range(&self.records, range),
        }
    }

    fn remove_at(&mut self, index: usize) -> Result<Record> {
        let address = self.address(&self.records[index]);
        self.cache.delete(&address)?;
        Ok(self.records.remove(index))
    }
}
