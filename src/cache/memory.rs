//! In-memory cache
//!
//! A non-durable `PersistentCache`, for tests and for embedders that only
//! need the record store semantics.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::error::{Result, ShelfError};
use crate::record::Record;

use super::PersistentCache;

/// BTreeMap-backed cache with an explicit loaded flag
pub struct MemoryCache {
    entries: RwLock<BTreeMap<String, Record>>,
    loaded: AtomicBool,
}

impl MemoryCache {
    /// Create an empty cache that is already loaded
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            loaded: AtomicBool::new(true),
        }
    }

    /// Create an empty cache that must be [`load`](Self::load)ed before use
    pub fn unloaded() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            loaded: AtomicBool::new(false),
        }
    }

    /// Mark the cache as ready
    pub fn load(&self) {
        self.loaded.store(true, Ordering::SeqCst);
    }

    /// Record stored at an exact address
    pub fn get(&self, address: &str) -> Option<Record> {
        self.entries.read().get(address).cloned()
    }

    /// All addresses, in order
    pub fn addresses(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(ShelfError::CacheNotLoaded)
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentCache for MemoryCache {
    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn values_with_prefix(&self, prefix: &str) -> Result<Vec<Record>> {
        self.ensure_loaded()?;
        let entries = self.entries.read();
        Ok(entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(address, _)| address.starts_with(prefix))
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn set(&self, address: &str, record: &Record) -> Result<()> {
        self.ensure_loaded()?;
        self.entries.write().insert(address.to_string(), record.clone());
        Ok(())
    }

    fn delete(&self, address: &str) -> Result<()> {
        self.ensure_loaded()?;
        self.entries.write().remove(address);
        Ok(())
    }
}
