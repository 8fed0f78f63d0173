//! Engine Module
//!
//! The entry point that ties a durable cache to the record stores built on
//! top of it.
//!
//! ## Responsibilities
//! - Open and load the WAL-backed persistent cache
//! - Hand out record stores sharing that cache
//! - Compaction, sync and shutdown of the cache

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::cache::{DiskCache, PersistentCache};
use crate::config::Config;
use crate::error::Result;
use crate::record::StoreType;
use crate::store::RecordStore;

/// The main storage engine
///
/// ## Ownership Model
///
/// - The cache is shared (`Arc`) by every store the engine opens
/// - Each `RecordStore` is owned by its caller; the engine keeps no
///   reference to it
/// - Each (type, prefix) pair owns its own address namespace in the cache
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Durable backend for every store
    cache: Arc<DiskCache>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Recover the cache WAL
    /// 3. Ready to open stores
    pub fn open(config: Config) -> Result<Self> {
        let cache = DiskCache::new(config.clone());
        cache.load()?;

        info!(
            data_dir = %config.data_dir.display(),
            records = cache.len(),
            "Engine opened"
        );

        Ok(Self {
            config,
            cache: Arc::new(cache),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Open the record store living under `key_prefix`
    pub fn open_store(&self, key_prefix: &str, store_type: StoreType) -> Result<RecordStore> {
        let cache: Arc<dyn PersistentCache> = self.cache.clone();
        RecordStore::open(cache, key_prefix, store_type)
    }

    /// Rewrite the cache log down to its live records
    pub fn compact(&self) -> Result<()> {
        self.cache.compact()
    }

    /// Force the cache log to disk
    pub fn sync(&self) -> Result<()> {
        self.cache.sync()
    }

    /// Close the engine gracefully
    pub fn close(self) -> Result<()> {
        self.cache.sync()?;
        info!("Engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the shared cache
    pub fn cache(&self) -> &Arc<DiskCache> {
        &self.cache
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
