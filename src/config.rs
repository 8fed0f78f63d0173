//! Configuration for ShelfKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, ShelfError};

/// Main configuration for a ShelfKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the persistent cache
    /// Internal structure:
    ///   {data_dir}/
    ///     └── cache.wal        (write-ahead log of cache mutations)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    /// Minimum number of WAL entries before automatic compaction is considered.
    /// Compaction runs once the log also holds more than twice the live entry
    /// count. Zero disables automatic compaction.
    pub compact_threshold: usize,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./shelfkv_data"),
            wal_sync_strategy: WalSyncStrategy::EveryNEntries { count: 100 },
            compact_threshold: 10_000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the cache cannot run with
    pub fn validate(&self) -> Result<()> {
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(ShelfError::Config(
                "EveryNEntries sync strategy needs a count of at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for the persistent cache)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the automatic compaction threshold (0 disables)
    pub fn compact_threshold(mut self, entries: usize) -> Self {
        self.config.compact_threshold = entries;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
