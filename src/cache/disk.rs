//! Disk-backed cache
//!
//! A `PersistentCache` whose contents live in memory and whose durability
//! comes from a write-ahead log of every `set`/`delete`.
//!
//! ## Lifecycle
//! ```text
//! new(config) ──► load() ──► set / delete / compact ... ──► sync()
//!   (unloaded)     │
//!                  └─ recover WAL, replay into the map, open writer
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::ops::Bound;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::{Config, WalSyncStrategy};
use crate::error::{Result, ShelfError};
use crate::record::Record;
use crate::wal::{Operation, WalRecovery, WalWriter};

use super::PersistentCache;

/// State that only exists once the cache is loaded
struct LoadedState {
    /// Live contents, by address
    entries: BTreeMap<String, Record>,

    /// Appends to the log
    writer: WalWriter,

    /// Entries currently in the log file (live or superseded)
    wal_entries: usize,
}

/// WAL-backed persistent cache
///
/// ## Concurrency:
/// - `state`: one RwLock; prefix scans share it, mutations take it exclusively
/// - All methods use `&self`, so the cache can sit behind an `Arc`
pub struct DiskCache {
    config: Config,
    wal_path: PathBuf,
    state: RwLock<Option<LoadedState>>,
}

impl DiskCache {
    const WAL_FILENAME: &'static str = "cache.wal";
    const COMPACT_SUFFIX: &'static str = "compact";

    /// Create an unloaded cache rooted at `config.data_dir`
    pub fn new(config: Config) -> Self {
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);
        Self {
            config,
            wal_path,
            state: RwLock::new(None),
        }
    }

    /// Recover the log and make the cache ready. Loading twice is a no-op.
    ///
    /// 1. Validate the config and create the data directory
    /// 2. Recover the WAL, dropping any torn or corrupt tail
    /// 3. Replay every operation into the map
    /// 4. Open the writer after the last valid entry
    pub fn load(&self) -> Result<()> {
        let mut state = self.state.write();
        if state.is_some() {
            debug!(path = %self.wal_path.display(), "Cache already loaded");
            return Ok(());
        }

        self.config.validate()?;
        fs::create_dir_all(&self.config.data_dir)?;

        let mut entries = BTreeMap::new();
        let mut wal_entries = 0;

        if self.wal_path.exists() {
            let (recovered, result) = WalRecovery::recover(&self.wal_path)?;
            wal_entries = recovered.len();

            for entry in recovered {
                match entry.operation {
                    Operation::Set { address, record } => {
                        record.validate()?;
                        entries.insert(address, record);
                    }
                    Operation::Delete { address } => {
                        entries.remove(&address);
                    }
                }
            }

            info!(
                recovered = result.entries_recovered,
                corrupted = result.entries_corrupted,
                last_lsn = result.last_lsn,
                live = entries.len(),
                "Replayed cache WAL"
            );
        }

        let writer = WalWriter::open(&self.wal_path, self.config.wal_sync_strategy)?;

        *state = Some(LoadedState {
            entries,
            writer,
            wal_entries,
        });
        Ok(())
    }

    /// Rewrite the log so it holds exactly one `Set` per live record
    pub fn compact(&self) -> Result<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(ShelfError::CacheNotLoaded)?;
        Self::rewrite(&self.wal_path, self.config.wal_sync_strategy, state)
    }

    /// Force the log to disk
    pub fn sync(&self) -> Result<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(ShelfError::CacheNotLoaded)?;
        state.writer.sync()
    }

    /// Number of live records (0 before loading)
    pub fn len(&self) -> usize {
        self.state.read().as_ref().map_or(0, |s| s.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries in the log file (0 before loading)
    pub fn wal_entries(&self) -> usize {
        self.state.read().as_ref().map_or(0, |s| s.wal_entries)
    }

    /// Path of the log file
    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Compact once the log is large and mostly superseded.
    ///
    /// Runs after a mutation has already been logged, so a failure here is
    /// logged and swallowed: the mutation stands and the old log stays valid.
    fn maybe_compact(&self, state: &mut LoadedState) {
        let threshold = self.config.compact_threshold;
        if threshold > 0
            && state.wal_entries >= threshold
            && state.wal_entries > 2 * state.entries.len()
        {
            if let Err(e) = Self::rewrite(&self.wal_path, self.config.wal_sync_strategy, state) {
                warn!(error = %e, wal_entries = state.wal_entries, "Automatic WAL compaction failed");
            }
        }
    }

    /// Write the live set to a side file, then swap it in
    fn rewrite(wal_path: &Path, strategy: WalSyncStrategy, state: &mut LoadedState) -> Result<()> {
        let before = state.wal_entries;
        let tmp_path = wal_path.with_extension(Self::COMPACT_SUFFIX);

        {
            let mut tmp = WalWriter::open(&tmp_path, WalSyncStrategy::EveryNEntries { count: usize::MAX })?;
            // Leftover from an interrupted compaction
            tmp.truncate()?;
            for (address, record) in &state.entries {
                tmp.append(Operation::Set {
                    address: address.clone(),
                    record: record.clone(),
                })?;
            }
            tmp.sync()?;
        }

        state.writer.sync()?;
        fs::rename(&tmp_path, wal_path)?;
        state.writer = WalWriter::open(wal_path, strategy)?;
        state.wal_entries = state.entries.len();

        info!(before, after = state.wal_entries, "Compacted cache WAL");
        Ok(())
    }
}

impl PersistentCache for DiskCache {
    fn is_loaded(&self) -> bool {
        self.state.read().is_some()
    }

    fn values_with_prefix(&self, prefix: &str) -> Result<Vec<Record>> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(ShelfError::CacheNotLoaded)?;
        Ok(state
            .entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(address, _)| address.starts_with(prefix))
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn set(&self, address: &str, record: &Record) -> Result<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(ShelfError::CacheNotLoaded)?;

        state.writer.append(Operation::Set {
            address: address.to_string(),
            record: record.clone(),
        })?;
        state.entries.insert(address.to_string(), record.clone());
        state.wal_entries += 1;

        self.maybe_compact(state);
        Ok(())
    }

    fn delete(&self, address: &str) -> Result<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(ShelfError::CacheNotLoaded)?;

        if !state.entries.contains_key(address) {
            return Ok(());
        }

        state.writer.append(Operation::Delete {
            address: address.to_string(),
        })?;
        state.entries.remove(address);
        state.wal_entries += 1;

        self.maybe_compact(state);
        Ok(())
    }
}
