//! WAL Writer
//!
//! Handles appending entries to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::WalSyncStrategy;
use crate::error::{Result, ShelfError};

use super::{Operation, WalEntry, WalRecovery};

/// Writes entries to the WAL file
///
/// Entries go straight to the file (no user-space buffer), so a process
/// exit never loses an appended entry; the sync strategy only decides how
/// often it is fsynced.
///
/// Opening truncates any torn or corrupt tail (see [`WalRecovery::recover`])
/// and continues the LSN sequence after the last valid entry. A failed
/// append is cut back off the file, so the log always ends on a whole entry.
pub struct WalWriter {
    path: PathBuf,
    file: File,
    /// LSN the next append will use
    current_lsn: u64,
    sync_strategy: WalSyncStrategy,
    /// Entries appended since the last fsync
    uncommitted: usize,
}

impl WalWriter {
    /// Open or create a WAL file
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let current_lsn = if path.exists() {
            WalRecovery::recover(path)?.1.last_lsn + 1
        } else {
            1
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            current_lsn,
            sync_strategy,
            uncommitted: 0,
        })
    }

    /// Append an operation, returning the LSN it was logged under
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let lsn = self.current_lsn;
        let bytes = WalEntry::new(lsn, operation).serialize()?;
        let valid_len = self.file.metadata()?.len();

        if let Err(e) = self.file.write_all(&bytes) {
            // Drop whatever part of the entry reached the file
            return Err(match self.file.set_len(valid_len) {
                Ok(()) => ShelfError::WalWrite(format!("append of entry {}: {}", lsn, e)),
                Err(trunc) => ShelfError::WalWrite(format!(
                    "append of entry {}: {}; torn bytes past offset {} remain: {}",
                    lsn, e, valid_len, trunc
                )),
            });
        }

        self.current_lsn += 1;
        self.uncommitted += 1;

        let due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.uncommitted >= count,
        };
        if due {
            self.sync()?;
        }

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Drop every entry and restart the LSN sequence
    pub fn truncate(&mut self) -> Result<()> {
        self.file.set_len(0)?;
        self.file.sync_all()?;
        self.current_lsn = 1;
        self.uncommitted = 0;
        Ok(())
    }

    /// Entries appended since the last fsync
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    /// Get the LSN the next append will use
    pub fn current_lsn(&self) -> u64 {
        self.current_lsn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
