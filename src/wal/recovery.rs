//! WAL Recovery
//!
//! Handles crash recovery by replaying the WAL.

use std::fs::OpenOptions;
use std::path::Path;

use tracing::warn;

use crate::error::Result;

use super::reader::{ReadOutcome, WalReader};
use super::WalEntry;

/// Handles WAL recovery after crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Number of corrupted entries skipped
    pub entries_corrupted: u64,

    /// Last valid LSN
    pub last_lsn: u64,

    /// Whether anything followed the last valid entry (removed by `recover`)
    pub was_truncated: bool,
}

impl WalRecovery {
    /// Recover entries from a WAL file
    ///
    /// This will:
    /// 1. Read all valid entries
    /// 2. Stop at the first torn or corrupted entry
    /// 3. Truncate the file to the end of the last valid entry
    /// 4. Return all valid entries in order
    pub fn recover(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let (entries, result, valid_len) = Self::scan(path)?;

        if result.was_truncated {
            warn!(
                path = %path.display(),
                valid_len,
                corrupted = result.entries_corrupted,
                "Truncating WAL after last valid entry"
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_len)?;
            file.sync_all()?;
        }

        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let (_, result, _) = Self::scan(path)?;
        Ok(result)
    }

    fn scan(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult, u64)> {
        let file_len = std::fs::metadata(path)?.len();
        let mut reader = WalReader::open(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();

        loop {
            match reader.read_entry()? {
                ReadOutcome::Entry(entry) => {
                    result.entries_recovered += 1;
                    result.last_lsn = entry.lsn;
                    entries.push(entry);
                }
                ReadOutcome::End | ReadOutcome::Torn => break,
                ReadOutcome::Corrupt(reason) => {
                    warn!(path = %path.display(), %reason, "Corrupted WAL entry");
                    result.entries_corrupted += 1;
                    break;
                }
            }
        }

        let valid_len = reader.position();
        result.was_truncated = valid_len < file_len;

        Ok((entries, result, valid_len))
    }
}
