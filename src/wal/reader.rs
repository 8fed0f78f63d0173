//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{Result, ShelfError};

use super::{WalEntry, HEADER_SIZE, MAX_ENTRY_SIZE};

/// Outcome of reading at the current position
pub(crate) enum ReadOutcome {
    /// A valid entry
    Entry(WalEntry),

    /// Clean end of file
    End,

    /// The file ends partway through an entry
    Torn,

    /// A complete entry that fails validation
    Corrupt(String),
}

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Byte offset just past the last entry returned
    position: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
        })
    }

    /// Read the next entry from the WAL.
    ///
    /// Returns `Ok(None)` at a clean end of file and `WalCorruption` for a
    /// torn or damaged entry.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        match self.read_entry()? {
            ReadOutcome::Entry(entry) => Ok(Some(entry)),
            ReadOutcome::End => Ok(None),
            ReadOutcome::Torn => Err(ShelfError::WalCorruption(format!(
                "partial entry at offset {}",
                self.position
            ))),
            ReadOutcome::Corrupt(reason) => Err(ShelfError::WalCorruption(reason)),
        }
    }

    /// Iterate over entries, stopping after the first error
    pub fn entries(self) -> WalIterator {
        WalIterator { reader: Some(self) }
    }

    /// Byte offset just past the last valid entry read
    pub fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn read_entry(&mut self) -> Result<ReadOutcome> {
        let mut header = [0u8; HEADER_SIZE];
        match read_full(&mut self.reader, &mut header)? {
            0 => return Ok(ReadOutcome::End),
            n if n < HEADER_SIZE => return Ok(ReadOutcome::Torn),
            _ => {}
        }

        let (lsn, crc, len) = WalEntry::parse_header(&header);
        if len > MAX_ENTRY_SIZE {
            return Ok(ReadOutcome::Corrupt(format!(
                "entry {} claims {} data bytes",
                lsn, len
            )));
        }

        let mut data = vec![0u8; len];
        if read_full(&mut self.reader, &mut data)? < len {
            return Ok(ReadOutcome::Torn);
        }

        match WalEntry::decode(lsn, crc, &data) {
            Ok(entry) => {
                self.position += (HEADER_SIZE + len) as u64;
                Ok(ReadOutcome::Entry(entry))
            }
            Err(e) => Ok(ReadOutcome::Corrupt(e.to_string())),
        }
    }
}

/// Fill `buf` as far as the file allows; returns the number of bytes read
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Iterator over WAL entries
pub struct WalIterator {
    reader: Option<WalReader>,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        match reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.reader = None;
                None
            }
            Err(e) => {
                self.reader = None;
                Some(Err(e))
            }
        }
    }
}
