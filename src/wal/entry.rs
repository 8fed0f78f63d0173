//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their framing.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShelfError};
use crate::record::Record;

/// Header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Upper bound on a single entry's data; anything larger is treated as a
/// corrupt length field.
pub const MAX_ENTRY_SIZE: usize = 64 * 1024 * 1024;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to perform
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Cache mutations that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Store a record at an address
    Set { address: String, record: Record },

    /// Remove the record at an address
    Delete { address: String },
}

impl WalEntry {
    pub fn new(lsn: u64, operation: Operation) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            lsn,
            operation,
            timestamp,
        }
    }

    /// Frame this entry: header followed by bincode data
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(self)
            .map_err(|e| ShelfError::Serialization(format!("WAL entry: {}", e)))?;

        if data.len() > MAX_ENTRY_SIZE {
            return Err(ShelfError::WalWrite(format!(
                "entry of {} bytes exceeds the {} byte limit",
                data.len(),
                MAX_ENTRY_SIZE
            )));
        }

        let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
        bytes.extend_from_slice(&self.lsn.to_le_bytes());
        bytes.extend_from_slice(&Self::compute_crc(&data).to_le_bytes());
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&data);
        Ok(bytes)
    }

    /// Parse one framed entry, verifying length, checksum and LSN
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(ShelfError::WalCorruption(format!(
                "header too small: {} bytes",
                bytes.len()
            )));
        }

        let (lsn, crc, len) = Self::parse_header(&bytes[..HEADER_SIZE]);
        let data = bytes
            .get(HEADER_SIZE..HEADER_SIZE + len)
            .ok_or_else(|| {
                ShelfError::WalCorruption(format!(
                    "entry {} truncated: expected {} data bytes, got {}",
                    lsn,
                    len,
                    bytes.len() - HEADER_SIZE
                ))
            })?;

        Self::decode(lsn, crc, data)
    }

    /// CRC32 of an entry's data section
    pub fn compute_crc(data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }

    /// Split a header into `(lsn, crc, data_len)`
    pub(crate) fn parse_header(header: &[u8]) -> (u64, u32, usize) {
        let mut lsn = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        lsn.copy_from_slice(&header[0..8]);
        crc.copy_from_slice(&header[8..12]);
        len.copy_from_slice(&header[12..16]);
        (
            u64::from_le_bytes(lsn),
            u32::from_le_bytes(crc),
            u32::from_le_bytes(len) as usize,
        )
    }

    /// Check and decode a data section whose header was already parsed
    pub(crate) fn decode(lsn: u64, crc: u32, data: &[u8]) -> Result<Self> {
        let actual = Self::compute_crc(data);
        if actual != crc {
            return Err(ShelfError::WalCorruption(format!(
                "CRC mismatch for entry {}: expected {:08x}, got {:08x}",
                lsn, crc, actual
            )));
        }

        let entry: WalEntry = bincode::deserialize(data)
            .map_err(|e| ShelfError::WalCorruption(format!("entry {} undecodable: {}", lsn, e)))?;

        if entry.lsn != lsn {
            return Err(ShelfError::WalCorruption(format!(
                "LSN mismatch: header says {}, data says {}",
                lsn, entry.lsn
            )));
        }

        Ok(entry)
    }
}
