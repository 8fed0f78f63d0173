//! Error types for ShelfKV
//!
//! Provides a unified error type for all operations.
//!
//! "Not found" is never an error here: lookups return `Option` and
//! removals return an empty `Vec`.

use thiserror::Error;

/// Result type alias using ShelfError
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Unified error type for ShelfKV operations
#[derive(Debug, Error)]
pub enum ShelfError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    // -------------------------------------------------------------------------
    // Cache Errors
    // -------------------------------------------------------------------------
    /// A record store was opened (or the cache written) before the
    /// persistent cache finished loading.
    #[error("Persistent cache is not loaded")]
    CacheNotLoaded,

    // -------------------------------------------------------------------------
    // Key / Range Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid key range: {0}")]
    InvalidRange(String),

    #[error("Invalid key prefix: {0}")]
    InvalidPrefix(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
