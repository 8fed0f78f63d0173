//! # ShelfKV
//!
//! An ordered record store for object stores and secondary indexes:
//! - A total order over heterogeneous keys (numbers, dates, strings, binary, arrays)
//! - Sorted in-memory records with duplicate-key (index) semantics
//! - Binary-search positioning and bounded, bidirectional cursors
//! - Write-through to a WAL-backed persistent cache
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Object store / index façades                   │
//! │                    (caller-provided)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    RecordStore (one per prefix)             │
//! │     get / add / delete / delete_by_value / clear / values   │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │ reads                            │ write-through
//!            ▼                                  ▼
//!   ┌─────────────────┐               ┌──────────────────┐
//!   │  position + key │               │ PersistentCache  │
//!   │  (binary search,│               │ (shared, Arc)    │
//!   │   comparator)   │               └────────┬─────────┘
//!   └─────────────────┘                        │
//!                                              ▼
//!                                      ┌─────────────┐
//!                                      │     WAL     │
//!                                      │  (DiskCache)│
//!                                      └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod record;
pub mod store;
pub mod cache;
pub mod wal;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ShelfError, Result};
pub use config::Config;
pub use key::{Key, KeyKind, KeyRange};
pub use record::{Record, StoreType};
pub use store::{Cursor, Direction, KeyQuery, RecordStore};
pub use cache::{DiskCache, MemoryCache, PersistentCache};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ShelfKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
