//! Persistent Cache Module
//!
//! The durable, prefix-addressable backend that record stores hydrate from
//! and write through to.
//!
//! ## Addressing
//! Every record lives at exactly one address, derived the same way for
//! inserts and deletes:
//! ```text
//! ┌────────┬─────┬────────────┬─────┬─────────────┬─────┬───────────────┐
//! │ type   │  /  │ key prefix │  /  │ key literal │  /  │ value literal │
//! └────────┴─────┴────────────┴─────┴─────────────┴─────┴───────────────┘
//!  \_________ scan prefix __________/
//! ```
//! The value suffix keeps duplicate-key index entries apart. Key literals
//! are self-delimiting (see `key::literal`), so the address is unambiguous.
//!
//! Key prefixes cannot contain the separator, so the scan prefix of one
//! store is never a prefix of another store's addresses: `object/user/`
//! and `object/users/` are disjoint namespaces.

mod disk;
mod memory;

pub use disk::DiskCache;
pub use memory::MemoryCache;

use crate::error::Result;
use crate::record::{Record, StoreType};

/// Terminates the store type and the key prefix, and joins the key to the
/// value. Must not appear in a key prefix.
pub const SEPARATOR: char = '/';

/// Backend contract required by [`RecordStore`](crate::store::RecordStore).
///
/// Implementations are shared between stores (`Arc<dyn PersistentCache>`)
/// and use interior mutability.
pub trait PersistentCache: Send + Sync {
    /// Whether the cache has finished loading; stores refuse to open before.
    fn is_loaded(&self) -> bool;

    /// Every record whose address starts with `prefix`, in address order.
    fn values_with_prefix(&self, prefix: &str) -> Result<Vec<Record>>;

    /// Store `record` at `address`, replacing anything already there.
    fn set(&self, address: &str, record: &Record) -> Result<()>;

    /// Remove whatever is stored at `address`. Absent addresses are a no-op.
    fn delete(&self, address: &str) -> Result<()>;
}

/// The prefix shared by every address of one store
pub fn scan_prefix(store_type: StoreType, key_prefix: &str) -> String {
    format!("{}{}{}{}", store_type, SEPARATOR, key_prefix, SEPARATOR)
}

/// The address of one record of one store
pub fn record_address(store_type: StoreType, key_prefix: &str, record: &Record) -> String {
    format!(
        "{}{}{}{}",
        scan_prefix(store_type, key_prefix),
        record.key,
        SEPARATOR,
        record.value
    )
}
