//! Cache store trait and error types

use crate::cache::{CacheEntry, CacheKey};
use thiserror::Error;

/// Errors that can occur during cache store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt cache entry for {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cache store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for cache store backends.
///
/// The grab layer only needs point lookup and atomic overwrite by
/// composite key; the storage medium behind that is opaque. Writes must
/// be atomic from the caller's perspective: a concurrent reader sees
/// either the old complete entry or the new one, never a partial entry.
pub trait CacheStore {
    /// Looks up the entry for a key, if one has ever been stored
    fn lookup(&self, key: &CacheKey) -> StoreResult<Option<CacheEntry>>;

    /// Writes the entry for a key, overwriting any existing entry
    fn store(&mut self, key: &CacheKey, entry: &CacheEntry) -> StoreResult<()>;
}
