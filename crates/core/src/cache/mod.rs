//! Poster cache - records of previously resolved posters.
//!
//! The cache maps a normalized `(title, year)` key to the path of a poster
//! already stored on disk, so repeat requests never touch the network.
//! Records are append-only: duplicates are tolerated and lookups return the
//! first match in insertion order.

mod file_store;
mod format;
mod memory;
mod types;

pub use file_store::FileCacheStore;
pub use memory::MemoryCacheStore;
pub use types::*;

/// Trait for poster cache storage.
pub trait PosterCache: Send + Sync {
    /// Make sure the backing store exists, creating an empty one if needed.
    ///
    /// Idempotent; called once at startup before any lookup or insert.
    fn ensure_initialized(&self) -> Result<(), CacheError>;

    /// Find the first record matching `title` and `year`.
    ///
    /// The title is compared verbatim; callers pass an already normalized title.
    fn lookup(&self, title: &str, year: u32) -> Result<Option<CacheRecord>, CacheError>;

    /// Append a record. Does not check for existing duplicates.
    fn insert(&self, title: &str, year: u32, poster_path: &str) -> Result<(), CacheError>;

    /// All records in insertion order.
    fn records(&self) -> Result<Vec<CacheRecord>, CacheError>;
}
