//! In-memory poster cache.

use std::sync::{Mutex, PoisonError};

use super::{CacheError, CacheRecord, PosterCache};

/// Poster cache held entirely in memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    records: Mutex<Vec<CacheRecord>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PosterCache for MemoryCacheStore {
    fn ensure_initialized(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn lookup(&self, title: &str, year: u32) -> Result<Option<CacheRecord>, CacheError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .find(|r| r.title == title && r.year == year)
            .cloned())
    }

    fn insert(&self, title: &str, year: u32, poster_path: &str) -> Result<(), CacheError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CacheRecord::new(title, year, poster_path));
        Ok(())
    }

    fn records(&self) -> Result<Vec<CacheRecord>, CacheError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
