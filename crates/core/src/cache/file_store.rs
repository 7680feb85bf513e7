//! Flat-file poster cache.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::format::{parse_records, write_record};
use super::{CacheError, CacheRecord, PosterCache};

/// Poster cache backed by a pipe-delimited file.
///
/// Reads and appends are serialized through an internal lock so concurrent
/// resolutions never interleave partial lines.
pub struct FileCacheStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCacheStore {
    /// Create a store for the file at `path`. Nothing is touched on disk
    /// until [`PosterCache::ensure_initialized`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_content(&self) -> Result<String, CacheError> {
        fs::read_to_string(&self.path).map_err(|e| CacheError::io(&self.path, e))
    }
}

impl PosterCache for FileCacheStore {
    fn ensure_initialized(&self) -> Result<(), CacheError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
            }
        }

        if !self.path.is_file() {
            debug!("Creating empty poster cache at {}", self.path.display());
        }

        // Opening in append mode creates the file without truncating it.
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CacheError::io(&self.path, e))?;

        Ok(())
    }

    fn lookup(&self, title: &str, year: u32) -> Result<Option<CacheRecord>, CacheError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let content = self.read_content()?;
        let year_text = year.to_string();

        parse_records(&content)?
            .into_iter()
            .find(|raw| raw.matches(title, &year_text))
            .map(|raw| raw.into_record())
            .transpose()
    }

    fn insert(&self, title: &str, year: u32, poster_path: &str) -> Result<(), CacheError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| CacheError::io(&self.path, e))?;

        write_record(file, title, year, poster_path)
            .and_then(|file| file.sync_data())
            .map_err(|e| CacheError::io(&self.path, e))?;

        debug!("Cached poster for '{}' ({}) at {}", title, year, poster_path);
        Ok(())
    }

    fn records(&self) -> Result<Vec<CacheRecord>, CacheError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        parse_records(&self.read_content()?)?
            .into_iter()
            .map(|raw| raw.into_record())
            .collect()
    }
}
