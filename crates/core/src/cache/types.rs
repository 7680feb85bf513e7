use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A resolved poster, keyed by normalized title and year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub title: String,
    pub year: u32,
    pub poster_path: String,
}

impl CacheRecord {
    pub fn new(title: impl Into<String>, year: u32, poster_path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year,
            poster_path: poster_path.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed cache record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

impl CacheError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
