//! Poster image download.
//!
//! Posters land at `<root>/<year>/<title>_<year>.<ext>`, where the extension
//! is taken from the remote image URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use crate::fetch::{FetchError, HttpFetcher};
use crate::metrics::POSTER_BYTES_WRITTEN;

/// Errors that can occur while downloading a poster.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Remote side failed (status, transport, unusable URL).
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Local filesystem failed.
    #[error("Failed to write poster at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File extension of the image at `image_url`.
///
/// Taken from the last path segment, after its last `.`; query string and
/// fragment are ignored.
pub fn image_extension(image_url: &str) -> Option<&str> {
    let without_query = image_url
        .split(['?', '#'])
        .next()
        .unwrap_or(image_url);
    let segment = without_query.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;

    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Replace path separators so a title always maps to a single file name.
fn file_stem(title: &str, year: u32) -> String {
    let safe_title: String = title
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}_{}", safe_title, year)
}

/// Writes poster images under a storage root.
pub struct PosterDownloader {
    fetcher: Arc<dyn HttpFetcher>,
    root: PathBuf,
}

impl PosterDownloader {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, root: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            root: root.into(),
        }
    }

    /// Local path for the poster of (`title`, `year`) fetched from `image_url`.
    pub fn poster_path(&self, image_url: &str, title: &str, year: u32) -> Result<PathBuf, FetchError> {
        let ext = image_extension(image_url)
            .ok_or_else(|| FetchError::InvalidImageUrl(image_url.to_string()))?;

        Ok(self
            .root
            .join(year.to_string())
            .join(format!("{}.{}", file_stem(title, year), ext)))
    }

    /// Download `image_url` to its deterministic location and return the path.
    ///
    /// The year directory is created first. The body is streamed into a
    /// temporary file next to the target, which replaces the target only once
    /// fully written. Any other status than 200, or a failure mid-stream,
    /// leaves an existing poster at the target untouched.
    pub async fn download(
        &self,
        image_url: &str,
        title: &str,
        year: u32,
    ) -> Result<PathBuf, DownloadError> {
        let path = self.poster_path(image_url, title, year)?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| DownloadError::io(&dir, e))?;

        let mut response = self.fetcher.get_stream(image_url).await?;
        if response.status != 200 {
            warn!(
                "Poster download from {} returned status {}",
                image_url, response.status
            );
            return Err(FetchError::Status {
                url: image_url.to_string(),
                status: response.status,
            }
            .into());
        }

        // Removed on drop unless persisted.
        let (file, temp_path) = tempfile::Builder::new()
            .prefix(".poster-")
            .suffix(".part")
            .tempfile_in(&dir)
            .map_err(|e| DownloadError::io(&dir, e))?
            .into_parts();
        let mut writer = BufWriter::new(File::from_std(file));

        let written = async {
            let mut total_bytes = 0u64;
            while let Some(chunk) = response.chunks.next().await {
                let chunk = chunk?;
                writer
                    .write_all(&chunk)
                    .await
                    .map_err(|e| DownloadError::io(&temp_path, e))?;
                total_bytes += chunk.len() as u64;
            }
            writer
                .flush()
                .await
                .map_err(|e| DownloadError::io(&temp_path, e))?;
            Ok::<_, DownloadError>(total_bytes)
        }
        .await;

        let total_bytes = match written {
            Ok(total_bytes) => total_bytes,
            Err(e) => {
                warn!("Poster download from {} failed: {}", image_url, e);
                return Err(e);
            }
        };
        drop(writer);

        temp_path
            .persist(&path)
            .map_err(|e| DownloadError::io(&path, e.error))?;

        POSTER_BYTES_WRITTEN.inc_by(total_bytes);
        debug!("Wrote {} bytes to {}", total_bytes, path.display());

        Ok(path)
    }
}
