//! Poster resolution pipeline.
//!
//! ```text
//! lookup ──hit──────────────────────────────────────────────▶ Resolved
//!   │miss
//!   ▼
//! Searching ──no results──▶ NotFound
//!   ▼
//! Extracting ──no image───▶ NotFound
//!   ▼
//! Downloading ──▶ cache insert ──▶ Resolved
//! ```
//!
//! Not-found is a normal outcome and is returned as a value. Only storage
//! and remote fetch failures are errors.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, PosterCache};
use crate::config::{StorageConfig, WikipediaConfig};
use crate::downloader::{DownloadError, PosterDownloader};
use crate::fetch::{FetchError, HttpFetcher};
use crate::metrics::{RESOLUTIONS_TOTAL, STAGE_DURATION};
use crate::wikipedia::{PosterExtractor, WikipediaSearch};

/// Errors that abort a resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The poster cache could not be read or written.
    #[error("Poster cache failure: {0}")]
    Cache(#[from] CacheError),

    /// A poster file or directory could not be written.
    #[error("Poster storage failure at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote request failed or returned an unusable response.
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(#[from] FetchError),
}

impl ResolveError {
    /// Whether the failure is local (cache or poster storage).
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Cache(_) | Self::Storage { .. })
    }
}

impl From<DownloadError> for ResolveError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Fetch(e) => Self::RemoteFetch(e),
            DownloadError::Io { path, source } => Self::Storage { path, source },
        }
    }
}

/// A normalized resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterRequest {
    pub title: String,
    pub year: u32,
}

impl PosterRequest {
    /// Lower-cases `title` so every spelling shares one cache key.
    pub fn new(title: &str, year: u32) -> Self {
        Self {
            title: title.to_lowercase(),
            year,
        }
    }

    /// Query sent to the wiki search.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.title, self.year)
    }
}

/// Pipeline states, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    CacheHit,
    Searching,
    Extracting,
    Downloading,
    Resolved,
    NotFound,
}

impl fmt::Display for ResolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CacheHit => "cache_hit",
            Self::Searching => "searching",
            Self::Extracting => "extracting",
            Self::Downloading => "downloading",
            Self::Resolved => "resolved",
            Self::NotFound => "not_found",
        };
        f.write_str(name)
    }
}

/// Where a resolved poster came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOrigin {
    Cache,
    Remote,
}

/// Which step failed to find anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundStage {
    Search,
    Extract,
}

/// Final outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        path: PathBuf,
        origin: ResolutionOrigin,
    },
    NotFound {
        stage: NotFoundStage,
        reason: String,
    },
}

impl Resolution {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Resolved { path, .. } => Some(path),
            Self::NotFound { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Resolves (title, year) pairs to poster files on disk.
pub struct PosterResolver {
    cache: Arc<dyn PosterCache>,
    search: WikipediaSearch,
    extractor: PosterExtractor,
    downloader: PosterDownloader,
}

impl PosterResolver {
    pub fn new(
        cache: Arc<dyn PosterCache>,
        fetcher: Arc<dyn HttpFetcher>,
        wikipedia: &WikipediaConfig,
        storage: &StorageConfig,
    ) -> Self {
        Self {
            cache,
            search: WikipediaSearch::new(Arc::clone(&fetcher), wikipedia.base_url.clone()),
            extractor: PosterExtractor::new(Arc::clone(&fetcher)),
            downloader: PosterDownloader::new(fetcher, storage.root.clone()),
        }
    }

    /// Resolve the poster for `title` released in `year`.
    pub async fn resolve(&self, title: &str, year: u32) -> Result<Resolution, ResolveError> {
        let request = PosterRequest::new(title, year);

        let result = self.run(&request).await;

        let outcome = match &result {
            Ok(Resolution::Resolved {
                origin: ResolutionOrigin::Cache,
                ..
            }) => "cache_hit",
            Ok(Resolution::Resolved { .. }) => "fetched",
            Ok(Resolution::NotFound { .. }) => "not_found",
            Err(e) => {
                warn!(
                    "Resolution of '{}' ({}) failed: {}",
                    request.title, request.year, e
                );
                "error"
            }
        };
        RESOLUTIONS_TOTAL.with_label_values(&[outcome]).inc();

        result
    }

    async fn run(&self, request: &PosterRequest) -> Result<Resolution, ResolveError> {
        if let Some(record) = self.cache.lookup(&request.title, request.year)? {
            transition(request, ResolverState::CacheHit);
            return Ok(Resolution::Resolved {
                path: PathBuf::from(record.poster_path),
                origin: ResolutionOrigin::Cache,
            });
        }

        transition(request, ResolverState::Searching);
        let started = Instant::now();
        let outcome = self.search.search(&request.search_query()).await;
        observe_stage("search", started);

        let Some(page_url) = outcome?.into_page_url() else {
            return Ok(not_found(
                request,
                NotFoundStage::Search,
                format!("no search results for '{}'", request.search_query()),
            ));
        };

        transition(request, ResolverState::Extracting);
        let started = Instant::now();
        let image_url = self.extractor.extract_poster_url(&page_url).await;
        observe_stage("extract", started);

        let Some(image_url) = image_url? else {
            return Ok(not_found(
                request,
                NotFoundStage::Extract,
                format!("no poster image on {}", page_url),
            ));
        };

        transition(request, ResolverState::Downloading);
        let started = Instant::now();
        let path = self
            .downloader
            .download(&image_url, &request.title, request.year)
            .await;
        observe_stage("download", started);
        let path = path?;

        self.cache
            .insert(&request.title, request.year, &path.to_string_lossy())?;

        transition(request, ResolverState::Resolved);
        info!(
            "Resolved poster for '{}' ({}) from {} to {}",
            request.title,
            request.year,
            image_url,
            path.display()
        );

        Ok(Resolution::Resolved {
            path,
            origin: ResolutionOrigin::Remote,
        })
    }
}

fn transition(request: &PosterRequest, state: ResolverState) {
    debug!(title = %request.title, year = request.year, state = %state, "resolver transition");
}

fn observe_stage(stage: &str, started: Instant) {
    STAGE_DURATION
        .with_label_values(&[stage])
        .observe(started.elapsed().as_secs_f64());
}

fn not_found(request: &PosterRequest, stage: NotFoundStage, reason: String) -> Resolution {
    transition(request, ResolverState::NotFound);
    info!("Poster not found for '{}' ({}): {}", request.title, request.year, reason);
    Resolution::NotFound { stage, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheRecord, MemoryCacheStore};
    use crate::testing::{fixtures, MockFetcher};
    use tempfile::TempDir;

    const BASE: &str = "https://en.wikipedia.org";

    struct Harness {
        resolver: PosterResolver,
        cache: Arc<MemoryCacheStore>,
        fetcher: Arc<MockFetcher>,
        storage: TempDir,
    }

    fn harness() -> Harness {
        let storage = TempDir::new().unwrap();
        let cache = Arc::new(MemoryCacheStore::new());
        let fetcher = Arc::new(MockFetcher::new());
        let resolver = PosterResolver::new(
            Arc::clone(&cache) as Arc<dyn PosterCache>,
            Arc::clone(&fetcher) as Arc<dyn HttpFetcher>,
            &WikipediaConfig {
                base_url: BASE.to_string(),
                ..Default::default()
            },
            &StorageConfig {
                root: storage.path().to_path_buf(),
            },
        );
        Harness {
            resolver,
            cache,
            fetcher,
            storage,
        }
    }

    #[test]
    fn test_request_normalizes_title() {
        let request = PosterRequest::new("Inception", 2010);
        assert_eq!(request.title, "inception");
        assert_eq!(request.search_query(), "inception 2010");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let h = harness();
        h.cache
            .insert("heat", 1995, "posters/1995/heat_1995.jpg")
            .unwrap();

        let resolution = h.resolver.resolve("Heat", 1995).await.unwrap();

        assert_eq!(
            resolution,
            Resolution::Resolved {
                path: PathBuf::from("posters/1995/heat_1995.jpg"),
                origin: ResolutionOrigin::Cache,
            }
        );
        assert_eq!(h.fetcher.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_full_pipeline_stores_record() {
        let h = harness();
        let search_url = fixtures::search_url(BASE, "dune 2021");
        let page = "https://en.wikipedia.org/wiki/Dune_(2021_film)";
        h.fetcher
            .add_page(
                &search_url,
                &fixtures::search_results_html(&["/wiki/Dune_(2021_film)"]),
            )
            .await;
        h.fetcher
            .add_page(page, &fixtures::article_html(Some("//upload.example/Dune.jpg")))
            .await;
        h.fetcher
            .add_image("https://upload.example/Dune.jpg", b"poster".to_vec())
            .await;

        let resolution = h.resolver.resolve("Dune", 2021).await.unwrap();

        let expected = h.storage.path().join("2021").join("dune_2021.jpg");
        assert_eq!(resolution.path(), Some(expected.as_path()));
        assert_eq!(std::fs::read(&expected).unwrap(), b"poster");
        assert_eq!(
            h.cache.records().unwrap(),
            vec![CacheRecord::new(
                "dune",
                2021,
                expected.to_string_lossy().into_owned()
            )]
        );
        assert_eq!(
            h.fetcher.requests().await,
            vec![
                search_url,
                page.to_string(),
                "https://upload.example/Dune.jpg".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_no_search_results_is_not_found() {
        let h = harness();
        let search_url = fixtures::search_url(BASE, "nothing 1901");
        h.fetcher
            .add_page(&search_url, &fixtures::search_results_html(&[]))
            .await;

        let resolution = h.resolver.resolve("Nothing", 1901).await.unwrap();

        assert!(matches!(
            resolution,
            Resolution::NotFound {
                stage: NotFoundStage::Search,
                ..
            }
        ));
        assert_eq!(h.fetcher.request_count().await, 1);
        assert!(h.cache.is_empty());
    }

    #[tokio::test]
    async fn test_page_without_poster_is_not_found() {
        let h = harness();
        let search_url = fixtures::search_url(BASE, "alien 1979");
        h.fetcher
            .add_redirect(
                &search_url,
                "https://en.wikipedia.org/wiki/Alien_(film)",
                "<html></html>",
            )
            .await;
        h.fetcher
            .add_page(
                "https://en.wikipedia.org/wiki/Alien_(film)",
                &fixtures::article_html(None),
            )
            .await;

        let resolution = h.resolver.resolve("Alien", 1979).await.unwrap();

        assert!(matches!(
            resolution,
            Resolution::NotFound {
                stage: NotFoundStage::Extract,
                ..
            }
        ));
        assert!(h.cache.is_empty());
    }

    #[tokio::test]
    async fn test_failed_download_aborts_before_insert() {
        let h = harness();
        let search_url = fixtures::search_url(BASE, "heat 1995");
        h.fetcher
            .add_redirect(
                &search_url,
                "https://en.wikipedia.org/wiki/Heat_(1995_film)",
                "",
            )
            .await;
        h.fetcher
            .add_page(
                "https://en.wikipedia.org/wiki/Heat_(1995_film)",
                &fixtures::article_html(Some("//upload.example/Heat.png")),
            )
            .await;
        h.fetcher
            .add_status("https://upload.example/Heat.png", 500)
            .await;

        let err = h.resolver.resolve("Heat", 1995).await.unwrap_err();

        assert!(matches!(
            err,
            ResolveError::RemoteFetch(FetchError::Status { status: 500, .. })
        ));
        assert!(!err.is_storage());
        assert!(h.cache.is_empty());
    }

    #[tokio::test]
    async fn test_search_transport_failure_is_error() {
        let h = harness();
        let search_url = fixtures::search_url(BASE, "heat 1995");
        h.fetcher.add_failure(&search_url, "timed out").await;

        let err = h.resolver.resolve("heat", 1995).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::RemoteFetch(FetchError::Transport(_))
        ));
    }

    #[test]
    fn test_download_io_error_maps_to_storage() {
        let err: ResolveError = DownloadError::Io {
            path: PathBuf::from("posters/2021"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert!(err.is_storage());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ResolverState::CacheHit.to_string(), "cache_hit");
        assert_eq!(ResolverState::NotFound.to_string(), "not_found");
    }
}
