//! Common test utilities for in-process HTTP testing.
//!
//! The fixture wires the real router to a file-backed poster cache in a temp
//! directory and a `MockFetcher`, so routes can be exercised end to end
//! without network access.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use posterd_core::{
    testing::MockFetcher, Config, FileCacheStore, HttpFetcher, PosterCache, PosterResolver,
    StorageConfig, WikipediaConfig,
};
use posterd_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use posterd_core::testing::fixtures;

pub const BASE_URL: &str = "https://en.wikipedia.org";

/// In-process server with a controllable fetcher.
pub struct TestFixture {
    pub router: Router,
    pub fetcher: Arc<MockFetcher>,
    pub cache: Arc<FileCacheStore>,
    /// Poster storage root inside the temp dir
    pub root: PathBuf,
    _temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("posters");

        let config = Config {
            storage: StorageConfig { root: root.clone() },
            wikipedia: WikipediaConfig {
                base_url: BASE_URL.to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let cache = Arc::new(FileCacheStore::new(config.storage.cache_file()));
        cache.ensure_initialized().expect("Failed to initialize cache");

        let fetcher = Arc::new(MockFetcher::new());
        let resolver = Arc::new(PosterResolver::new(
            Arc::clone(&cache) as Arc<dyn PosterCache>,
            Arc::clone(&fetcher) as Arc<dyn HttpFetcher>,
            &config.wikipedia,
            &config.storage,
        ));

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&cache) as Arc<dyn PosterCache>,
            resolver,
        ));

        Self {
            router: create_router(state),
            fetcher,
            cache,
            root,
            _temp_dir: temp_dir,
        }
    }

    /// Make a film resolvable via the first search result.
    pub async fn add_film(&self, title: &str, year: u32, article: &str, image_url: &str, bytes: &[u8]) {
        let query = format!("{} {}", title.to_lowercase(), year);
        self.fetcher
            .add_page(
                &fixtures::search_url(BASE_URL, &query),
                &fixtures::search_results_html(&[article]),
            )
            .await;
        self.fetcher
            .add_page(
                &format!("{}{}", BASE_URL, article),
                &fixtures::article_html(Some(image_url)),
            )
            .await;
        self.fetcher.add_image(image_url, bytes.to_vec()).await;
    }

    /// Make a search return no results.
    pub async fn add_unknown_film(&self, title: &str, year: u32) {
        let query = format!("{} {}", title.to_lowercase(), year);
        self.fetcher
            .add_page(
                &fixtures::search_url(BASE_URL, &query),
                &fixtures::search_results_html(&[]),
            )
            .await;
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            content_type,
            body,
        }
    }
}
