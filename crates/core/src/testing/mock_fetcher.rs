//! Mock HTTP fetcher for testing.

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetch::{FetchError, FetchedPage, FetchedStream, HttpFetcher};

/// A canned response for one URL.
#[derive(Debug, Clone)]
enum MockResponse {
    Page {
        final_url: String,
        status: u16,
        body: Vec<u8>,
    },
    Failure(String),
    /// Status 200, then the body stream breaks after `body`.
    BrokenStream {
        body: Vec<u8>,
        message: String,
    },
}

/// Mock implementation of the HttpFetcher trait.
///
/// Provides controllable behavior for testing:
/// - Serve canned pages, redirects and images by exact URL
/// - Answer unknown URLs with 404
/// - Track requested URLs for assertions
/// - Simulate transport failures
///
/// # Example
///
/// ```rust,ignore
/// use posterd_core::testing::{MockFetcher, fixtures};
///
/// let fetcher = MockFetcher::new();
/// fetcher.add_page("https://en.wikipedia.org/wiki/Dune", &fixtures::article_html(Some("//up/d.jpg"))).await;
/// fetcher.add_image("https://up/d.jpg", b"jpeg".to_vec()).await;
///
/// // ... run a resolution ...
///
/// assert_eq!(fetcher.request_count().await, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    routes: Arc<RwLock<HashMap<String, MockResponse>>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a fetcher with no routes; every request gets a 404.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Route Configuration
    // =========================================================================

    /// Serve `html` with status 200 at `url`.
    pub async fn add_page(&self, url: &str, html: &str) {
        self.insert(
            url,
            MockResponse::Page {
                final_url: url.to_string(),
                status: 200,
                body: html.as_bytes().to_vec(),
            },
        )
        .await;
    }

    /// Serve `html` at `url` as if the server redirected to `final_url`.
    pub async fn add_redirect(&self, url: &str, final_url: &str, html: &str) {
        self.insert(
            url,
            MockResponse::Page {
                final_url: final_url.to_string(),
                status: 200,
                body: html.as_bytes().to_vec(),
            },
        )
        .await;
    }

    /// Serve binary `bytes` with status 200 at `url`.
    pub async fn add_image(&self, url: &str, bytes: Vec<u8>) {
        self.insert(
            url,
            MockResponse::Page {
                final_url: url.to_string(),
                status: 200,
                body: bytes,
            },
        )
        .await;
    }

    /// Answer `url` with `status` and an empty body.
    pub async fn add_status(&self, url: &str, status: u16) {
        self.insert(
            url,
            MockResponse::Page {
                final_url: url.to_string(),
                status,
                body: Vec::new(),
            },
        )
        .await;
    }

    /// Fail requests to `url` at the transport level.
    pub async fn add_failure(&self, url: &str, message: &str) {
        self.insert(url, MockResponse::Failure(message.to_string()))
            .await;
    }

    /// Serve `bytes` with status 200 at `url`, then fail the stream.
    pub async fn add_broken_image(&self, url: &str, bytes: Vec<u8>, message: &str) {
        self.insert(
            url,
            MockResponse::BrokenStream {
                body: bytes,
                message: message.to_string(),
            },
        )
        .await;
    }

    async fn insert(&self, url: &str, response: MockResponse) {
        self.routes.write().await.insert(url.to_string(), response);
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// All requested URLs, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn was_requested(&self, url: &str) -> bool {
        self.requests.read().await.iter().any(|u| u == url)
    }

    pub async fn clear_requests(&self) {
        self.requests.write().await.clear();
    }

    async fn respond(&self, url: &str) -> Result<MockResponse, FetchError> {
        self.requests.write().await.push(url.to_string());

        match self.routes.read().await.get(url) {
            Some(MockResponse::Failure(message)) => Err(FetchError::Transport(message.clone())),
            Some(response) => Ok(response.clone()),
            None => Ok(MockResponse::Page {
                final_url: url.to_string(),
                status: 404,
                body: Vec::new(),
            }),
        }
    }
}

#[async_trait]
impl HttpFetcher for MockFetcher {
    async fn get_text(&self, url: &str) -> Result<FetchedPage, FetchError> {
        match self.respond(url).await? {
            MockResponse::Page {
                final_url,
                status,
                body,
            } => Ok(FetchedPage {
                url: final_url,
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
            MockResponse::BrokenStream { message, .. } | MockResponse::Failure(message) => {
                Err(FetchError::Transport(message))
            }
        }
    }

    async fn get_stream(&self, url: &str) -> Result<FetchedStream, FetchError> {
        match self.respond(url).await? {
            MockResponse::Page {
                final_url,
                status,
                body,
            } => {
                // Two chunks so consumers exercise their streaming loop.
                let split = body.len() / 2;
                let chunks = vec![body[..split].to_vec(), body[split..].to_vec()];
                Ok(FetchedStream {
                    url: final_url,
                    status,
                    chunks: futures::stream::iter(chunks.into_iter().map(Ok)).boxed(),
                })
            }
            MockResponse::BrokenStream { body, message } => Ok(FetchedStream {
                url: url.to_string(),
                status: 200,
                chunks: futures::stream::iter(vec![
                    Ok(body),
                    Err(FetchError::Transport(message)),
                ])
                .boxed(),
            }),
            MockResponse::Failure(message) => Err(FetchError::Transport(message)),
        }
    }
}
