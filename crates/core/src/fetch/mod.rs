//! Outbound HTTP access.
//!
//! Every network call made while resolving a poster goes through the
//! [`HttpFetcher`] trait, so the search, extraction and download steps can be
//! exercised against canned responses in tests.

mod reqwest_fetcher;

pub use reqwest_fetcher::ReqwestFetcher;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

/// Errors raised while talking to remote hosts.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a status the caller cannot use.
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    /// Image URL has no usable file extension.
    #[error("Invalid image URL: {0}")]
    InvalidImageUrl(String),

    /// Connection-level failure from a fetcher that does not use reqwest,
    /// such as [`MockFetcher`](crate::testing::MockFetcher). The reqwest
    /// fetcher reports these as [`FetchError::Http`].
    #[error("Request failed: {0}")]
    Transport(String),
}

/// A fetched text document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after following redirects.
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx page into [`FetchError::Status`].
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Status {
                url: self.url,
                status: self.status,
            })
        }
    }
}

/// A binary response whose body has not been read yet.
pub struct FetchedStream {
    pub url: String,
    pub status: u16,
    pub chunks: BoxStream<'static, Result<Vec<u8>, FetchError>>,
}

impl std::fmt::Debug for FetchedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedStream")
            .field("url", &self.url)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Minimal HTTP GET client.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetch a text document, following redirects.
    ///
    /// Non-2xx statuses are returned as pages, not errors.
    async fn get_text(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Start fetching binary content; the body is streamed by the caller.
    async fn get_stream(&self, url: &str) -> Result<FetchedStream, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status() {
        let ok = FetchedPage {
            url: "https://example.org/a".to_string(),
            status: 200,
            body: String::new(),
        };
        assert!(ok.error_for_status().is_ok());

        let missing = FetchedPage {
            url: "https://example.org/b".to_string(),
            status: 503,
            body: String::new(),
        };
        match missing.error_for_status() {
            Err(FetchError::Status { url, status }) => {
                assert_eq!(url, "https://example.org/b");
                assert_eq!(status, 503);
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }
}
