//! reqwest-backed [`HttpFetcher`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tracing::debug;

use super::{FetchError, FetchedPage, FetchedStream, HttpFetcher};
use crate::config::{FetchConfig, WikipediaConfig};
use crate::metrics::{EXTERNAL_REQUESTS, EXTERNAL_REQUEST_DURATION};

/// HTTP fetcher using a shared reqwest client with a per-request timeout.
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(fetch: &FetchConfig, wikipedia: &WikipediaConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs as u64))
            .user_agent(wikipedia.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    fn record(operation: &str, started: Instant, result: &str) {
        EXTERNAL_REQUEST_DURATION
            .with_label_values(&[operation])
            .observe(started.elapsed().as_secs_f64());
        EXTERNAL_REQUESTS
            .with_label_values(&[operation, result])
            .inc();
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_text(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let started = Instant::now();
        debug!("GET {}", url);

        let result = async {
            let response = self.client.get(url).send().await?;
            let final_url = response.url().to_string();
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, FetchError>(FetchedPage {
                url: final_url,
                status,
                body,
            })
        }
        .await;

        match &result {
            Ok(page) if page.is_success() => Self::record("page", started, "success"),
            _ => Self::record("page", started, "error"),
        }
        result
    }

    async fn get_stream(&self, url: &str) -> Result<FetchedStream, FetchError> {
        let started = Instant::now();
        debug!("GET (stream) {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                Self::record("image", started, "error");
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        Self::record(
            "image",
            started,
            if status == 200 { "success" } else { "error" },
        );

        Ok(FetchedStream {
            url: response.url().to_string(),
            status,
            chunks: response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(FetchError::from))
                .boxed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_defaults() {
        let fetcher = ReqwestFetcher::new(&FetchConfig::default(), &WikipediaConfig::default());
        assert!(fetcher.is_ok());
    }
}
