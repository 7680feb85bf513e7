//! Poster image extraction from an article page.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, info};

use super::{absolutize, origin_of};
use crate::fetch::{FetchError, HttpFetcher};
use crate::html::DocumentQuery;

static POSTER_IMAGE: Lazy<DocumentQuery> =
    Lazy::new(|| DocumentQuery::attr_of(".thumbborder", "src").unwrap());

/// Pulls the poster image URL out of an article.
pub struct PosterExtractor {
    fetcher: Arc<dyn HttpFetcher>,
}

impl PosterExtractor {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch `page_url` and return the absolute URL of its first bordered
    /// thumbnail, or `None` when the page has none.
    pub async fn extract_poster_url(&self, page_url: &str) -> Result<Option<String>, FetchError> {
        let page = self.fetcher.get_text(page_url).await?.error_for_status()?;

        match POSTER_IMAGE.first(&page.body) {
            Some(src) => {
                let image_url = absolutize(origin_of(&page.url), &src);
                debug!("Poster image for {}: {}", page_url, image_url);
                Ok(Some(image_url))
            }
            None => {
                info!("No poster image on {}", page_url);
                Ok(None)
            }
        }
    }
}
