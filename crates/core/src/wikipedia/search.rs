//! Wikipedia site search.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, info};

use super::absolutize;
use crate::fetch::{FetchError, HttpFetcher};
use crate::html::DocumentQuery;

static FIRST_RESULT_LINK: Lazy<DocumentQuery> = Lazy::new(|| {
    DocumentQuery::nested_attr_of(".mw-search-result", "a", "href").unwrap()
});

/// Marker present in the URL while the wiki still shows a results page.
const SEARCH_PAGE_MARKER: &str = "index.php?search";

/// Where a search led.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The wiki matched the query to an article and redirected to it.
    Direct(String),
    /// URL of the first entry on the results page.
    FirstResult(String),
    /// The results page had no entries.
    NoResults,
}

impl SearchOutcome {
    /// The article to extract the poster from, if the search found one.
    pub fn into_page_url(self) -> Option<String> {
        match self {
            Self::Direct(url) | Self::FirstResult(url) => Some(url),
            Self::NoResults => None,
        }
    }
}

/// Client for the wiki's `Special:Search` page.
pub struct WikipediaSearch {
    fetcher: Arc<dyn HttpFetcher>,
    base_url: String,
}

impl WikipediaSearch {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    /// Build the search URL for `query`.
    ///
    /// Words are joined with `+`; anything else that is not URL-safe is
    /// percent-encoded.
    pub fn search_url(&self, query: &str) -> String {
        let search_param = query
            .split(' ')
            .map(|word| urlencoding::encode(word).into_owned())
            .collect::<Vec<_>>()
            .join("+");

        format!(
            "{}/w/index.php?search={}&title=Special%3ASearch&go=Go",
            self.base_url.trim_end_matches('/'),
            search_param
        )
    }

    /// Search for `query` and return the page it points at.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, FetchError> {
        let url = self.search_url(query);
        debug!("Wikipedia search: query='{}'", query);

        let page = self.fetcher.get_text(&url).await?.error_for_status()?;

        if !page.url.contains(SEARCH_PAGE_MARKER) {
            debug!("Search for '{}' redirected to {}", query, page.url);
            return Ok(SearchOutcome::Direct(page.url));
        }

        match FIRST_RESULT_LINK.first(&page.body) {
            Some(href) => Ok(SearchOutcome::FirstResult(absolutize(&self.base_url, &href))),
            None => {
                info!("No search results for '{}' ({})", query, url);
                Ok(SearchOutcome::NoResults)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockFetcher};

    const BASE: &str = "https://en.wikipedia.org";

    fn client(fetcher: &Arc<MockFetcher>) -> WikipediaSearch {
        WikipediaSearch::new(Arc::clone(fetcher) as Arc<dyn HttpFetcher>, BASE)
    }

    #[test]
    fn test_search_url_encodes_spaces_as_plus() {
        let fetcher = Arc::new(MockFetcher::new());
        assert_eq!(
            client(&fetcher).search_url("dune 2021"),
            "https://en.wikipedia.org/w/index.php?search=dune+2021&title=Special%3ASearch&go=Go"
        );
    }

    #[test]
    fn test_search_url_percent_encodes_reserved() {
        let fetcher = Arc::new(MockFetcher::new());
        assert_eq!(
            client(&fetcher).search_url("amélie & co 2001"),
            "https://en.wikipedia.org/w/index.php?search=am%C3%A9lie+%26+co+2001&title=Special%3ASearch&go=Go"
        );
    }

    #[tokio::test]
    async fn test_search_direct_redirect() {
        let fetcher = Arc::new(MockFetcher::new());
        let search = client(&fetcher);
        let url = search.search_url("inception 2010");
        fetcher
            .add_redirect(&url, "https://en.wikipedia.org/wiki/Inception", "<html></html>")
            .await;

        let outcome = search.search("inception 2010").await.unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Direct("https://en.wikipedia.org/wiki/Inception".to_string())
        );
    }

    #[tokio::test]
    async fn test_search_first_result() {
        let fetcher = Arc::new(MockFetcher::new());
        let search = client(&fetcher);
        let url = search.search_url("dune 2021");
        fetcher
            .add_page(
                &url,
                &fixtures::search_results_html(&["/wiki/Dune_(2021_film)", "/wiki/Dune"]),
            )
            .await;

        let outcome = search.search("dune 2021").await.unwrap();
        assert_eq!(
            outcome.into_page_url().as_deref(),
            Some("https://en.wikipedia.org/wiki/Dune_(2021_film)")
        );
    }

    #[tokio::test]
    async fn test_search_no_results() {
        let fetcher = Arc::new(MockFetcher::new());
        let search = client(&fetcher);
        let url = search.search_url("zzzz 1900");
        fetcher
            .add_page(&url, &fixtures::search_results_html(&[]))
            .await;

        let outcome = search.search("zzzz 1900").await.unwrap();
        assert_eq!(outcome, SearchOutcome::NoResults);
        assert!(outcome.into_page_url().is_none());
    }

    #[tokio::test]
    async fn test_search_server_error() {
        let fetcher = Arc::new(MockFetcher::new());
        let search = client(&fetcher);
        let url = search.search_url("dune 2021");
        fetcher.add_status(&url, 503).await;

        let result = search.search("dune 2021").await;
        assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
    }
}
