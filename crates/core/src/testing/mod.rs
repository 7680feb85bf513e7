//! Testing utilities and mock implementations.
//!
//! This module provides a mock of the outbound HTTP seam plus HTML fixtures
//! shaped like Wikipedia pages, so the whole resolution pipeline can run
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use posterd_core::testing::{fixtures, MockFetcher};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.add_page(&search_url, &fixtures::search_results_html(&["/wiki/Heat_(1995_film)"])).await;
//! ```

mod mock_fetcher;

pub use mock_fetcher::MockFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    /// A search results page listing `hrefs` in order.
    pub fn search_results_html(hrefs: &[&str]) -> String {
        let results: String = hrefs
            .iter()
            .map(|href| {
                format!(
                    r#"<li class="mw-search-result mw-search-result-ns-0">
  <div class="mw-search-result-heading"><a href="{href}" title="{href}">{href}</a></div>
  <div class="searchresult">A film.</div>
</li>
"#
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html><head><title>Search results - Wikipedia</title></head>
<body>
<div class="searchresults">
<ul class="mw-search-results">
{results}</ul>
</div>
</body></html>"#
        )
    }

    /// An article page whose infobox poster has `poster_src`, or no poster.
    pub fn article_html(poster_src: Option<&str>) -> String {
        let infobox_image = poster_src
            .map(|src| {
                format!(
                    r#"<tr><td class="infobox-image"><img class="mw-file-element thumbborder" src="{src}" width="220"></td></tr>"#
                )
            })
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html><head><title>Film - Wikipedia</title></head>
<body>
<table class="infobox vevent">
{infobox_image}
<tr><th>Directed by</th><td>Someone</td></tr>
</table>
<p>Article text.</p>
</body></html>"#
        )
    }

    /// Wikipedia's search URL for `query` against `base_url`.
    pub fn search_url(base_url: &str, query: &str) -> String {
        format!(
            "{}/w/index.php?search={}&title=Special%3ASearch&go=Go",
            base_url,
            query.replace(' ', "+")
        )
    }
}
