//! Wikipedia integration: search and poster extraction.
//!
//! Wikipedia has no API for "the poster of this film", so both steps work on
//! rendered HTML: the search step picks the first result of the site search
//! (or follows its direct title match), and the extraction step takes the
//! first bordered thumbnail of the article, which is the infobox poster for
//! film articles.

mod extractor;
mod search;

pub use extractor::PosterExtractor;
pub use search::{SearchOutcome, WikipediaSearch};

/// Make a possibly relative link absolute against `base_url`.
///
/// Protocol-relative links (`//host/path`) become `https://host/path`.
pub(crate) fn absolutize(base_url: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else if let Some(rest) = link.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), link)
    }
}

/// Scheme and host of `url`, e.g. `https://en.wikipedia.org`.
pub(crate) fn origin_of(url: &str) -> &str {
    let host_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[host_start..].find('/') {
        Some(i) => &url[..host_start + i],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://en.wikipedia.org/wiki/Dune_(2021_film)"),
            "https://en.wikipedia.org"
        );
        assert_eq!(origin_of("https://en.wikipedia.org"), "https://en.wikipedia.org");
    }

    #[test]
    fn test_absolutize_relative() {
        assert_eq!(
            absolutize("https://en.wikipedia.org", "/wiki/Dune"),
            "https://en.wikipedia.org/wiki/Dune"
        );
        assert_eq!(
            absolutize("https://en.wikipedia.org/", "/wiki/Dune"),
            "https://en.wikipedia.org/wiki/Dune"
        );
    }

    #[test]
    fn test_absolutize_protocol_relative() {
        assert_eq!(
            absolutize("https://en.wikipedia.org", "//upload.example/img.png"),
            "https://upload.example/img.png"
        );
    }

    #[test]
    fn test_absolutize_keeps_absolute() {
        assert_eq!(
            absolutize("https://en.wikipedia.org", "http://other.example/x"),
            "http://other.example/x"
        );
    }
}
