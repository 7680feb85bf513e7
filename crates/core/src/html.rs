//! Structural queries over HTML documents.
//!
//! Parsing is always tolerant: malformed markup is recovered by the HTML5
//! parser instead of aborting the query.

use scraper::{Html, Selector};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Invalid selector '{selector}': {reason}")]
pub struct QueryError {
    pub selector: String,
    pub reason: String,
}

fn parse_selector(selector: &str) -> Result<Selector, QueryError> {
    Selector::parse(selector).map_err(|e| QueryError {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Finds an attribute on the first element matching a selector, optionally
/// descending into the first matching child of that element.
#[derive(Debug)]
pub struct DocumentQuery {
    outer: Selector,
    inner: Option<Selector>,
    attr: String,
}

impl DocumentQuery {
    /// Query `attr` on the first element matching `selector`.
    pub fn attr_of(selector: &str, attr: &str) -> Result<Self, QueryError> {
        Ok(Self {
            outer: parse_selector(selector)?,
            inner: None,
            attr: attr.to_string(),
        })
    }

    /// Query `attr` on the first `inner` element inside the first `outer` element.
    pub fn nested_attr_of(outer: &str, inner: &str, attr: &str) -> Result<Self, QueryError> {
        Ok(Self {
            outer: parse_selector(outer)?,
            inner: Some(parse_selector(inner)?),
            attr: attr.to_string(),
        })
    }

    /// Run the query against `html`.
    ///
    /// Returns `None` when no element matches, or when the first match lacks
    /// the inner element or the attribute. Later matches are never consulted.
    pub fn first(&self, html: &str) -> Option<String> {
        // `Html` is not `Send`, so it never outlives this call.
        let document = Html::parse_document(html);
        let first = document.select(&self.outer).next()?;

        let target = match &self.inner {
            Some(inner) => first.select(inner).next()?,
            None => first,
        };

        target.value().attr(&self.attr).map(str::to_string)
    }
}
