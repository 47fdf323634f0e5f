//! Queryable HTML documents
//!
//! A thin wrapper over [`scraper::Html`] exposing the two lookups handlers
//! need: the text of the first element matching a selector, and an
//! attribute of the first element matching a selector.

use crate::error::ScrapeError;
use crate::fetch::Response;
use scraper::{Html, Selector};
use tracing::warn;

/// A parsed page
pub struct Document {
    html: Html,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}

impl Document {
    /// Parse a fetched response into a document
    ///
    /// Fails if the response declares a content type that is not markup, or
    /// if the body is empty. Bodies that are not valid UTF-8 are decoded
    /// lossily.
    pub fn parse(response: &Response) -> Result<Self, ScrapeError> {
        if let Some(content_type) = response.content_type.as_deref() {
            if !is_markup(content_type) {
                return Err(ScrapeError::Parse(format!(
                    "unsupported content type '{}'",
                    content_type
                )));
            }
        }

        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Err(ScrapeError::Parse("empty response body".to_string()));
        }

        let source = String::from_utf8_lossy(&response.body);
        Ok(Self::from_html(&source))
    }

    /// Parse an HTML string directly
    pub fn from_html(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Text content of the first element matching `selector`
    pub fn first_text(&self, selector: &str) -> Option<String> {
        let selector = parse_selector(selector)?;
        self.html
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>())
    }

    /// Attribute `attr` of the first element matching `selector`
    ///
    /// Only the first matching element is consulted, even if it lacks the
    /// attribute.
    pub fn first_attr(&self, selector: &str, attr: &str) -> Option<String> {
        let selector = parse_selector(selector)?;
        self.html
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr(attr))
            .map(str::to_string)
    }

    /// Shorthand for the `content` attribute of the first matching `<meta>`
    pub fn meta_content(&self, selector: &str) -> Option<String> {
        self.first_attr(selector, "content")
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Failed to parse selector '{}': {}", selector, e);
            None
        }
    }
}

fn is_markup(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime.is_empty() || mime.starts_with("text/") || mime.ends_with("html") || mime.ends_with("xml")
}
