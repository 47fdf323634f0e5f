//! Attribute extraction rules
//!
//! Pages describe themselves through several overlapping conventions: bare
//! HTML, Open Graph and Twitter Cards. Each rule below walks its sources in
//! order and keeps the first non-empty value. Only the canonical URL falls
//! back to something observed on the network (the post-redirect URL).

use crate::document::Document;
use crate::fetch::Response;
use url::Url;

/// One place a value can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Text content of the first element matching the selector
    Text(&'static str),
    /// Attribute of the first element matching the selector
    Attr(&'static str, &'static str),
}

impl Source {
    fn read(&self, document: &Document) -> Option<String> {
        match self {
            Source::Text(selector) => document.first_text(selector),
            Source::Attr(selector, attr) => document.first_attr(selector, attr),
        }
    }
}

pub const TITLE_SOURCES: &[Source] = &[
    Source::Text("title"),
    Source::Attr("meta[name='title']", "content"),
    Source::Attr("meta[property='og:title']", "content"),
    Source::Attr("meta[name='twitter:title']", "content"),
];

pub const DESCRIPTION_SOURCES: &[Source] = &[
    Source::Attr("meta[name='description']", "content"),
    Source::Attr("meta[property='og:description']", "content"),
    Source::Attr("meta[name='twitter:description']", "content"),
];

pub const THUMBNAIL_SOURCES: &[Source] = &[
    Source::Attr("meta[name='thumbnail']", "content"),
    Source::Attr("meta[property='og:image']", "content"),
    Source::Attr("meta[name='twitter:image']", "content"),
];

pub const CANONICAL_SOURCES: &[Source] = &[
    Source::Attr("link[rel='canonical']", "href"),
    Source::Attr("meta[property='og:url']", "content"),
    Source::Attr("meta[name='twitter:url']", "content"),
];

/// First non-empty, trimmed value among `sources`
pub fn first_present(document: &Document, sources: &[Source]) -> Option<String> {
    sources.iter().find_map(|source| {
        source
            .read(document)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Page title, or an empty string
pub fn extract_title(document: &Document) -> String {
    first_present(document, TITLE_SOURCES).unwrap_or_default()
}

/// Page description, or an empty string
pub fn extract_description(document: &Document) -> String {
    first_present(document, DESCRIPTION_SOURCES).unwrap_or_default()
}

/// Thumbnail URL resolved against the response URL, or an empty string
pub fn extract_thumbnail_url(document: &Document, response: &Response) -> String {
    first_present(document, THUMBNAIL_SOURCES)
        .map(|value| resolve(&value, &response.final_url))
        .unwrap_or_default()
}

/// Canonical URL declared by the page, else the final fetched URL
pub fn extract_canonical_url(document: &Document, response: &Response) -> String {
    match first_present(document, CANONICAL_SOURCES) {
        Some(value) => resolve(&value, &response.final_url),
        None => response.final_url.to_string(),
    }
}

/// The canonical URL, parsed
///
/// Providers gate on its host and path. `None` if the page declares
/// something that is not a URL.
pub fn canonical_url_parsed(document: &Document, response: &Response) -> Option<Url> {
    Url::parse(&extract_canonical_url(document, response)).ok()
}

/// Resolve a relative reference against `base`
///
/// Absolute values are returned exactly as the page declared them.
fn resolve(value: &str, base: &Url) -> String {
    match Url::parse(value) {
        Ok(_) => value.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .join(value)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}
