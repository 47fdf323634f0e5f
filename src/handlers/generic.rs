//! Generic webpage handler

use crate::dispatcher::{Handler, HandlerResult, Page};
use crate::extract;
use crate::metadata::{Kind, Metadata, attr};

/// Matches every page, producing a `Webpage` record from the extraction rules
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericHandler;

/// The baseline record for a page
///
/// Provider handlers start from this and then overwrite or add attributes.
pub fn baseline(page: &Page) -> Metadata {
    let document = &page.document;
    let response = &page.response;

    let mut meta = Metadata::new();
    meta.set_kind(Kind::Webpage);
    meta.set_provider("");

    meta.set_attr(attr::TITLE, extract::extract_title(document));
    meta.set_attr(attr::DESCRIPTION, extract::extract_description(document));
    meta.set_attr(
        attr::THUMBNAIL_URL,
        extract::extract_thumbnail_url(document, response),
    );
    meta.set_attr(attr::URL, extract::extract_canonical_url(document, response));

    meta
}

impl Handler for GenericHandler {
    fn name(&self) -> &str {
        "generic"
    }

    fn try_match(&self, page: &Page) -> HandlerResult {
        Ok(Some(baseline(page)))
    }
}
