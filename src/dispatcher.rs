//! # Handler Chain Dispatcher
//!
//! [`MetaScraper`] fetches a page, parses it, and walks its handlers in
//! registration order. The first handler to return a record wins and the rest
//! of the chain is skipped. The dispatcher itself knows nothing about
//! specificity; callers register the most specific handlers first.
//!
//! Handlers report one of three outcomes:
//!
//! - `Ok(Some(record))`: matched, stop here
//! - `Ok(None)`: not for this page
//! - `Err(HandlerError)`: something went wrong inside the handler; logged and
//!   treated exactly like `Ok(None)`
//!
//! The handler list is fixed when [`MetaScraperBuilder::build`] is called, so
//! a built scraper can be shared across threads without locking.

use crate::config::Config;
use crate::document::Document;
use crate::error::{HandlerError, Result, ScrapeError};
use crate::extract;
use crate::fetch::{FetchFailure, Fetcher, HttpFetcher, Response};
use crate::handlers::api::ApiClient;
use crate::handlers::{
    EtsyProductHandler, GenericHandler, SoundCloudAudioHandler, TwitterProfileHandler,
    TwitterStatusHandler, YouTubeVideoHandler,
};
use crate::metadata::Metadata;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// What a handler returns for a page
pub type HandlerResult = std::result::Result<Option<Metadata>, HandlerError>;

/// A fetched and parsed page, as handed to each handler
#[derive(Debug)]
pub struct Page {
    pub response: Response,
    pub document: Document,
}

impl Page {
    pub fn new(response: Response, document: Document) -> Self {
        Self { response, document }
    }

    /// Build a page from an HTML string served at `url`
    pub fn from_html(url: Url, html: &str) -> Self {
        Self {
            document: Document::from_html(html),
            response: Response::from_html(url, html),
        }
    }

    /// Canonical URL of the page, see [`extract::extract_canonical_url`]
    pub fn canonical_url(&self) -> Option<Url> {
        extract::canonical_url_parsed(&self.document, &self.response)
    }
}

/// A unit of matching and extraction logic
pub trait Handler: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Inspect the page and build a record if this handler claims it
    fn try_match(&self, page: &Page) -> HandlerResult;
}

/// Handler built from a closure
pub struct FnHandler<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a [`Handler`]
pub fn handler_fn<F>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: Fn(&Page) -> HandlerResult + Send + Sync,
{
    FnHandler {
        name: name.into(),
        f,
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&Page) -> HandlerResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn try_match(&self, page: &Page) -> HandlerResult {
        (self.f)(page)
    }
}

/// Builder for [`MetaScraper`]
pub struct MetaScraperBuilder {
    fetcher: Box<dyn Fetcher>,
    handlers: Vec<Box<dyn Handler>>,
}

impl MetaScraperBuilder {
    /// Append a handler to the end of the chain
    pub fn register(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Finalize the chain
    pub fn build(self) -> MetaScraper {
        MetaScraper {
            fetcher: self.fetcher,
            handlers: self.handlers,
        }
    }
}

/// Ordered, immutable chain of handlers plus the fetcher feeding it
pub struct MetaScraper {
    fetcher: Box<dyn Fetcher>,
    handlers: Vec<Box<dyn Handler>>,
}

impl MetaScraper {
    /// Start an empty chain that fetches through `fetcher`
    pub fn builder(fetcher: impl Fetcher + 'static) -> MetaScraperBuilder {
        MetaScraperBuilder {
            fetcher: Box::new(fetcher),
            handlers: Vec::new(),
        }
    }

    /// The standard chain: every provider handler, then the generic one
    pub fn standard(config: &Config) -> std::result::Result<Self, FetchFailure> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        let api = ApiClient::new(&config.fetch)?;
        let providers = &config.providers;

        Ok(Self::builder(fetcher)
            .register(EtsyProductHandler)
            .register(YouTubeVideoHandler::new(api.clone(), providers))
            .register(SoundCloudAudioHandler::new(api.clone(), providers))
            .register(TwitterProfileHandler::new(api.clone(), providers))
            .register(TwitterStatusHandler::new(api, providers))
            .register(GenericHandler)
            .build())
    }

    /// Names of the registered handlers, in order
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Fetch, parse and run the chain against `url_input`
    #[instrument(skip(self))]
    pub fn scrape(&self, url_input: &str) -> Result<Metadata> {
        let url = parse_input(url_input)?;

        let response = self.fetcher.fetch(&url).map_err(|e| ScrapeError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let document = Document::parse(&response)?;

        self.scrape_page(&Page::new(response, document))
    }

    /// Run the chain against an already fetched and parsed page
    pub fn scrape_page(&self, page: &Page) -> Result<Metadata> {
        for handler in &self.handlers {
            debug!("Trying handler {}", handler.name());

            match handler.try_match(page) {
                Ok(Some(metadata)) => {
                    info!(
                        "Handler {} matched {} as {}",
                        handler.name(),
                        page.response.final_url,
                        metadata.kind()
                    );
                    return Ok(metadata);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Handler {} failed, skipping: {}", handler.name(), e);
                }
            }
        }

        Err(ScrapeError::NoMatch(page.response.requested_url.to_string()))
    }
}

/// Accept only absolute http(s) URLs with a host
fn parse_input(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    let invalid = || ScrapeError::InvalidInput(input.to_string());

    let url = Url::parse(trimmed).map_err(|_| invalid())?;
    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    if !matches!(url.scheme(), "http" | "https") || !has_host {
        return Err(invalid());
    }

    Ok(url)
}
