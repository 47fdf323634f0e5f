//! Page fetching
//!
//! The [`Fetcher`] trait is the seam between the dispatcher and the network.
//! [`HttpFetcher`] is the default implementation on a blocking reqwest
//! client; the parsed document type is not `Send`, so the whole pipeline
//! runs on one thread.

use crate::config::FetchConfig;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Error type for fetch operations
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// HTTP client error
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// A fetched resource, as seen by handlers
#[derive(Debug, Clone)]
pub struct Response {
    /// URL that was requested
    pub requested_url: Url,

    /// URL the content was finally served from, after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status: u16,

    /// Value of the Content-Type header, if any
    pub content_type: Option<String>,

    /// Raw body bytes
    pub body: Vec<u8>,
}

impl Response {
    /// A 200 HTML response served from `url` without redirects
    pub fn from_html(url: Url, html: impl Into<String>) -> Self {
        Self {
            requested_url: url.clone(),
            final_url: url,
            status: 200,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: html.into().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn was_redirected(&self) -> bool {
        self.requested_url != self.final_url
    }
}

/// Retrieves a resource for the dispatcher
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<Response, FetchFailure>;
}

/// Fetcher backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new fetcher with the given settings
    pub fn new(config: &FetchConfig) -> Result<Self, FetchFailure> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url), level = "debug")]
    fn fetch(&self, url: &Url) -> Result<Response, FetchFailure> {
        let response = self.client.get(url.clone()).send()?;

        let final_url = response.url().clone();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            warn!("Fetched {} with status {}", final_url, status);
        }

        let body = response.bytes()?.to_vec();
        debug!(
            "Fetched {} bytes from {} ({})",
            body.len(),
            final_url,
            status
        );

        Ok(Response {
            requested_url: url.clone(),
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
