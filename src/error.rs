//! Error types for the metascrape crate

use thiserror::Error;

/// Result type for scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Error surfaced by [`MetaScraper::scrape`](crate::MetaScraper::scrape).
///
/// Exactly one of these is returned per failed call. Underlying causes are
/// folded into the message so callers never see a chain of nested errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    /// The input is not a well-formed absolute http(s) URL
    #[error("Invalid `url` input: {0}")]
    InvalidInput(String),

    /// Network or transport failure while retrieving the page
    #[error("Unable to fetch URL {url}: {reason}")]
    Fetch {
        /// URL that was requested
        url: String,
        /// Flattened description of the failure
        reason: String,
    },

    /// The response could not be turned into a queryable document
    #[error("Unable to parse the response: {0}")]
    Parse(String),

    /// Every registered handler declined the page
    #[error("None of the handlers were able to match and scrape {0}")]
    NoMatch(String),
}

impl ScrapeError {
    /// Stable label for the error category
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::InvalidInput(_) => "invalid_input",
            ScrapeError::Fetch { .. } => "fetch",
            ScrapeError::Parse(_) => "parse",
            ScrapeError::NoMatch(_) => "no_match",
        }
    }
}

/// Failure inside a single handler.
///
/// The dispatcher logs these and moves on to the next handler; they never
/// reach the caller of `scrape`.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider API answered with a non-success status
    #[error("API error: {status} - {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected page or API data was missing or malformed
    #[error("Malformed data: {0}")]
    Malformed(String),
}
