//! # metascrape - Structured metadata from web pages
//!
//! Given a URL, `metascrape` fetches the page, parses its markup and walks an
//! ordered chain of handlers. Provider handlers recognise specific sites
//! (Etsy listings, YouTube videos, SoundCloud tracks, Twitter profiles and
//! statuses) and enrich the record, often through the provider's own API. A
//! generic handler at the end of the chain guarantees that any well-formed
//! page yields at least a title, description, thumbnail and canonical URL.
//!
//! ## Features
//!
//! - Ordered handler chain with first-match-wins dispatch
//! - Typed metadata records with an open attribute map
//! - Extraction rules over `<title>`, standard, OpenGraph and Twitter tags
//! - Optional provider handlers gated on API credentials
//! - An HTTP API (`server`) and a CLI binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use metascrape::{Config, MetaScraper};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scraper = MetaScraper::standard(&Config::from_env())?;
//!
//!     let metadata = scraper.scrape("https://www.rust-lang.org/")?;
//!     println!("{} {:?}", metadata.kind(), metadata.text_attr("title"));
//!
//!     Ok(())
//! }
//! ```
//!
//! Custom handlers are registered on a builder; the chain is immutable once
//! built:
//!
//! ```rust,no_run
//! use metascrape::{Config, MetaScraper, Metadata, handler_fn};
//! use metascrape::fetch::HttpFetcher;
//! use metascrape::handlers::GenericHandler;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpFetcher::new(&Config::default().fetch)?;
//! let scraper = MetaScraper::builder(fetcher)
//!     .register(handler_fn("docs-rs", |page| {
//!         let host = page.response.final_url.host_str();
//!         Ok((host == Some("docs.rs")).then(|| {
//!             let mut meta = Metadata::new();
//!             meta.set_provider("docs.rs");
//!             meta
//!         }))
//!     }))
//!     .register(GenericHandler)
//!     .build();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod document;
mod error;
pub mod extract;
pub mod fetch;
pub mod handlers;
pub mod metadata;
pub mod server;

pub use config::Config;
pub use dispatcher::{
    Handler, HandlerResult, MetaScraper, MetaScraperBuilder, Page, handler_fn,
};
pub use error::{HandlerError, Result, ScrapeError};
pub use metadata::{Attributes, Kind, Metadata, Value};
