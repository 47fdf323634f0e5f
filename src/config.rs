//! # Configuration
//!
//! Settings are read once at startup and passed by reference into the
//! fetcher and each provider handler's constructor. Nothing here is global:
//! a handler without its credential simply never matches.
//!
//! ## Environment
//!
//! - `YOUTUBE_API_KEY`
//! - `SOUNDCLOUD_CLIENT_ID` (or the older `SOUNDCLOUD_API_KEY`)
//! - `TWITTER_BEARER_TOKEN`
//! - `METASCRAPE_TIMEOUT_SECS`, `METASCRAPE_USER_AGENT`

use std::env;
use std::time::Duration;

/// Default timeout for outbound requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of redirects followed when fetching a page
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com";
pub const SOUNDCLOUD_API_BASE: &str = "https://api.soundcloud.com";
pub const TWITTER_API_BASE: &str = "https://api.twitter.com";

/// Complete runtime configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Settings for page fetches and provider API calls
    pub fetch: FetchConfig,

    /// Provider credentials and endpoints
    pub providers: ProviderConfig,
}

/// Settings for outbound HTTP
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("metascrape/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl FetchConfig {
    /// Get the timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Credentials and API endpoints for provider handlers
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub youtube_api_key: Option<String>,
    pub soundcloud_client_id: Option<String>,
    pub twitter_bearer_token: Option<String>,

    pub youtube_api_base: String,
    pub soundcloud_api_base: String,
    pub twitter_api_base: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            soundcloud_client_id: None,
            twitter_bearer_token: None,
            youtube_api_base: YOUTUBE_API_BASE.to_string(),
            soundcloud_api_base: SOUNDCLOUD_API_BASE.to_string(),
            twitter_api_base: TWITTER_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Build a configuration from process environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Some(secs) = non_empty_var("METASCRAPE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.fetch.timeout_secs = secs;
        }
        if let Some(agent) = non_empty_var("METASCRAPE_USER_AGENT") {
            config.fetch.user_agent = agent;
        }

        config.providers.youtube_api_key = non_empty_var("YOUTUBE_API_KEY");
        config.providers.soundcloud_client_id =
            non_empty_var("SOUNDCLOUD_CLIENT_ID").or_else(|| non_empty_var("SOUNDCLOUD_API_KEY"));
        config.providers.twitter_bearer_token = non_empty_var("TWITTER_BEARER_TOKEN");

        config
    }

    /// Set the YouTube Data API key
    pub fn with_youtube_api_key(mut self, key: impl Into<String>) -> Self {
        self.providers.youtube_api_key = Some(key.into());
        self
    }

    /// Set the SoundCloud client id
    pub fn with_soundcloud_client_id(mut self, id: impl Into<String>) -> Self {
        self.providers.soundcloud_client_id = Some(id.into());
        self
    }

    /// Set the Twitter app-only bearer token
    pub fn with_twitter_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.providers.twitter_bearer_token = Some(token.into());
        self
    }

    /// Point every provider API at one base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.providers.youtube_api_base = base.clone();
        self.providers.soundcloud_api_base = base.clone();
        self.providers.twitter_api_base = base;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.fetch.user_agent = agent.into();
        self
    }
}

/// Treat blank credentials the same as missing ones
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.fetch.max_redirects, 10);
        assert!(config.fetch.user_agent.starts_with("metascrape/"));
        assert!(config.providers.youtube_api_key.is_none());
        assert_eq!(config.providers.twitter_api_base, "https://api.twitter.com");
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::default()
            .with_youtube_api_key("yt")
            .with_soundcloud_client_id("sc")
            .with_twitter_bearer_token("tw")
            .with_api_base("http://127.0.0.1:9999")
            .with_timeout_secs(5);

        assert_eq!(config.providers.youtube_api_key.as_deref(), Some("yt"));
        assert_eq!(config.providers.soundcloud_client_id.as_deref(), Some("sc"));
        assert_eq!(config.providers.twitter_bearer_token.as_deref(), Some("tw"));
        assert_eq!(config.providers.soundcloud_api_base, "http://127.0.0.1:9999");
        assert_eq!(config.fetch.timeout_secs, 5);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(" key ")), Some("key"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
