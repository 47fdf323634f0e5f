//! Twitter profiles and statuses via the v1.1 REST API
//!
//! Both handlers require `TWITTER_BEARER_TOKEN` and accept canonical URLs on
//! `twitter.com` or `x.com`. A profile is `/<handle>`, a status is
//! `/<handle>/status/<id>`.

use crate::config::{ProviderConfig, non_empty};
use crate::dispatcher::{Handler, HandlerResult, Page};
use crate::handlers::api::ApiClient;
use crate::handlers::generic::baseline;
use crate::metadata::{Attributes, Kind, Metadata, Value, attr};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use url::Url;

const TWITTER_HOSTS: &[&str] = &["twitter.com", "x.com"];
const USERS_SHOW_PATH: &str = "1.1/users/show.json";
const STATUSES_SHOW_PATH: &str = "1.1/statuses/show.json";
const PROVIDER: &str = "Twitter";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct User {
    screen_name: String,
    name: String,
    location: Option<String>,
    description: Option<String>,
    created_at: Option<String>,
    profile_image_url_https: Option<String>,
    followers_count: i64,
    friends_count: i64,
    statuses_count: i64,
    favourites_count: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Tweet {
    full_text: Option<String>,
    text: Option<String>,
    created_at: Option<String>,
    entities: Entities,
    retweet_count: i64,
    favorite_count: i64,
    user: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entities {
    hashtags: Vec<HashTag>,
    urls: Vec<TweetUrl>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HashTag {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TweetUrl {
    url: String,
    expanded_url: Option<String>,
}

impl User {
    /// Write the profile attributes onto a record
    fn apply(&self, meta: &mut Metadata) {
        meta.set_kind(Kind::Profile);
        meta.set_provider(PROVIDER);

        if let Some(image) = self.profile_image_url_https.as_deref() {
            meta.set_attr(attr::THUMBNAIL_URL, image);
        }
        meta.set_attr("handle", self.screen_name.as_str());
        meta.set_attr("name", self.name.as_str());
        meta.set_attr("location", self.location.as_deref().unwrap_or_default());
        meta.set_attr("bio", self.description.as_deref().unwrap_or_default());
        if let Some(created) = self.created_at.as_deref().and_then(parse_created_at) {
            meta.set_attr("dateCreated", created);
        }

        let stats = Attributes::from([
            ("followerCount".to_string(), self.followers_count.into()),
            ("followingCount".to_string(), self.friends_count.into()),
            ("tweetCount".to_string(), self.statuses_count.into()),
            ("favoriteCount".to_string(), self.favourites_count.into()),
        ]);
        meta.set_attr("statistics", stats);
    }

    /// A standalone profile record, used for a status author
    fn to_record(&self) -> Metadata {
        let mut meta = Metadata::new();
        if !self.screen_name.is_empty() {
            meta.set_attr(
                attr::URL,
                format!("https://twitter.com/{}", self.screen_name),
            );
        }
        self.apply(&mut meta);
        meta
    }
}

impl Entities {
    fn to_attributes(&self) -> Attributes {
        let hash_tags: Vec<Value> = self
            .hashtags
            .iter()
            .map(|tag| Value::from(tag.text.as_str()))
            .collect();

        let urls: Vec<Value> = self
            .urls
            .iter()
            .map(|url| {
                let original = url.expanded_url.as_deref().unwrap_or(&url.url);
                Value::from(Attributes::from([
                    ("short".to_string(), Value::from(url.url.as_str())),
                    ("original".to_string(), Value::from(original)),
                ]))
            })
            .collect();

        Attributes::from([
            ("hashTags".to_string(), Value::from(hash_tags)),
            ("urls".to_string(), Value::from(urls)),
        ])
    }
}

/// Parse Twitter's `Mon Jan 02 15:04:05 -0700 2006` timestamps
fn parse_created_at(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value.trim(), "%a %b %d %H:%M:%S %z %Y").ok()
}

/// Non-empty path segments of a Twitter URL
fn twitter_segments(url: &Url) -> Option<Vec<&str>> {
    if !TWITTER_HOSTS.contains(&url.host_str()?) {
        return None;
    }

    let path = url.path().trim_matches('/');
    if path.is_empty() {
        return Some(Vec::new());
    }
    Some(path.split('/').collect())
}

/// Handle from a profile URL such as `https://twitter.com/jack`
fn profile_handle(url: &Url) -> Option<String> {
    match twitter_segments(url)?.as_slice() {
        [handle] if !handle.is_empty() => Some(handle.to_string()),
        _ => None,
    }
}

/// Status id from a URL such as `https://twitter.com/jack/status/20`
fn status_id(url: &Url) -> Option<u64> {
    match twitter_segments(url)?.as_slice() {
        [_, "status", id] => id.parse().ok(),
        _ => None,
    }
}

/// Shared credentials for the two Twitter handlers
struct TwitterApi {
    api: ApiClient,
    bearer_token: Option<String>,
    api_base: String,
}

impl TwitterApi {
    fn new(api: ApiClient, providers: &ProviderConfig) -> Self {
        Self {
            api,
            bearer_token: providers.twitter_bearer_token.clone(),
            api_base: providers.twitter_api_base.clone(),
        }
    }

    fn token(&self) -> Option<&str> {
        non_empty(self.bearer_token.as_deref())
    }
}

pub struct TwitterProfileHandler {
    twitter: TwitterApi,
}

impl TwitterProfileHandler {
    pub fn new(api: ApiClient, providers: &ProviderConfig) -> Self {
        Self {
            twitter: TwitterApi::new(api, providers),
        }
    }
}

impl Handler for TwitterProfileHandler {
    fn name(&self) -> &str {
        "twitter-profile"
    }

    fn try_match(&self, page: &Page) -> HandlerResult {
        let Some(token) = self.twitter.token() else {
            return Ok(None);
        };
        let Some(handle) = page.canonical_url().as_ref().and_then(profile_handle) else {
            return Ok(None);
        };

        let user: User = self.twitter.api.get_json(
            &self.twitter.api_base,
            USERS_SHOW_PATH,
            &[("screen_name", handle.as_str())],
            Some(token),
        )?;

        let mut meta = baseline(page);
        user.apply(&mut meta);

        Ok(Some(meta))
    }
}

pub struct TwitterStatusHandler {
    twitter: TwitterApi,
}

impl TwitterStatusHandler {
    pub fn new(api: ApiClient, providers: &ProviderConfig) -> Self {
        Self {
            twitter: TwitterApi::new(api, providers),
        }
    }
}

impl Handler for TwitterStatusHandler {
    fn name(&self) -> &str {
        "twitter-status"
    }

    fn try_match(&self, page: &Page) -> HandlerResult {
        let Some(token) = self.twitter.token() else {
            return Ok(None);
        };
        let Some(id) = page.canonical_url().as_ref().and_then(status_id) else {
            return Ok(None);
        };

        let id = id.to_string();
        let tweet: Tweet = self.twitter.api.get_json(
            &self.twitter.api_base,
            STATUSES_SHOW_PATH,
            &[("id", id.as_str()), ("tweet_mode", "extended")],
            Some(token),
        )?;

        let mut meta = baseline(page);
        meta.set_kind(Kind::Status);
        meta.set_provider(PROVIDER);

        let content = tweet.full_text.or(tweet.text).unwrap_or_default();
        meta.set_attr("content", content);
        if let Some(created) = tweet.created_at.as_deref().and_then(parse_created_at) {
            meta.set_attr("datePublished", created);
        }
        meta.set_attr("entities", tweet.entities.to_attributes());
        meta.set_attr(
            "statistics",
            Attributes::from([
                ("retweetCount".to_string(), tweet.retweet_count.into()),
                ("favoriteCount".to_string(), tweet.favorite_count.into()),
            ]),
        );
        if let Some(user) = &tweet.user {
            meta.set_attr("author", user.to_record());
        }

        Ok(Some(meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, FetchConfig};
    use crate::handlers::test_support::page;
    use mockito::{Matcher, Server};

    const USER_JSON: &str = r#"{
        "screen_name": "jack",
        "name": "jack",
        "location": "California",
        "description": "no state is the best state",
        "created_at": "Tue Mar 21 20:50:14 +0000 2006",
        "profile_image_url_https": "https://pbs.twimg.com/jack.jpg",
        "followers_count": 100,
        "friends_count": 20,
        "statuses_count": 3000,
        "favourites_count": 40
    }"#;

    fn tweet_json() -> String {
        format!(
            r#"{{
                "id": 20,
                "full_text": "just setting up my twttr #first https://t.co/x",
                "created_at": "Tue Mar 21 20:50:14 +0000 2006",
                "entities": {{
                    "hashtags": [{{ "text": "first", "indices": [27, 33] }}],
                    "urls": [{{ "url": "https://t.co/x", "expanded_url": "https://example.com/x" }}]
                }},
                "retweet_count": 120000,
                "favorite_count": 150000,
                "user": {USER_JSON}
            }}"#
        )
    }

    fn config(server: &Server) -> Config {
        Config::default()
            .with_twitter_bearer_token("bearer")
            .with_api_base(server.url())
    }

    fn api() -> ApiClient {
        ApiClient::new(&FetchConfig::default()).unwrap()
    }

    #[test]
    fn test_url_shapes() {
        let url = |s: &str| Url::parse(s).unwrap();

        assert_eq!(profile_handle(&url("https://twitter.com/jack")).as_deref(), Some("jack"));
        assert_eq!(profile_handle(&url("https://x.com/jack/")).as_deref(), Some("jack"));
        assert_eq!(profile_handle(&url("https://twitter.com/")), None);
        assert_eq!(profile_handle(&url("https://twitter.com/jack/likes")), None);
        assert_eq!(profile_handle(&url("https://example.com/jack")), None);

        assert_eq!(status_id(&url("https://twitter.com/jack/status/20")), Some(20));
        assert_eq!(status_id(&url("https://x.com/jack/status/20/")), Some(20));
        assert_eq!(status_id(&url("https://twitter.com/jack/status/abc")), None);
        assert_eq!(status_id(&url("https://twitter.com/jack/lists/20")), None);
    }

    #[test]
    fn test_parse_created_at() {
        let parsed = parse_created_at("Tue Mar 21 20:50:14 +0000 2006").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2006-03-21T20:50:14+00:00");
        assert!(parse_created_at("2006-03-21").is_none());
    }

    #[test]
    fn test_profile_matches() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/1.1/users/show.json")
            .match_query(Matcher::UrlEncoded("screen_name".into(), "jack".into()))
            .match_header("authorization", "Bearer bearer")
            .with_status(200)
            .with_body(USER_JSON)
            .expect(1)
            .create();

        let handler = TwitterProfileHandler::new(api(), &config(&server).providers);
        let page = page(
            "https://twitter.com/jack",
            "<html><head><title>jack (@jack)</title></head></html>",
        );

        let meta = handler.try_match(&page).unwrap().unwrap();
        assert_eq!(meta.kind(), Kind::Profile);
        assert_eq!(meta.provider(), "Twitter");
        assert_eq!(meta.text_attr(attr::TITLE), Some("jack (@jack)"));
        assert_eq!(
            meta.text_attr(attr::THUMBNAIL_URL),
            Some("https://pbs.twimg.com/jack.jpg")
        );
        assert_eq!(meta.text_attr("handle"), Some("jack"));
        assert_eq!(meta.text_attr("bio"), Some("no state is the best state"));
        assert!(matches!(meta.attr("dateCreated"), Some(Value::Timestamp(_))));

        let stats = meta.attr("statistics").and_then(Value::as_map).unwrap();
        assert_eq!(stats.get("followerCount"), Some(&Value::Integer(100)));
        assert_eq!(stats.get("followingCount"), Some(&Value::Integer(20)));
        assert_eq!(stats.get("tweetCount"), Some(&Value::Integer(3000)));
        assert_eq!(stats.get("favoriteCount"), Some(&Value::Integer(40)));

        mock.assert();
    }

    #[test]
    fn test_status_matches() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/1.1/statuses/show.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "20".into()),
                Matcher::UrlEncoded("tweet_mode".into(), "extended".into()),
            ]))
            .with_status(200)
            .with_body(tweet_json())
            .expect(1)
            .create();

        let handler = TwitterStatusHandler::new(api(), &config(&server).providers);
        let page = page("https://x.com/jack/status/20", "<html></html>");

        let meta = handler.try_match(&page).unwrap().unwrap();
        assert_eq!(meta.kind(), Kind::Status);
        assert_eq!(meta.provider(), "Twitter");
        assert_eq!(
            meta.text_attr("content"),
            Some("just setting up my twttr #first https://t.co/x")
        );
        assert!(matches!(meta.attr("datePublished"), Some(Value::Timestamp(_))));

        let entities = meta.attr("entities").and_then(Value::as_map).unwrap();
        assert_eq!(
            entities.get("hashTags"),
            Some(&Value::List(vec![Value::from("first")]))
        );
        let Some(Value::List(urls)) = entities.get("urls") else {
            panic!("urls should be a list");
        };
        let first = urls[0].as_map().unwrap();
        assert_eq!(first.get("short"), Some(&Value::from("https://t.co/x")));
        assert_eq!(first.get("original"), Some(&Value::from("https://example.com/x")));

        let stats = meta.attr("statistics").and_then(Value::as_map).unwrap();
        assert_eq!(stats.get("retweetCount"), Some(&Value::Integer(120000)));

        let author = meta.attr("author").and_then(Value::as_record).unwrap();
        assert_eq!(author.kind(), Kind::Profile);
        assert_eq!(author.text_attr("handle"), Some("jack"));
        assert_eq!(author.text_attr(attr::URL), Some("https://twitter.com/jack"));

        mock.assert();
    }

    #[test]
    fn test_profile_handler_ignores_status_urls() {
        let mut server = Server::new();
        let mock = server.mock("GET", Matcher::Any).expect(0).create();

        let handler = TwitterProfileHandler::new(api(), &config(&server).providers);
        let page = page("https://twitter.com/jack/status/20", "<html></html>");

        assert!(handler.try_match(&page).unwrap().is_none());
        mock.assert();
    }

    #[test]
    fn test_without_token_never_matches() {
        let mut server = Server::new();
        let mock = server.mock("GET", Matcher::Any).expect(0).create();

        let providers = Config::default().with_api_base(server.url()).providers;
        let page = page("https://twitter.com/jack", "<html></html>");

        assert!(TwitterProfileHandler::new(api(), &providers).try_match(&page).unwrap().is_none());
        assert!(TwitterStatusHandler::new(api(), &providers).try_match(&page).unwrap().is_none());
        mock.assert();
    }

    #[test]
    fn test_suspended_account_is_an_error() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/1.1/users/show.json")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"errors":[{"code":63,"message":"User has been suspended."}]}"#)
            .create();

        let handler = TwitterProfileHandler::new(api(), &config(&server).providers);
        let page = page("https://twitter.com/someone", "<html></html>");

        assert!(handler.try_match(&page).is_err());
        mock.assert();
    }
}
