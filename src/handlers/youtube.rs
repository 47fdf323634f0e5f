//! YouTube videos via the YouTube Data API v3
//!
//! Requires `YOUTUBE_API_KEY`. Matches when the canonical URL is on a
//! YouTube host with a `v` query parameter and the API returns the video.

use crate::config::{ProviderConfig, non_empty};
use crate::dispatcher::{Handler, HandlerResult, Page};
use crate::handlers::api::ApiClient;
use crate::handlers::generic::baseline;
use crate::metadata::{Attributes, Kind, attr};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use url::Url;

const YOUTUBE_HOSTS: &[&str] = &["www.youtube.com", "youtube.com", "m.youtube.com"];
const VIDEOS_PATH: &str = "youtube/v3/videos";
const PART: &str = "snippet,contentDetails,statistics,player";
const FIELDS: &str = "items(id,snippet/title,snippet/publishedAt,snippet/thumbnails/medium,contentDetails/duration,statistics,player/embedHtml)";

#[derive(Debug, Default, Deserialize)]
struct VideoList {
    #[serde(default)]
    items: Vec<Video>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Video {
    content_details: ContentDetails,
    snippet: Snippet,
    statistics: Statistics,
    player: Player,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    published_at: Option<DateTime<FixedOffset>>,
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnails {
    medium: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
    url: String,
}

/// Counts arrive as decimal strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    dislike_count: Option<String>,
    favorite_count: Option<String>,
    comment_count: Option<String>,
}

impl Statistics {
    fn to_attributes(&self) -> Attributes {
        let counts = [
            ("viewCount", &self.view_count),
            ("likeCount", &self.like_count),
            ("dislikeCount", &self.dislike_count),
            ("favoriteCount", &self.favorite_count),
            ("commentCount", &self.comment_count),
        ];

        counts
            .into_iter()
            .filter_map(|(key, count)| {
                let count = count.as_deref()?.parse::<i64>().ok()?;
                Some((key.to_string(), count.into()))
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Player {
    embed_html: Option<String>,
}

pub struct YouTubeVideoHandler {
    api: ApiClient,
    api_key: Option<String>,
    api_base: String,
}

impl YouTubeVideoHandler {
    pub fn new(api: ApiClient, providers: &ProviderConfig) -> Self {
        Self {
            api,
            api_key: providers.youtube_api_key.clone(),
            api_base: providers.youtube_api_base.clone(),
        }
    }
}

/// Video id from a YouTube watch URL
fn video_id(url: &Url) -> Option<String> {
    if !YOUTUBE_HOSTS.contains(&url.host_str()?) {
        return None;
    }

    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.trim().to_string())
        .filter(|id| !id.is_empty())
}

impl Handler for YouTubeVideoHandler {
    fn name(&self) -> &str {
        "youtube-video"
    }

    fn try_match(&self, page: &Page) -> HandlerResult {
        let Some(api_key) = non_empty(self.api_key.as_deref()) else {
            return Ok(None);
        };
        let Some(id) = page.canonical_url().as_ref().and_then(video_id) else {
            return Ok(None);
        };

        let list: VideoList = self.api.get_json(
            &self.api_base,
            VIDEOS_PATH,
            &[
                ("key", api_key),
                ("part", PART),
                ("fields", FIELDS),
                ("id", id.as_str()),
            ],
            None,
        )?;

        let Some(video) = list.items.into_iter().next() else {
            return Ok(None);
        };

        let mut meta = baseline(page);
        meta.set_kind(Kind::Video);
        meta.set_provider("YouTube");

        if !video.snippet.title.is_empty() {
            meta.set_attr(attr::TITLE, video.snippet.title);
        }
        if let Some(thumbnail) = video.snippet.thumbnails.medium {
            meta.set_attr(attr::THUMBNAIL_URL, thumbnail.url);
        }
        if let Some(published) = video.snippet.published_at {
            meta.set_attr("datePublished", published);
        }
        if !video.content_details.duration.is_empty() {
            meta.set_attr("duration", video.content_details.duration);
        }
        if let Some(embed) = video.player.embed_html {
            meta.set_attr("embedHtml", embed);
        }
        meta.set_attr("statistics", video.statistics.to_attributes());

        Ok(Some(meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::config::FetchConfig;
    use crate::handlers::test_support::page;
    use crate::metadata::Value;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};

    const WATCH_PAGE: &str = r#"<html><head>
        <title>Old Title - YouTube</title>
        <meta name="description" content="A video">
        <link rel="canonical" href="https://www.youtube.com/watch?v=abc123">
    </head></html>"#;

    const API_RESPONSE: &str = r#"{
        "items": [{
            "id": "abc123",
            "snippet": {
                "title": "Real Title",
                "publishedAt": "2015-03-01T12:00:00Z",
                "thumbnails": {
                    "medium": { "url": "https://i.ytimg.com/vi/abc123/mqdefault.jpg", "width": 320, "height": 180 }
                }
            },
            "contentDetails": { "duration": "PT4M13S" },
            "statistics": {
                "viewCount": "1024",
                "likeCount": "10",
                "favoriteCount": "0",
                "commentCount": "3"
            },
            "player": { "embedHtml": "<iframe></iframe>" }
        }]
    }"#;

    fn handler(config: &Config) -> YouTubeVideoHandler {
        let api = ApiClient::new(&FetchConfig::default()).unwrap();
        YouTubeVideoHandler::new(api, &config.providers)
    }

    #[test]
    fn test_video_id() {
        let id = |s: &str| video_id(&Url::parse(s).unwrap());
        assert_eq!(id("https://www.youtube.com/watch?v=abc").as_deref(), Some("abc"));
        assert_eq!(id("https://m.youtube.com/watch?feature=x&v=abc").as_deref(), Some("abc"));
        assert_eq!(id("https://www.youtube.com/watch?v="), None);
        assert_eq!(id("https://www.youtube.com/channel/xyz"), None);
        assert_eq!(id("https://example.com/watch?v=abc"), None);
    }

    #[test]
    fn test_video_matches() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/youtube/v3/videos")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "yt-key".into()),
                Matcher::UrlEncoded("id".into(), "abc123".into()),
                Matcher::UrlEncoded("part".into(), PART.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(API_RESPONSE)
            .expect(1)
            .create();

        let config = Config::default()
            .with_youtube_api_key("yt-key")
            .with_api_base(server.url());
        let page = page("https://www.youtube.com/watch?v=abc123&t=5", WATCH_PAGE);

        let meta = handler(&config).try_match(&page).unwrap().unwrap();
        assert_eq!(meta.kind(), Kind::Video);
        assert_eq!(meta.provider(), "YouTube");
        assert_eq!(meta.text_attr(attr::TITLE), Some("Real Title"));
        assert_eq!(meta.text_attr(attr::DESCRIPTION), Some("A video"));
        assert_eq!(
            meta.text_attr(attr::THUMBNAIL_URL),
            Some("https://i.ytimg.com/vi/abc123/mqdefault.jpg")
        );
        assert_eq!(meta.text_attr("duration"), Some("PT4M13S"));
        assert_eq!(meta.text_attr("embedHtml"), Some("<iframe></iframe>"));

        let published = chrono::Utc.with_ymd_and_hms(2015, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(meta.attr("datePublished"), Some(&Value::from(published)));

        let stats = meta.attr("statistics").and_then(Value::as_map).unwrap();
        assert_eq!(stats.get("viewCount"), Some(&Value::Integer(1024)));
        assert_eq!(stats.get("commentCount"), Some(&Value::Integer(3)));
        assert!(!stats.contains_key("dislikeCount"));

        mock.assert();
    }

    #[test]
    fn test_no_items_does_not_match() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/youtube/v3/videos")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"items": []}"#)
            .create();

        let config = Config::default()
            .with_youtube_api_key("yt-key")
            .with_api_base(server.url());
        let page = page("https://www.youtube.com/watch?v=abc123", WATCH_PAGE);

        assert!(handler(&config).try_match(&page).unwrap().is_none());
        mock.assert();
    }

    #[test]
    fn test_api_failure_is_an_error() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/youtube/v3/videos")
            .match_query(Matcher::Any)
            .with_status(500)
            .create();

        let config = Config::default()
            .with_youtube_api_key("yt-key")
            .with_api_base(server.url());
        let page = page("https://www.youtube.com/watch?v=abc123", WATCH_PAGE);

        assert!(handler(&config).try_match(&page).is_err());
        mock.assert();
    }

    #[test]
    fn test_without_key_never_matches() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(API_RESPONSE)
            .expect(0)
            .create();

        let config = Config::default().with_api_base(server.url());
        let page = page("https://www.youtube.com/watch?v=abc123", WATCH_PAGE);

        assert!(handler(&config).try_match(&page).unwrap().is_none());

        let blank = Config::default()
            .with_youtube_api_key("  ")
            .with_api_base(server.url());
        assert!(handler(&blank).try_match(&page).unwrap().is_none());

        mock.assert();
    }
}
