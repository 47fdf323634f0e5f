//! SoundCloud tracks via the `resolve` endpoint
//!
//! Requires `SOUNDCLOUD_CLIENT_ID`. Matches when the canonical host is
//! `soundcloud.com` and the page declares `og:type` `soundcloud:sound`.

use crate::config::{ProviderConfig, non_empty};
use crate::dispatcher::{Handler, HandlerResult, Page};
use crate::handlers::api::ApiClient;
use crate::handlers::generic::baseline;
use crate::metadata::{Attributes, Kind, attr};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

const SOUNDCLOUD_HOST: &str = "soundcloud.com";
const SOUND_TYPE: &str = "soundcloud:sound";
const RESOLVE_PATH: &str = "resolve.json";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Track {
    title: Option<String>,
    description: Option<String>,
    genre: Option<String>,
    /// Milliseconds
    duration: Option<u64>,
    created_at: Option<String>,
    artwork_url: Option<String>,
    comment_count: Option<i64>,
    favoritings_count: Option<i64>,
    likes_count: Option<i64>,
    playback_count: Option<i64>,
}

impl Track {
    fn statistics(&self) -> Attributes {
        let counts = [
            ("commentCount", self.comment_count),
            ("favoriteCount", self.favoritings_count.or(self.likes_count)),
            ("viewCount", self.playback_count),
        ];

        counts
            .into_iter()
            .filter_map(|(key, count)| Some((key.to_string(), count?.into())))
            .collect()
    }
}

pub struct SoundCloudAudioHandler {
    api: ApiClient,
    client_id: Option<String>,
    api_base: String,
}

impl SoundCloudAudioHandler {
    pub fn new(api: ApiClient, providers: &ProviderConfig) -> Self {
        Self {
            api,
            client_id: providers.soundcloud_client_id.clone(),
            api_base: providers.soundcloud_api_base.clone(),
        }
    }
}

/// Parse SoundCloud's `2013/05/21 17:15:43 +0000` timestamps
fn parse_created_at(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value.trim(), "%Y/%m/%d %H:%M:%S %z")
        .or_else(|_| DateTime::parse_from_rfc3339(value.trim()))
        .ok()
}

/// Format milliseconds as an ISO 8601 duration such as `PT1H2M3S`
fn iso8601_duration(millis: u64) -> String {
    let total = millis.saturating_add(500) / 1000;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if seconds > 0 || total == 0 {
        out.push_str(&format!("{seconds}S"));
    }
    out
}

impl Handler for SoundCloudAudioHandler {
    fn name(&self) -> &str {
        "soundcloud-audio"
    }

    fn try_match(&self, page: &Page) -> HandlerResult {
        let Some(client_id) = non_empty(self.client_id.as_deref()) else {
            return Ok(None);
        };
        let Some(canonical) = page.canonical_url() else {
            return Ok(None);
        };
        if canonical.host_str() != Some(SOUNDCLOUD_HOST) {
            return Ok(None);
        }
        let og_type = page.document.meta_content("meta[property='og:type']");
        if og_type.as_deref().map(str::trim) != Some(SOUND_TYPE) {
            return Ok(None);
        }

        let track: Track = self.api.get_json(
            &self.api_base,
            RESOLVE_PATH,
            &[("client_id", client_id), ("url", canonical.as_str())],
            None,
        )?;

        let mut meta = baseline(page);
        meta.set_kind(Kind::Audio);
        meta.set_provider("SoundCloud");

        if let Some(title) = track.title.as_deref().filter(|t| !t.is_empty()) {
            meta.set_attr(attr::TITLE, title);
        }
        if let Some(description) = track.description.as_deref() {
            meta.set_attr(attr::DESCRIPTION, description);
        }
        if let Some(artwork) = track.artwork_url.as_deref().filter(|a| !a.is_empty()) {
            meta.set_attr(attr::THUMBNAIL_URL, artwork);
        }
        if let Some(genre) = track.genre.as_deref() {
            meta.set_attr("genre", genre);
        }
        if let Some(millis) = track.duration {
            meta.set_attr("duration", iso8601_duration(millis));
        }
        if let Some(created) = track.created_at.as_deref().and_then(parse_created_at) {
            meta.set_attr("datePublished", created);
        }
        meta.set_attr("statistics", track.statistics());

        Ok(Some(meta))
    }
}
