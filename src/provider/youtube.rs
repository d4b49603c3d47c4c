//! YouTube Data API v3 provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::{Result, VidgateError};
use crate::types::{
    DomainPayload, LookupRequest, SearchRequest, ShortsRequest, VideoMeta, VideoPage,
};
use crate::util::timeout::with_timeout;

use super::http::{network_error, shared_client, status_to_error};
use super::MetadataProvider;

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Suffix appended to shorts queries; together with the duration filter
/// it biases results toward actual shorts.
const SHORTS_QUERY_SUFFIX: &str = " #shorts";

pub struct YoutubeProvider {
    base_url: String,
    api_key: Option<String>,
    region: String,
    timeout: Duration,
}

impl YoutubeProvider {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key: config.api_key.clone(),
            region: config.region.clone(),
            timeout: Duration::from_secs(config.upstream_timeout_secs),
        }
    }

    /// Override the API base URL (tests point this at a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_video(&self, request: &LookupRequest) -> Result<DomainPayload> {
        let key = self.api_key.as_deref().ok_or(VidgateError::MissingCredential)?;
        let url = format!("{}/videos", self.base_url);

        debug!(video_id = %request.video_id, "videos.list");

        let response = shared_client()
            .get(&url)
            .query(&[
                ("part", "snippet,status"),
                ("id", request.video_id.as_str()),
                ("key", key),
            ])
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let body_text = response.text().await.map_err(network_error)?;
        let data: VideoListResponse = parse_or_empty(&body_text);
        data.items
            .into_iter()
            .filter_map(map_video_item)
            .next()
            .map(DomainPayload::Video)
            .ok_or_else(|| VidgateError::NotFound(request.video_id.clone()))
    }

    async fn fetch_page(&self, extra: Vec<(String, String)>) -> Result<DomainPayload> {
        let key = self.api_key.as_deref().ok_or(VidgateError::MissingCredential)?;
        let url = format!("{}/search", self.base_url);

        let mut query: Vec<(String, String)> = vec![
            ("part".into(), "snippet".into()),
            ("type".into(), "video".into()),
            ("videoEmbeddable".into(), "true".into()),
            ("regionCode".into(), self.region.clone()),
        ];
        query.extend(extra);
        query.push(("key".into(), key.to_string()));

        debug!(region = %self.region, "search.list");

        let response = shared_client()
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let body_text = response.text().await.map_err(network_error)?;
        let data: SearchListResponse = parse_or_empty(&body_text);
        let items: Vec<VideoMeta> = data.items.into_iter().filter_map(map_search_item).collect();
        Ok(DomainPayload::Page(VideoPage {
            items,
            next_page_token: data.next_page_token,
        }))
    }
}

#[async_trait]
impl MetadataProvider for YoutubeProvider {
    async fn lookup(&self, request: &LookupRequest) -> Result<DomainPayload> {
        with_timeout(self.timeout, self.fetch_video(request)).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<DomainPayload> {
        let mut params = vec![
            ("q".to_string(), request.query.clone()),
            ("maxResults".to_string(), request.limit.to_string()),
            ("order".to_string(), request.order.to_string()),
        ];
        if let Some(token) = &request.page_token {
            params.push(("pageToken".to_string(), token.clone()));
        }
        with_timeout(self.timeout, self.fetch_page(params)).await
    }

    async fn shorts(&self, request: &ShortsRequest) -> Result<DomainPayload> {
        let params = vec![
            (
                "q".to_string(),
                format!("{}{SHORTS_QUERY_SUFFIX}", request.query),
            ),
            ("maxResults".to_string(), request.limit.to_string()),
            ("videoDuration".to_string(), "short".to_string()),
        ];
        with_timeout(self.timeout, self.fetch_page(params)).await
    }
}

/// Parse an upstream body, falling back to an empty result set instead
/// of propagating a parse failure.
fn parse_or_empty<T: Default + for<'de> Deserialize<'de>>(body: &str) -> T {
    match serde_json::from_str(body) {
        Ok(data) => data,
        Err(err) => {
            warn!(error = %err, "unparseable upstream body, treating as empty");
            T::default()
        }
    }
}

/// Map an item from `videos.list`, dropping it when the identifier is
/// missing or empty.
fn map_video_item(item: VideoItem) -> Option<VideoMeta> {
    let id = item.id.filter(|id| !id.is_empty())?;
    let snippet = item.snippet.unwrap_or_default();
    Some(VideoMeta {
        video_id: id,
        title: snippet.title.unwrap_or_default(),
        channel_title: snippet.channel_title.unwrap_or_default(),
        thumbnail_url: snippet.thumbnails.and_then(|t| t.medium).and_then(|t| t.url),
        published_at: snippet.published_at,
        embeddable: item.status.and_then(|s| s.embeddable).unwrap_or(false),
    })
}

/// Map an item from `search.list`. Results are pre-filtered to
/// embeddable videos upstream, so the flag is set directly.
fn map_search_item(item: SearchItem) -> Option<VideoMeta> {
    let id = item
        .id
        .and_then(|id| id.video_id)
        .filter(|id| !id.is_empty())?;
    let snippet = item.snippet.unwrap_or_default();
    Some(VideoMeta {
        video_id: id,
        title: snippet.title.unwrap_or_default(),
        channel_title: snippet.channel_title.unwrap_or_default(),
        thumbnail_url: snippet.thumbnails.and_then(|t| t.medium).and_then(|t| t.url),
        published_at: snippet.published_at,
        embeddable: true,
    })
}

// Internal YouTube response types

#[derive(Deserialize, Default)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: Option<String>,
    snippet: Option<Snippet>,
    status: Option<VideoStatus>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    channel_title: Option<String>,
    published_at: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Deserialize, Default)]
struct Thumbnails {
    medium: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: Option<String>,
}

#[derive(Deserialize)]
struct VideoStatus {
    embeddable: Option<bool>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: Option<SearchItemId>,
    snippet: Option<Snippet>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}
