//! Domain payload shapes returned to callers.

use serde::{Deserialize, Serialize};

/// Metadata for a single video, normalized from the upstream shape.
///
/// Only the identifier is mandatory at mapping time; everything else
/// falls back to an empty or absent value so that one sparse upstream
/// item cannot fail a whole response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMeta {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub embeddable: bool,
}

/// One page of search or shorts results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    pub items: Vec<VideoMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Payload half of a cache entry and the body of every success response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainPayload {
    Video(VideoMeta),
    Page(VideoPage),
}

/// Success envelope: the payload plus cache metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    #[serde(flatten)]
    pub payload: DomainPayload,
    pub cached: bool,
    pub ttl_seconds: u64,
}
