//! Request parsing and validation.
//!
//! Everything here is pure: raw query parameters go in, a typed request
//! or an `InvalidRequest` error comes out. Out-of-range input is
//! rejected, never coerced, which is the opposite of how operator
//! config is handled (see the config module).

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::{Result, VidgateError};
use crate::types::{LookupRequest, SearchOrder, SearchRequest, ShortsRequest};

/// Default result count for keyword search.
pub const SEARCH_DEFAULT_LIMIT: u8 = 8;
/// Maximum result count for keyword search.
pub const SEARCH_MAX_LIMIT: u8 = 12;
/// Default result count for shorts search.
pub const SHORTS_DEFAULT_LIMIT: u8 = 12;
/// Maximum result count for shorts search.
pub const SHORTS_MAX_LIMIT: u8 = 24;
/// Maximum free-text query length for keyword search.
pub const SEARCH_MAX_QUERY_LEN: usize = 120;
/// Maximum free-text query length for shorts search.
pub const SHORTS_MAX_QUERY_LEN: usize = 180;

const MAX_PAGE_TOKEN_LEN: usize = 240;

/// Hosts the URL extractor recognizes, besides the short-link host.
const WATCH_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "www.youtube-nocookie.com",
];

fn video_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid pattern"))
}

fn page_token_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9=_-]+$").expect("valid pattern"))
}

fn bad_request(message: impl Into<String>) -> VidgateError {
    VidgateError::InvalidRequest(message.into())
}

/// Parse single-video lookup parameters.
///
/// `videoId` takes precedence over `url` when both are present; a
/// present-but-invalid `videoId` is an error, not a fallthrough.
pub fn parse_lookup(video_id: Option<&str>, url: Option<&str>) -> Result<LookupRequest> {
    if let Some(id) = video_id.map(str::trim).filter(|id| !id.is_empty()) {
        if !video_id_pattern().is_match(id) {
            return Err(bad_request(r#""videoId" must be an 11-character video id"#));
        }
        return Ok(LookupRequest {
            video_id: id.to_string(),
        });
    }
    if let Some(raw) = url.map(str::trim).filter(|u| !u.is_empty()) {
        let id = extract_video_id(raw)
            .ok_or_else(|| bad_request(r#""url" is not a recognized video URL"#))?;
        return Ok(LookupRequest { video_id: id });
    }
    Err(bad_request(r#"either "videoId" or "url" is required"#))
}

/// Parse keyword-search parameters.
pub fn parse_search(
    q: Option<&str>,
    limit: Option<&str>,
    page_token: Option<&str>,
    order: Option<&str>,
) -> Result<SearchRequest> {
    Ok(SearchRequest {
        query: parse_query(q, SEARCH_MAX_QUERY_LEN)?,
        limit: parse_limit(limit, SEARCH_DEFAULT_LIMIT, SEARCH_MAX_LIMIT)?,
        page_token: parse_page_token(page_token)?,
        order: parse_order(order)?,
    })
}

/// Parse shorts-search parameters.
pub fn parse_shorts(q: Option<&str>, limit: Option<&str>) -> Result<ShortsRequest> {
    Ok(ShortsRequest {
        query: parse_query(q, SHORTS_MAX_QUERY_LEN)?,
        limit: parse_limit(limit, SHORTS_DEFAULT_LIMIT, SHORTS_MAX_LIMIT)?,
    })
}

/// Extract a video id from a platform URL, or `None` if the URL does
/// not carry one in a recognized position.
fn extract_video_id(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    let candidate = if host == "youtu.be" {
        first_path_segment(&parsed)
    } else if WATCH_HOSTS.contains(&host.as_str()) {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .or_else(|| embedded_path_id(&parsed))
    } else {
        None
    }?;

    video_id_pattern()
        .is_match(&candidate)
        .then_some(candidate)
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Id embedded in a path like `/embed/<id>`, `/shorts/<id>`, `/live/<id>`
/// or the legacy `/v/<id>`.
fn embedded_path_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty());
    let head = segments.next()?;
    if matches!(head, "embed" | "shorts" | "live" | "v") {
        segments.next().map(str::to_string)
    } else {
        None
    }
}

/// Trim and collapse internal whitespace, then enforce the length cap.
fn parse_query(raw: Option<&str>, max_len: usize) -> Result<String> {
    let collapsed = raw
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    if collapsed.is_empty() {
        return Err(bad_request(r#""q" is required"#));
    }
    if collapsed.chars().count() > max_len {
        return Err(bad_request(format!(
            r#""q" must be at most {max_len} characters"#
        )));
    }
    Ok(collapsed)
}

/// Parse the result-count limit. Missing or empty means the endpoint
/// default; anything that is not an integer in `[1, max]` is a hard
/// error.
fn parse_limit(raw: Option<&str>, default: u8, max: u8) -> Result<u8> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(default);
    };
    match text.parse::<i64>() {
        Ok(n) if n >= 1 && n <= i64::from(max) => Ok(n as u8),
        _ => Err(bad_request(format!(
            r#""limit" must be between 1 and {max}"#
        ))),
    }
}

fn parse_page_token(raw: Option<&str>) -> Result<Option<String>> {
    let Some(token) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if token.len() > MAX_PAGE_TOKEN_LEN || !page_token_pattern().is_match(token) {
        return Err(bad_request(r#""pageToken" is not a valid continuation token"#));
    }
    Ok(Some(token.to_string()))
}

fn parse_order(raw: Option<&str>) -> Result<SearchOrder> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(SearchOrder::default());
    };
    SearchOrder::from_str(text).map_err(|_| {
        bad_request(r#""order" must be one of relevance, date, rating, title, viewCount"#)
    })
}
