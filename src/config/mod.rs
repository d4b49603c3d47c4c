//! Configuration from environment variables.
//!
//! Numeric values are parsed defensively: a missing or non-numeric
//! value falls back to its default, and out-of-range values are clamped
//! rather than rejected. Operator configuration degrades gracefully;
//! only request input fails loudly (see the validate module).

use std::net::SocketAddr;

/// Tuning for one endpoint instantiation: cache bounds and quota limits.
#[derive(Debug, Clone)]
pub struct EndpointProfile {
    /// Namespace for cache keys and rate-limit counters.
    pub namespace: &'static str,
    /// TTL applied to entries at insertion time.
    pub ttl_secs: u64,
    /// Maximum live cache entries.
    pub max_entries: usize,
    /// Per-client requests allowed per minute.
    pub minute_limit: u32,
    /// Per-client requests allowed per day.
    pub day_limit: u32,
}

/// Gateway configuration for all three endpoints.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Server-held upstream credential. Absence is surfaced per request
    /// as a 503, not at startup.
    pub api_key: Option<String>,
    /// Region code forwarded to search calls and mixed into cache keys.
    pub region: String,
    /// Bound on each upstream call.
    pub upstream_timeout_secs: u64,
    /// Listen address for the HTTP server.
    pub bind: SocketAddr,
    pub lookup: EndpointProfile,
    pub search: EndpointProfile,
    pub shorts: EndpointProfile,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            region: "US".to_string(),
            upstream_timeout_secs: 8,
            bind: default_bind(),
            lookup: EndpointProfile {
                namespace: "video",
                ttl_secs: 3600,
                max_entries: 300,
                minute_limit: 30,
                day_limit: 2000,
            },
            search: EndpointProfile {
                namespace: "search",
                ttl_secs: 600,
                max_entries: 120,
                minute_limit: 10,
                day_limit: 600,
            },
            shorts: EndpointProfile {
                namespace: "shorts",
                ttl_secs: 900,
                max_entries: 150,
                minute_limit: 10,
                day_limit: 600,
            },
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8750))
}

impl GatewayConfig {
    /// Load from environment variables, starting from the defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();

        config.api_key = std::env::var("YOUTUBE_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        config.region = parse_region(std::env::var("VIDGATE_REGION").ok());
        config.upstream_timeout_secs = env_bounded("VIDGATE_UPSTREAM_TIMEOUT_SECS", 8, 1, 30);
        config.bind = parse_bind(std::env::var("VIDGATE_BIND").ok());

        config.lookup.ttl_secs = env_bounded("VIDGATE_LOOKUP_TTL_SECS", 3600, 60, 86_400);
        config.search.ttl_secs = env_bounded("VIDGATE_SEARCH_TTL_SECS", 600, 60, 21_600);
        config.shorts.ttl_secs = env_bounded("VIDGATE_SHORTS_TTL_SECS", 900, 60, 21_600);

        config.lookup.minute_limit = env_bounded("VIDGATE_LOOKUP_RPM", 30, 1, 600) as u32;
        config.lookup.day_limit = env_bounded("VIDGATE_LOOKUP_RPD", 2000, 1, 100_000) as u32;
        config.search.minute_limit = env_bounded("VIDGATE_SEARCH_RPM", 10, 1, 600) as u32;
        config.search.day_limit = env_bounded("VIDGATE_SEARCH_RPD", 600, 1, 100_000) as u32;
        config.shorts.minute_limit = env_bounded("VIDGATE_SHORTS_RPM", 10, 1, 600) as u32;
        config.shorts.day_limit = env_bounded("VIDGATE_SHORTS_RPD", 600, 1, 100_000) as u32;

        config
    }

    /// Whether the upstream credential is present.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Parse a numeric env var with a default and a clamp range.
fn env_bounded(name: &str, default: u64, min: u64, max: u64) -> u64 {
    parse_bounded(std::env::var(name).ok(), name, default, min, max)
}

fn parse_bounded(raw: Option<String>, name: &str, default: u64, min: u64, max: u64) -> u64 {
    match raw {
        Some(text) => match text.trim().parse::<u64>() {
            Ok(value) => value.clamp(min, max),
            Err(_) => {
                tracing::warn!(var = name, value = %text, "non-numeric config value, using default");
                default
            }
        },
        None => default,
    }
}

/// Uppercased two-letter region code; anything else means the default.
fn parse_region(raw: Option<String>) -> String {
    match raw.map(|r| r.trim().to_ascii_uppercase()) {
        Some(region)
            if region.len() == 2 && region.bytes().all(|b| b.is_ascii_uppercase()) =>
        {
            region
        }
        _ => "US".to_string(),
    }
}

fn parse_bind(raw: Option<String>) -> SocketAddr {
    match raw.and_then(|text| text.trim().parse().ok()) {
        Some(addr) => addr,
        None => default_bind(),
    }
}
