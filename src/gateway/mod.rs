//! Request orchestration: rate limit, credential, validation, cache,
//! upstream fetch.
//!
//! One `Gateway` instance serves all three endpoints, parameterized by
//! the endpoint profiles in config. The transition order is fixed:
//! rate limit first, then credential presence, then validation, then
//! cache, then the upstream call. No upstream call is ever attempted
//! for a request that is already rejected.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::ResponseCache;
use crate::config::{EndpointProfile, GatewayConfig};
use crate::error::{Result, VidgateError};
use crate::provider::youtube::YoutubeProvider;
use crate::provider::MetadataProvider;
use crate::ratelimit::{FixedWindowLimiter, RateDecision};
use crate::types::{DomainPayload, GatewayResponse};
use crate::validate;

/// Ceiling on the shared-cache lifetime advertised downstream.
const SMAXAGE_CEILING: u64 = 300;
/// Ceiling on the stale-while-revalidate window advertised downstream.
const STALE_CEILING: u64 = 600;

/// Value for the cache-status response header.
pub fn cache_status(cached: bool) -> &'static str {
    if cached {
        "HIT"
    } else {
        "MISS"
    }
}

/// Caching directive computed from the effective TTL.
///
/// Both windows are capped: shared caches hold a response for at most
/// five minutes and may serve it stale for at most ten, whatever the
/// entry TTL says.
pub fn cache_control(ttl_secs: u64) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        ttl_secs.min(SMAXAGE_CEILING),
        ttl_secs.min(STALE_CEILING)
    )
}

/// The gateway: shared state plus one handler per endpoint.
pub struct Gateway {
    config: GatewayConfig,
    provider: Arc<dyn MetadataProvider>,
    limiter: FixedWindowLimiter,
    lookup_cache: ResponseCache,
    search_cache: ResponseCache,
    shorts_cache: ResponseCache,
}

impl Gateway {
    pub fn new(config: GatewayConfig, provider: Arc<dyn MetadataProvider>) -> Self {
        let lookup_cache = ResponseCache::new(config.lookup.max_entries);
        let search_cache = ResponseCache::new(config.search.max_entries);
        let shorts_cache = ResponseCache::new(config.shorts.max_entries);
        Self {
            config,
            provider,
            limiter: FixedWindowLimiter::new(),
            lookup_cache,
            search_cache,
            shorts_cache,
        }
    }

    /// Build a gateway backed by the real upstream API.
    pub fn from_config(config: GatewayConfig) -> Self {
        let provider = Arc::new(YoutubeProvider::new(&config));
        Self::new(config, provider)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Single-video lookup by id or URL.
    pub async fn lookup(
        &self,
        client_id: &str,
        video_id: Option<&str>,
        url: Option<&str>,
    ) -> Result<GatewayResponse> {
        let profile = &self.config.lookup;
        self.guard(profile, client_id)?;
        let request = validate::parse_lookup(video_id, url)?;
        let key = request.cache_key(profile.namespace);
        self.serve(
            &self.lookup_cache,
            profile,
            key,
            self.provider.lookup(&request),
        )
        .await
    }

    /// Keyword search.
    pub async fn search(
        &self,
        client_id: &str,
        q: Option<&str>,
        limit: Option<&str>,
        page_token: Option<&str>,
        order: Option<&str>,
    ) -> Result<GatewayResponse> {
        let profile = &self.config.search;
        self.guard(profile, client_id)?;
        let request = validate::parse_search(q, limit, page_token, order)?;
        let key = request.cache_key(profile.namespace, &self.config.region);
        self.serve(
            &self.search_cache,
            profile,
            key,
            self.provider.search(&request),
        )
        .await
    }

    /// Short-form search.
    pub async fn shorts(
        &self,
        client_id: &str,
        q: Option<&str>,
        limit: Option<&str>,
    ) -> Result<GatewayResponse> {
        let profile = &self.config.shorts;
        self.guard(profile, client_id)?;
        let request = validate::parse_shorts(q, limit)?;
        let key = request.cache_key(profile.namespace, &self.config.region);
        self.serve(
            &self.shorts_cache,
            profile,
            key,
            self.provider.shorts(&request),
        )
        .await
    }

    /// Test hook: drop all cached entries and rate-limit counters.
    pub fn reset(&self) {
        self.lookup_cache.clear();
        self.search_cache.clear();
        self.shorts_cache.clear();
        self.limiter.reset();
    }

    /// Front half shared by every endpoint. Quota is charged here, so
    /// a request that later fails validation still consumed its slot.
    fn guard(&self, profile: &EndpointProfile, client_id: &str) -> Result<()> {
        match self.limiter.check(
            profile.namespace,
            client_id,
            profile.minute_limit,
            profile.day_limit,
        ) {
            RateDecision::Allowed => {}
            RateDecision::Limited { retry_after_secs } => {
                debug!(
                    namespace = profile.namespace,
                    client_id, retry_after_secs, "rate limited"
                );
                return Err(VidgateError::RateLimited { retry_after_secs });
            }
        }
        if !self.config.has_credential() {
            return Err(VidgateError::MissingCredential);
        }
        Ok(())
    }

    /// Back half shared by every endpoint: cache lookup, then fetch,
    /// then cache write and prune.
    ///
    /// `fetch` is lazy; on a cache hit it is dropped without ever
    /// touching the network.
    async fn serve<F>(
        &self,
        cache: &ResponseCache,
        profile: &EndpointProfile,
        key: String,
        fetch: F,
    ) -> Result<GatewayResponse>
    where
        F: Future<Output = Result<DomainPayload>>,
    {
        if let Some(hit) = cache.get(&key) {
            debug!(cache_key = %key, "cache hit");
            return Ok(GatewayResponse {
                payload: hit,
                cached: true,
                ttl_seconds: profile.ttl_secs,
            });
        }

        debug!(cache_key = %key, "cache miss");
        let payload = fetch.await?;
        cache.put(
            key,
            payload.clone(),
            Duration::from_secs(profile.ttl_secs),
        );
        cache.prune();
        Ok(GatewayResponse {
            payload,
            cached: false,
            ttl_seconds: profile.ttl_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::types::{LookupRequest, SearchRequest, ShortsRequest, VideoMeta, VideoPage};

    struct StubProvider {
        lookup_calls: AtomicUsize,
        search_calls: AtomicUsize,
        fail_lookup: bool,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                lookup_calls: AtomicUsize::new(0),
                search_calls: AtomicUsize::new(0),
                fail_lookup: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_lookup: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl MetadataProvider for StubProvider {
        async fn lookup(&self, request: &LookupRequest) -> Result<DomainPayload> {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_lookup {
                return Err(VidgateError::UpstreamStatus(500));
            }
            Ok(DomainPayload::Video(VideoMeta {
                video_id: request.video_id.clone(),
                title: "stub".into(),
                channel_title: "stub channel".into(),
                thumbnail_url: None,
                published_at: None,
                embeddable: true,
            }))
        }

        async fn search(&self, _request: &SearchRequest) -> Result<DomainPayload> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(DomainPayload::Page(VideoPage {
                items: Vec::new(),
                next_page_token: None,
            }))
        }

        async fn shorts(&self, _request: &ShortsRequest) -> Result<DomainPayload> {
            Ok(DomainPayload::Page(VideoPage {
                items: Vec::new(),
                next_page_token: None,
            }))
        }
    }

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            api_key: Some("test-key".into()),
            ..GatewayConfig::default()
        }
    }

    fn gateway_with(provider: StubProvider) -> (Gateway, Arc<StubProvider>) {
        let provider = Arc::new(provider);
        let gateway = Gateway::new(test_config(), provider.clone());
        (gateway, provider)
    }

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let (gateway, provider) = gateway_with(StubProvider::new());

        let first = gateway
            .lookup("1.2.3.4", Some("dQw4w9WgXcQ"), None)
            .await
            .unwrap();
        assert!(!first.cached);

        let second = gateway
            .lookup("1.2.3.4", Some("dQw4w9WgXcQ"), None)
            .await
            .unwrap();
        assert!(second.cached);
        assert_eq!(second.ttl_seconds, first.ttl_seconds);
        assert_eq!(provider.lookup_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_refetched() {
        let mut config = test_config();
        config.lookup.ttl_secs = 60;
        let provider = Arc::new(StubProvider::new());
        let gateway = Gateway::new(config, provider.clone());

        gateway
            .lookup("1.2.3.4", Some("dQw4w9WgXcQ"), None)
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;

        let reply = gateway
            .lookup("1.2.3.4", Some("dQw4w9WgXcQ"), None)
            .await
            .unwrap();
        assert!(!reply.cached, "entry past its TTL reads as a miss");
        assert_eq!(provider.lookup_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rate_limit_is_checked_before_validation() {
        let mut config = test_config();
        config.lookup.minute_limit = 1;
        let provider = Arc::new(StubProvider::new());
        let gateway = Gateway::new(config, provider.clone());

        gateway
            .lookup("1.2.3.4", Some("dQw4w9WgXcQ"), None)
            .await
            .unwrap();

        // Invalid parameters, but the limiter fires first.
        let err = gateway.lookup("1.2.3.4", Some("bogus"), None).await.unwrap_err();
        assert!(matches!(err, VidgateError::RateLimited { .. }));
        assert_eq!(provider.lookup_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_credential_precedes_validation() {
        let mut config = test_config();
        config.api_key = None;
        let gateway = Gateway::new(config, Arc::new(StubProvider::new()));

        let err = gateway.lookup("1.2.3.4", Some("bogus"), None).await.unwrap_err();
        assert!(matches!(err, VidgateError::MissingCredential));
    }

    #[tokio::test]
    async fn upstream_failure_is_not_cached() {
        let (gateway, provider) = gateway_with(StubProvider::failing());

        for _ in 0..2 {
            let err = gateway
                .lookup("1.2.3.4", Some("dQw4w9WgXcQ"), None)
                .await
                .unwrap_err();
            assert!(matches!(err, VidgateError::UpstreamStatus(500)));
        }
        assert_eq!(provider.lookup_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn case_insensitive_queries_share_a_cache_entry() {
        let (gateway, provider) = gateway_with(StubProvider::new());

        let first = gateway
            .search("1.2.3.4", Some("Rust Tutorials"), None, None, None)
            .await
            .unwrap();
        assert!(!first.cached);
        let second = gateway
            .search("1.2.3.4", Some("rust tutorials"), None, None, None)
            .await
            .unwrap();
        assert!(second.cached);
        assert_eq!(provider.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reset_clears_cache_and_quota() {
        let mut config = test_config();
        config.lookup.minute_limit = 1;
        let provider = Arc::new(StubProvider::new());
        let gateway = Gateway::new(config, provider.clone());

        gateway
            .lookup("1.2.3.4", Some("dQw4w9WgXcQ"), None)
            .await
            .unwrap();
        gateway.reset();

        let reply = gateway
            .lookup("1.2.3.4", Some("dQw4w9WgXcQ"), None)
            .await
            .unwrap();
        assert!(!reply.cached, "cache was cleared");
        assert_eq!(provider.lookup_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cache_directive_is_clamped() {
        assert_eq!(
            cache_control(3600),
            "public, s-maxage=300, stale-while-revalidate=600"
        );
        assert_eq!(
            cache_control(120),
            "public, s-maxage=120, stale-while-revalidate=120"
        );
        assert_eq!(cache_status(true), "HIT");
        assert_eq!(cache_status(false), "MISS");
    }
}
