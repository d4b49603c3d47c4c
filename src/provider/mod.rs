//! Upstream metadata provider trait and implementations.

pub mod http;
pub mod youtube;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DomainPayload, LookupRequest, SearchRequest, ShortsRequest};

/// Core trait implemented by upstream metadata providers.
///
/// Each method issues at most one outbound call, bounded by the
/// configured timeout. The gateway never invokes a provider when the
/// cache already holds a live entry.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch metadata for a single video. Zero matching items is a
    /// `NotFound` error, not an empty success.
    async fn lookup(&self, request: &LookupRequest) -> Result<DomainPayload>;

    /// Fetch one page of keyword-search results. An empty page is a
    /// valid outcome.
    async fn search(&self, request: &SearchRequest) -> Result<DomainPayload>;

    /// Fetch one page of short-form results.
    async fn shorts(&self, request: &ShortsRequest) -> Result<DomainPayload>;
}
