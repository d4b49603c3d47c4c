//! Convenience re-exports for common use.

pub use crate::cache::ResponseCache;
pub use crate::config::{EndpointProfile, GatewayConfig};
pub use crate::error::{Result, VidgateError};
pub use crate::gateway::Gateway;
pub use crate::provider::MetadataProvider;
pub use crate::ratelimit::{FixedWindowLimiter, RateDecision};
pub use crate::types::{
    DomainPayload, GatewayResponse, LookupRequest, SearchOrder, SearchRequest, ShortsRequest,
    VideoMeta, VideoPage,
};
