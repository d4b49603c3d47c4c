//! vidgate: a quota-protecting metadata gateway for the YouTube Data API.
//!
//! Fronts the YouTube Data API v3 with request validation, per-client
//! fixed-window rate limits, and insertion-ordered TTL response caches,
//! so that browsing traffic cannot burn through the daily upstream quota.
//!
//! # Quick Start
//!
//! ```no_run
//! use vidgate::config::GatewayConfig;
//! use vidgate::gateway::Gateway;
//!
//! # async fn example() -> vidgate::error::Result<()> {
//! let gateway = Gateway::from_config(GatewayConfig::from_env());
//! let reply = gateway
//!     .lookup("203.0.113.9", Some("dQw4w9WgXcQ"), None)
//!     .await?;
//! println!("served from cache: {}", reply.cached);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod prelude;
pub mod provider;
pub mod ratelimit;
pub mod types;
pub mod util;
pub mod validate;

#[cfg(feature = "server")]
pub mod server;
