//! HTTP surface: axum router, query decoding, and error mapping.
//!
//! Routes:
//! - `GET /api/video` single-video lookup (`videoId` or `url`)
//! - `GET /api/search` keyword search (`q`, `limit`, `pageToken`, `order`)
//! - `GET /api/shorts` Shorts discovery (`q`, `limit`)
//! - `GET /healthz` liveness probe
//!
//! Query strings are decoded with first-value-wins semantics: when a
//! parameter repeats, only the first occurrence counts. The rate-limit
//! identity is the first `X-Forwarded-For` entry when present, otherwise
//! the peer address.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, RawQuery, State};
use axum::http::header::{self, HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::error::{Result, VidgateError};
use crate::gateway::{cache_control, cache_status, Gateway};
use crate::types::GatewayResponse;

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

impl IntoResponse for VidgateError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        let mut body = json!({ "error": self.to_string() });
        let retry_after = match self {
            VidgateError::RateLimited { retry_after_secs } => Some(retry_after_secs),
            _ => None,
        };
        if let Some(secs) = retry_after {
            body["retryAfterSeconds"] = json!(secs);
        }
        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Build the application router around a shared [`Gateway`].
pub fn router(gateway: Arc<Gateway>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/api/video", get(lookup_handler))
        .route("/api/search", get(search_handler))
        .route("/api/shorts", get(shorts_handler))
        .route("/healthz", get(healthz_handler))
        .layer(cors)
        .with_state(gateway)
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
pub async fn run(gateway: Gateway) -> Result<()> {
    let bind = gateway.config().bind;
    let app = router(Arc::new(gateway));
    let listener = TcpListener::bind(bind).await?;
    info!(%bind, "vidgate listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn lookup_handler(
    State(gateway): State<Arc<Gateway>>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    RawQuery(raw): RawQuery,
) -> Result<Response> {
    let params = first_values(raw.as_deref());
    let client = client_id(&headers, connect_info.map(|info| info.0));
    let reply = gateway
        .lookup(&client, param(&params, "videoId"), param(&params, "url"))
        .await?;
    Ok(success(reply))
}

async fn search_handler(
    State(gateway): State<Arc<Gateway>>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    RawQuery(raw): RawQuery,
) -> Result<Response> {
    let params = first_values(raw.as_deref());
    let client = client_id(&headers, connect_info.map(|info| info.0));
    let reply = gateway
        .search(
            &client,
            param(&params, "q"),
            param(&params, "limit"),
            param(&params, "pageToken"),
            param(&params, "order"),
        )
        .await?;
    Ok(success(reply))
}

async fn shorts_handler(
    State(gateway): State<Arc<Gateway>>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    RawQuery(raw): RawQuery,
) -> Result<Response> {
    let params = first_values(raw.as_deref());
    let client = client_id(&headers, connect_info.map(|info| info.0));
    let reply = gateway
        .shorts(&client, param(&params, "q"), param(&params, "limit"))
        .await?;
    Ok(success(reply))
}

async fn healthz_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn success(reply: GatewayResponse) -> Response {
    let headers = [
        (X_CACHE, cache_status(reply.cached).to_string()),
        (header::CACHE_CONTROL, cache_control(reply.ttl_seconds)),
    ];
    (headers, Json(reply)).into_response()
}

/// Decode a raw query string keeping the first value of each parameter.
fn first_values(raw: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(query) = raw {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
    params
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str)
}

/// Identity used for rate limiting: first `X-Forwarded-For` hop when the
/// header is present, otherwise the socket peer address.
fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
