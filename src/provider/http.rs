//! Shared HTTP client and upstream status classification.

use std::sync::OnceLock;

use crate::error::VidgateError;

/// Length to which an upstream error body is cut for diagnostics.
const SNIPPET_LEN: usize = 160;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// The client-level timeout is a hard ceiling; the per-request bound
/// from config is enforced separately and is always shorter.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Classify a non-success upstream status.
///
/// Quota and auth rejections (403) keep a snippet of the body for
/// operator diagnosis; any other status carries only the code.
pub fn status_to_error(status: u16, body: &str) -> VidgateError {
    match status {
        403 => VidgateError::UpstreamDenied {
            snippet: truncate_snippet(body),
        },
        _ => VidgateError::UpstreamStatus(status),
    }
}

/// Map a transport error. The request URL carries the credential in its
/// query string, so it must be stripped before the error leaves this
/// boundary.
pub fn network_error(err: reqwest::Error) -> VidgateError {
    VidgateError::Network(err.without_url())
}

fn truncate_snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= SNIPPET_LEN {
        return trimmed.to_string();
    }
    let mut cut = SNIPPET_LEN;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    trimmed[..cut].to_string()
}
