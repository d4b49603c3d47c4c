//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::{Result, VidgateError};

/// Wrap a future with a timeout.
///
/// On expiry the inner future is dropped, which aborts any in-flight
/// request it holds, and the failure is classified as an upstream
/// timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(VidgateError::UpstreamTimeout(duration.as_secs())),
    }
}
