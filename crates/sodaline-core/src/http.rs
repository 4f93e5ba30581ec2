//! Sync HTTP facade over a shared async client.
//!
//! Uses async reqwest internally behind `block_on`; callers stay synchronous,
//! matching the strictly sequential fetch model. Pacing is the caller's
//! concern, see [`crate::rate_limit::RateLimiter`].

use std::sync::LazyLock;
use std::time::Duration;

use crate::error::FetchError;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// HTTP GET returning the response body parsed as JSON.
///
/// Sends `Accept: application/json`. `timeout` bounds the whole request and
/// should be generous: a full page of rows can take minutes to produce and
/// transfer. 404 maps to [`FetchError::NotFound`], every other failure
/// (non-2xx, transport, timeout, bad body) to [`FetchError::Remote`].
pub fn get_json(
    url: &str,
    query: &[(&str, String)],
    timeout: Duration,
) -> Result<serde_json::Value, FetchError> {
    let text = SHARED_RUNTIME.handle().block_on(async {
        let resp = SHARED_CLIENT
            .get(url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(&e))?;
        resp.text().await.map_err(|e| FetchError::from_reqwest(&e))
    })?;
    serde_json::from_str(&text).map_err(|e| FetchError::bad_body(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_refused_is_remote_without_status() {
        // Port 9 (discard) is not listening in test environments
        let err = get_json("http://127.0.0.1:9/api/views", &[], Duration::from_secs(2))
            .expect_err("expected connection failure");
        match err {
            FetchError::Remote { status, .. } => assert!(status.is_none()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
