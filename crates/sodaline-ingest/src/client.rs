//! Catalog API client

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use sodaline_core::{FetchError, RateLimiter, get_json};

/// Interface to the catalog consumed by the fetcher and the job.
///
/// HTTP-backed in production ([`CatalogClient`]); tests substitute an
/// in-memory implementation.
pub trait CatalogApi {
    /// Fetch the full dataset catalog in one call.
    fn list_catalog(&self) -> Result<Vec<Value>, FetchError>;

    /// Fetch per-dataset metadata (name, estimated row count, ...).
    fn get_metadata(&self, dataset_id: &str) -> Result<Value, FetchError>;

    /// Fetch one page of rows at `offset`.
    fn get_page(
        &self,
        dataset_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Value>, FetchError>;
}

/// HTTP client for the Socrata-style catalog API.
///
/// Every request passes through the shared [`RateLimiter`] before touching
/// the network. Requests carry a generous timeout (pages can be large).
/// No automatic retries here; retry policy belongs to the operator, who
/// re-runs the job.
pub struct CatalogClient {
    base_url: String,
    limiter: Arc<RateLimiter>,
    timeout: Duration,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, limiter: Arc<RateLimiter>, timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            limiter,
            timeout,
        }
    }

    fn catalog_url(&self) -> String {
        format!("{}/api/views", self.base_url)
    }

    fn metadata_url(&self, dataset_id: &str) -> String {
        format!("{}/api/views/{dataset_id}.json", self.base_url)
    }

    fn page_url(&self, dataset_id: &str) -> String {
        format!("{}/resource/{dataset_id}.json", self.base_url)
    }
}

/// Reject a non-array body for endpoints that must return row arrays.
fn expect_array(value: Value) -> Result<Vec<Value>, FetchError> {
    match value {
        Value::Array(rows) => Ok(rows),
        other => Err(FetchError::Remote {
            status: None,
            message: format!("expected JSON array, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl CatalogApi for CatalogClient {
    fn list_catalog(&self) -> Result<Vec<Value>, FetchError> {
        self.limiter.acquire();
        expect_array(get_json(&self.catalog_url(), &[], self.timeout)?)
    }

    fn get_metadata(&self, dataset_id: &str) -> Result<Value, FetchError> {
        self.limiter.acquire();
        get_json(&self.metadata_url(dataset_id), &[], self.timeout)
    }

    fn get_page(
        &self,
        dataset_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Value>, FetchError> {
        self.limiter.acquire();
        let query = [
            ("$limit", limit.to_string()),
            ("$offset", offset.to_string()),
        ];
        expect_array(get_json(&self.page_url(dataset_id), &query, self.timeout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> CatalogClient {
        CatalogClient::new(
            base,
            Arc::new(RateLimiter::new(5, Duration::from_secs(1))),
            Duration::from_secs(120),
        )
    }

    #[test]
    fn urls_are_built_from_base() {
        let c = client("https://data.example.gov");
        assert_eq!(c.catalog_url(), "https://data.example.gov/api/views");
        assert_eq!(
            c.metadata_url("vbim-akqf"),
            "https://data.example.gov/api/views/vbim-akqf.json"
        );
        assert_eq!(
            c.page_url("vbim-akqf"),
            "https://data.example.gov/resource/vbim-akqf.json"
        );
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let c = client("https://data.example.gov//");
        assert_eq!(c.catalog_url(), "https://data.example.gov/api/views");
    }

    #[test]
    fn expect_array_accepts_array() {
        let rows = expect_array(json!([{"a": 1}, {"a": 2}])).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn expect_array_rejects_object() {
        let err = expect_array(json!({"error": true})).unwrap_err();
        match err {
            FetchError::Remote { status, message } => {
                assert!(status.is_none());
                assert!(message.contains("object"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
