//! Ingestion job configuration

use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for one ingestion job.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Catalog base URL
    pub base_url: String,
    /// Directory for dataset artifacts
    pub output_dir: PathBuf,
    /// Directory for checkpoint files
    pub state_dir: PathBuf,
    /// TOML selection list path
    pub selection_path: PathBuf,
    /// Checkpoint name; distinct jobs resume independently
    pub job_name: String,
    /// Rows per page request
    pub page_limit: usize,
    /// Calls allowed per rate window
    pub rate_calls: usize,
    /// Rate window length
    pub rate_window: Duration,
    /// Per-request timeout; generous because pages can be large
    pub request_timeout: Duration,
    /// Cap on datasets processed this run (testing aid)
    pub max_datasets: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://data.cdc.gov".to_string(),
            output_dir: PathBuf::from("./data"),
            state_dir: PathBuf::from("./state"),
            selection_path: PathBuf::from("selection.toml"),
            job_name: "raw-data".to_string(),
            page_limit: 50_000,
            rate_calls: 5,
            rate_window: Duration::from_secs(1),
            request_timeout: Duration::from_secs(120),
            max_datasets: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_catalog_conventions() {
        let config = IngestConfig::default();
        assert_eq!(config.page_limit, 50_000);
        assert_eq!(config.rate_calls, 5);
        assert_eq!(config.rate_window, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.max_datasets.is_none());
    }
}
