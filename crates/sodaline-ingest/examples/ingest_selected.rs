//! Selected-dataset ingestion example
//!
//! Run with: cargo run -p sodaline-ingest --example ingest_selected -- [selection.toml]

use std::sync::Arc;

use sodaline_core::{ProgressContext, RateLimiter, init_logging, install_signal_handlers};
use sodaline_ingest::{CatalogClient, IngestConfig, run};

fn main() -> anyhow::Result<()> {
    let selection = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "selection.toml".to_string());

    let progress = Arc::new(ProgressContext::new());
    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    init_logging(false, false, multi);
    install_signal_handlers();

    let config = IngestConfig {
        selection_path: selection.into(),
        ..IngestConfig::default()
    };
    let limiter = Arc::new(RateLimiter::new(config.rate_calls, config.rate_window));
    let client = CatalogClient::new(config.base_url.clone(), limiter, config.request_timeout);

    let summary = run(&client, &config, &progress)?;
    eprintln!(
        "fetched {} datasets, {} rows ({} skipped)",
        summary.fetched,
        summary.total_rows,
        summary.skipped_missing + summary.skipped_empty
    );
    Ok(())
}
