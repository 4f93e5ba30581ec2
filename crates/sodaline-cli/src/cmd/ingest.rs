//! Ingest subcommand - run the checkpointed ingestion job

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use sodaline_core::{RateLimiter, SharedProgress, fmt_num, install_signal_handlers};
use sodaline_ingest::{CatalogClient, IngestConfig};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Selection list (TOML)
    #[arg(short, long)]
    pub selection: Option<PathBuf>,

    /// Output directory for dataset artifacts
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for checkpoint files
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Checkpoint job name
    #[arg(long)]
    pub job_name: Option<String>,

    /// Rows per page request
    #[arg(long)]
    pub page_limit: Option<usize>,

    /// Max datasets to process this run (for testing)
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Catalog base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

pub fn run(args: IngestArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    install_signal_handlers();

    let ingest_config = IngestConfig {
        base_url: args
            .base_url
            .unwrap_or_else(|| config.catalog.base_url.clone()),
        output_dir: args.output.unwrap_or_else(|| config.output.dir.clone()),
        state_dir: args.state_dir.unwrap_or_else(|| config.state.dir.clone()),
        selection_path: args
            .selection
            .unwrap_or_else(|| config.ingest.selection.clone()),
        job_name: args
            .job_name
            .unwrap_or_else(|| config.ingest.job_name.clone()),
        page_limit: args.page_limit.unwrap_or(config.ingest.page_limit),
        rate_calls: config.rate.calls,
        rate_window: Duration::from_secs(config.rate.window_secs),
        request_timeout: Duration::from_secs(config.catalog.timeout_secs),
        max_datasets: args.limit,
    };

    log::info!("Ingesting from {}", ingest_config.base_url);
    log::info!("  Selection: {}", ingest_config.selection_path.display());
    log::info!("  Output: {}", ingest_config.output_dir.display());
    log::info!("  Job: {}", ingest_config.job_name);

    let limiter = Arc::new(RateLimiter::new(
        ingest_config.rate_calls,
        ingest_config.rate_window,
    ));
    let client = CatalogClient::new(
        ingest_config.base_url.clone(),
        limiter,
        ingest_config.request_timeout,
    );

    let summary = sodaline_ingest::run(&client, &ingest_config, progress)?;

    super::print_summary(
        "Ingest",
        &[
            (
                "Datasets",
                format!(
                    "{}/{} fetched ({} streamed, {} already done)",
                    summary.fetched, summary.selected, summary.streamed, summary.already_done
                ),
            ),
            (
                "Skipped",
                format!(
                    "{} missing, {} empty",
                    summary.skipped_missing, summary.skipped_empty
                ),
            ),
            ("Rows", fmt_num(summary.total_rows)),
            ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ],
    );

    if summary.interrupted {
        anyhow::bail!("interrupted before completion; re-run to resume");
    }
    Ok(())
}
