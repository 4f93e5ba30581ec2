//! Catalog subcommand - fetch and save the dataset listing

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use serde_json::Value;
use sodaline_core::{RateLimiter, SharedProgress, fmt_num, write_document};
use sodaline_ingest::{CatalogApi, CatalogClient};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the first N catalog entries as a table
    #[arg(long)]
    pub show: Option<usize>,

    /// Catalog base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

pub fn run(args: CatalogArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let base_url = args
        .base_url
        .unwrap_or_else(|| config.catalog.base_url.clone());
    let limiter = Arc::new(RateLimiter::new(
        config.rate.calls,
        Duration::from_secs(config.rate.window_secs),
    ));
    let client = CatalogClient::new(
        base_url.clone(),
        limiter,
        Duration::from_secs(config.catalog.timeout_secs),
    );

    log::info!("Fetching dataset catalogue from {base_url}");
    let listing = client.list_catalog().context("catalog listing failed")?;
    log::info!("Found {} datasets", fmt_num(listing.len()));

    let output_dir = args.output.unwrap_or_else(|| config.output.dir.clone());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("cannot create output dir {}", output_dir.display()))?;
    let path = output_dir.join("catalog.json.gz");
    write_document(&path, &listing)
        .with_context(|| format!("cannot write {}", path.display()))?;
    progress.println(format!(
        "Saved {} catalog entries to {}",
        fmt_num(listing.len()),
        path.display()
    ));

    if let Some(n) = args.show {
        print_entries(&listing, n);
    }
    Ok(())
}

fn print_entries(listing: &[Value], n: usize) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Id").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
        ]);
    for entry in listing.iter().take(n) {
        let id = entry.get("id").and_then(Value::as_str).unwrap_or("?");
        let name = entry.get("name").and_then(Value::as_str).unwrap_or("?");
        let name: String = name.chars().take(60).collect();
        table.add_row(vec![id.to_string(), name]);
    }
    eprintln!("\n{table}");
}
