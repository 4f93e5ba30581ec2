//! sodaline - bulk open-data catalog ingester
//!
//! Pulls selected datasets from a Socrata-style catalog into compressed
//! local artifacts, with strict client-side rate limiting and crash-safe
//! checkpointed resume.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "sodaline")]
#[command(about = "Bulk open-data catalog ingester")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./sodaline.toml or ~/.config/sodaline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest selected datasets into local artifacts
    Ingest(cmd::ingest::IngestArgs),
    /// Fetch and save the dataset catalog listing
    Catalog(cmd::catalog::CatalogArgs),
    /// Inspect or clear checkpoint state
    State(cmd::state::StateArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(sodaline_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug; progress bars show activity
    //   non-TTY: info unless --debug; logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    sodaline_core::init_logging(quiet, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Ingest(args) => cmd::ingest::run(args, &config, &progress),
        Command::Catalog(args) => cmd::catalog::run(args, &config, &progress),
        Command::State(args) => cmd::state::run(args, &config),
        Command::Config => {
            cmd::print_summary(
                "Setting",
                &[
                    ("Catalog URL", config.catalog.base_url.clone()),
                    ("Request timeout", format!("{}s", config.catalog.timeout_secs)),
                    ("Page limit", config.ingest.page_limit.to_string()),
                    ("Selection file", config.ingest.selection.display().to_string()),
                    ("Job name", config.ingest.job_name.clone()),
                    ("Output directory", config.output.dir.display().to_string()),
                    ("State directory", config.state.dir.display().to_string()),
                    (
                        "Rate limit",
                        format!("{} calls / {}s", config.rate.calls, config.rate.window_secs),
                    ),
                ],
            );
            Ok(())
        }
    }
}
