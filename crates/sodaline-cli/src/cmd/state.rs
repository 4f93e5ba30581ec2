//! State subcommand - inspect or clear checkpoint state

use anyhow::Result;
use clap::{Args, Subcommand};
use sodaline_ingest::CheckpointStore;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct StateArgs {
    #[command(subcommand)]
    pub action: StateAction,

    /// Checkpoint job name
    #[arg(long, global = true)]
    pub job_name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum StateAction {
    /// Show checkpoint contents for a job
    Show,
    /// Remove a job's checkpoint so every dataset is re-fetched
    Clear,
}

pub fn run(args: StateArgs, config: &Config) -> Result<()> {
    let job = args
        .job_name
        .unwrap_or_else(|| config.ingest.job_name.clone());
    let store = CheckpointStore::new(&config.state.dir);

    match args.action {
        StateAction::Show => {
            let state = store.load(&job)?;
            super::print_summary(
                &format!("Job '{job}'"),
                &[
                    ("Checkpoint", store.path(&job).display().to_string()),
                    ("Completed", state.completed.len().to_string()),
                    ("Skipped", state.skipped.len().to_string()),
                    (
                        "Updated",
                        state
                            .updated_at
                            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                            .unwrap_or_else(|| "never".to_string()),
                    ),
                ],
            );
            for id in &state.skipped {
                log::info!("skipped: {id}");
            }
            Ok(())
        }
        StateAction::Clear => {
            if store.clear(&job)? {
                log::info!("checkpoint for job '{job}' removed");
            } else {
                log::info!("no checkpoint for job '{job}'");
            }
            Ok(())
        }
    }
}
