//! Sequential ingestion job: fetch, classify, persist, checkpoint.
//!
//! A single logical worker walks the pending set in order. Within a dataset,
//! page fetches are sequential; all blocking happens at the rate limiter and
//! at network I/O.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use sodaline_core::{
    FetchError, SharedProgress, StreamSink, cleanup_tmp_files, fmt_num, is_shutdown_requested,
    write_document,
};

use crate::artifact::{self, DatasetDocument, HeaderRecord};
use crate::client::CatalogApi;
use crate::config::IngestConfig;
use crate::page::{Page, PageFetcher, SizeClass};
use crate::selection::{DatasetDescriptor, SelectionList};
use crate::state::CheckpointStore;

/// Terminal outcome for one dataset.
enum Outcome {
    Completed { rows: usize, class: SizeClass },
    SkippedMissing,
    SkippedEmpty,
}

/// Job execution summary
#[derive(Debug, Default)]
pub struct Summary {
    pub selected: usize,
    pub already_done: usize,
    pub fetched: usize,
    pub streamed: usize,
    pub skipped_missing: usize,
    pub skipped_empty: usize,
    pub total_rows: usize,
    pub interrupted: bool,
    pub elapsed: Duration,
}

/// Run the ingestion job to completion (or first fatal error).
///
/// Resume semantics: datasets already recorded in the checkpoint are never
/// re-fetched; a run with nothing pending performs zero network calls. The
/// checkpoint is saved after every dataset's terminal outcome, so an
/// interruption loses at most the in-flight dataset, whose partial output
/// exists only as a `.tmp` file and is swept at the start of the next run.
pub fn run(api: &dyn CatalogApi, config: &IngestConfig, progress: &SharedProgress) -> Result<Summary> {
    let start = Instant::now();

    let selection = SelectionList::from_path(&config.selection_path)?;
    let store = CheckpointStore::new(&config.state_dir);
    let mut state = store
        .load(&config.job_name)
        .with_context(|| format!("loading checkpoint for job {}", config.job_name))?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("cannot create output dir {}", config.output_dir.display()))?;
    let swept = cleanup_tmp_files(&config.output_dir)?;
    if swept > 0 {
        log::info!("swept {swept} stale tmp file(s) from interrupted run");
    }

    let mut pending: Vec<&DatasetDescriptor> =
        selection.iter().filter(|d| !state.is_done(&d.id)).collect();
    let already_done = selection.len() - pending.len();
    if let Some(max) = config.max_datasets {
        pending.truncate(max);
    }

    let mut summary = Summary {
        selected: selection.len(),
        already_done,
        ..Summary::default()
    };

    if pending.is_empty() {
        log::info!("all {} datasets up to date", selection.len());
        summary.elapsed = start.elapsed();
        return Ok(summary);
    }

    log::info!(
        "fetching {} datasets ({} already done)",
        pending.len(),
        already_done
    );
    let job_bar = progress.job_bar(pending.len());

    for descriptor in pending {
        if is_shutdown_requested() {
            log::warn!("shutdown requested, stopping before {}", descriptor.id);
            summary.interrupted = true;
            break;
        }

        job_bar.set_message(descriptor.id.clone());
        let pb = progress.dataset_bar(&descriptor.id);
        let outcome = ingest_dataset(api, config, descriptor, &pb)
            .with_context(|| format!("dataset {} failed", descriptor.id))?;
        pb.finish_and_clear();

        match outcome {
            Outcome::Completed { rows, class } => {
                state.mark_completed(&descriptor.id);
                summary.fetched += 1;
                summary.total_rows += rows;
                if class == SizeClass::Large {
                    summary.streamed += 1;
                }
            }
            Outcome::SkippedMissing => {
                state.mark_skipped(&descriptor.id);
                summary.skipped_missing += 1;
            }
            Outcome::SkippedEmpty => {
                state.mark_skipped(&descriptor.id);
                summary.skipped_empty += 1;
            }
        }

        // Persist after every terminal outcome, never batched
        store.save(&config.job_name, &state)?;
        job_bar.inc(1);
    }
    job_bar.finish_and_clear();

    summary.elapsed = start.elapsed();
    log::info!("=== Ingest Summary ===");
    log::info!(
        "Datasets: {} fetched ({} streamed), {} skipped (missing), {} skipped (empty), {} already done",
        summary.fetched,
        summary.streamed,
        summary.skipped_missing,
        summary.skipped_empty,
        summary.already_done
    );
    log::info!("Rows: {}", fmt_num(summary.total_rows));
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}

/// Process one dataset through to a terminal outcome.
///
/// 404s (metadata or pages) and empty datasets resolve locally into skips;
/// every other error propagates and aborts the run without recording the
/// dataset, so the next run re-attempts it from the start.
fn ingest_dataset(
    api: &dyn CatalogApi,
    config: &IngestConfig,
    descriptor: &DatasetDescriptor,
    pb: &ProgressBar,
) -> Result<Outcome, FetchError> {
    let id = descriptor.id.as_str();

    pb.set_message("metadata");
    let metadata = match api.get_metadata(id) {
        Ok(m) => m,
        Err(e) if e.is_not_found() => {
            log::warn!("{id}: not found, skipping");
            return Ok(Outcome::SkippedMissing);
        }
        Err(e) => return Err(e),
    };
    let name = artifact::dataset_name(&metadata, id).to_string();

    pb.set_message("first page");
    let first = match api.get_page(id, config.page_limit, 0) {
        Ok(rows) => Page {
            rows,
            offset: 0,
            limit: config.page_limit,
        },
        Err(e) if e.is_not_found() => {
            log::warn!("{id}: not found, skipping");
            return Ok(Outcome::SkippedMissing);
        }
        Err(e) => return Err(e),
    };

    if first.is_empty() {
        log::warn!("{id}: empty dataset, skipping");
        return Ok(Outcome::SkippedEmpty);
    }

    match SizeClass::classify(&first) {
        SizeClass::Small => {
            let path = artifact::batch_path(&config.output_dir, id);
            let doc = DatasetDocument {
                id,
                name: &name,
                score: descriptor.score,
                metadata: &metadata,
                data: &first.rows,
            };
            write_document(&path, &doc)?;
            artifact::remove_if_exists(&artifact::stream_path(&config.output_dir, id))?;

            log::info!("{id}: {name} ({} rows)", fmt_num(first.rows.len()));
            Ok(Outcome::Completed {
                rows: first.rows.len(),
                class: SizeClass::Small,
            })
        }
        SizeClass::Large => {
            let path = artifact::stream_path(&config.output_dir, id);
            let mut sink = StreamSink::create(&path)?;
            sink.write_header(&HeaderRecord::new(id, &name, descriptor.score, &metadata))?;
            sink.write_rows(&first.rows)?;
            pb.set_message(format!("{} rows", fmt_num(sink.row_count())));
            drop(first);

            // Continue where the first page left off; each page is written
            // out and dropped before the next fetch
            let pages = PageFetcher::starting_at(api, id, config.page_limit, config.page_limit);
            for page in pages {
                let page = match page {
                    Ok(p) => p,
                    Err(e) if e.is_not_found() => {
                        log::warn!("{id}: vanished mid-fetch, skipping");
                        return Ok(Outcome::SkippedMissing);
                    }
                    Err(e) => return Err(e),
                };
                sink.write_rows(&page.rows)?;
                pb.set_message(format!("{} rows", fmt_num(sink.row_count())));
            }

            let rows = sink.finalize()?;
            artifact::remove_if_exists(&artifact::batch_path(&config.output_dir, id))?;

            log::info!("{id}: {name} ({} rows, streamed)", fmt_num(rows));
            Ok(Outcome::Completed {
                rows,
                class: SizeClass::Large,
            })
        }
    }
}
