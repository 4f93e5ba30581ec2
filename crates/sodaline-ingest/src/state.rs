//! Durable checkpoint state for idempotent resume

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-job record of which datasets reached a terminal outcome.
///
/// An id lives in at most one of the two sets; once present it is never
/// re-attempted by a later run until the checkpoint is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchState {
    pub completed: BTreeSet<String>,
    pub skipped: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FetchState {
    /// Whether this dataset needs no further work.
    pub fn is_done(&self, id: &str) -> bool {
        self.completed.contains(id) || self.skipped.contains(id)
    }

    /// Record a successful ingest. Upgrades a previously skipped id.
    pub fn mark_completed(&mut self, id: &str) {
        self.skipped.remove(id);
        self.completed.insert(id.to_string());
        self.updated_at = Some(Utc::now());
    }

    /// Record a permanent skip (missing or empty dataset).
    pub fn mark_skipped(&mut self, id: &str) {
        if !self.completed.contains(id) {
            self.skipped.insert(id.to_string());
        }
        self.updated_at = Some(Utc::now());
    }
}

/// Loads and saves [`FetchState`] as one JSON file per named job.
///
/// Saves are atomic (write to `.tmp`, then rename) so a reader never sees a
/// partially written checkpoint; the orchestrator saves after every dataset's
/// terminal outcome, so a crash loses at most the in-flight dataset.
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn path(&self, job: &str) -> PathBuf {
        self.dir.join(format!("{job}.state.json"))
    }

    /// Load a job's state; a job with no prior checkpoint starts empty.
    pub fn load(&self, job: &str) -> Result<FetchState> {
        let path = self.path(job);
        if !path.exists() {
            return Ok(FetchState::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("cannot read checkpoint {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("corrupt checkpoint {}", path.display()))
    }

    /// Persist the full state atomically.
    pub fn save(&self, job: &str, state: &FetchState) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("cannot create state dir {}", self.dir.display()))?;

        let path = self.path(job);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(state).context("cannot serialize checkpoint")?;
        fs::write(&tmp, json).with_context(|| format!("cannot write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("cannot rename checkpoint into place: {}", path.display()))
    }

    /// Remove a job's checkpoint. Returns whether one existed.
    pub fn clear(&self, job: &str) -> Result<bool> {
        let path = self.path(job);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("cannot remove checkpoint {}", path.display()))?;
        Ok(true)
    }
}
