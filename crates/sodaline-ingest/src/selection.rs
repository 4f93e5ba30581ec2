//! Curated dataset selection list

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One unit of ingestion work from the curated selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetDescriptor {
    /// Catalog dataset identifier (e.g. `vbim-akqf`)
    pub id: String,
    /// Curation priority score
    pub score: u32,
}

#[derive(Debug, Deserialize)]
struct SelectionFile {
    #[serde(default, rename = "dataset")]
    datasets: Vec<DatasetDescriptor>,
}

/// The static selection of datasets to ingest, in processing order.
///
/// Loaded from a TOML file of `[[dataset]]` entries. Processing order is
/// score-descending then id, stable across runs, so resume picks up where
/// the previous run stopped.
#[derive(Debug, Clone)]
pub struct SelectionList {
    datasets: Vec<DatasetDescriptor>,
}

impl SelectionList {
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: SelectionFile = toml::from_str(content).context("invalid selection file")?;
        let mut datasets = file.datasets;

        let mut seen = std::collections::BTreeSet::new();
        for d in &datasets {
            anyhow::ensure!(!d.id.is_empty(), "selection entry with empty id");
            anyhow::ensure!(seen.insert(&d.id), "duplicate dataset id: {}", d.id);
        }

        datasets.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        Ok(Self { datasets })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read selection file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("cannot parse selection file {}", path.display()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.datasets.iter()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}
