//! Artifact shapes and deterministic paths for persisted datasets

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

/// First line of a streamed artifact, carrying dataset-level metadata.
#[derive(Debug, Serialize)]
pub struct HeaderRecord<'a> {
    #[serde(rename = "_header")]
    pub header: bool,
    pub id: &'a str,
    pub name: &'a str,
    pub score: u32,
    pub metadata: &'a Value,
}

impl<'a> HeaderRecord<'a> {
    pub fn new(id: &'a str, name: &'a str, score: u32, metadata: &'a Value) -> Self {
        Self {
            header: true,
            id,
            name,
            score,
            metadata,
        }
    }
}

/// Whole-dataset document for the batch path.
#[derive(Debug, Serialize)]
pub struct DatasetDocument<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub score: u32,
    pub metadata: &'a Value,
    pub data: &'a [Value],
}

/// Batch artifact: one gzip JSON document.
pub fn batch_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("dataset_{id}.json.gz"))
}

/// Streamed artifact: gzip NDJSON, header line first.
pub fn stream_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("dataset_{id}.jsonl.gz"))
}

/// Dataset display name from its metadata, falling back to the id.
pub fn dataset_name<'a>(metadata: &'a Value, id: &'a str) -> &'a str {
    metadata.get("name").and_then(Value::as_str).unwrap_or(id)
}

/// Remove a stale artifact if present. Returns whether one was removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_serializes_with_marker_first() {
        let metadata = json!({"name": "Provisional Death Counts"});
        let header = HeaderRecord::new("hc4f-j6nb", "Provisional Death Counts", 92, &metadata);
        let line = serde_json::to_string(&header).unwrap();
        assert!(line.starts_with(r#"{"_header":true"#));
        assert!(line.contains(r#""id":"hc4f-j6nb""#));
        assert!(line.contains(r#""score":92"#));
    }

    #[test]
    fn document_shape() {
        let metadata = json!({"name": "X"});
        let rows = vec![json!({"a": 1})];
        let doc = DatasetDocument {
            id: "abcd-1234",
            name: "X",
            score: 80,
            metadata: &metadata,
            data: &rows,
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["id"], json!("abcd-1234"));
        assert_eq!(value["data"], json!([{"a": 1}]));
        assert!(value.get("_header").is_none());
    }

    #[test]
    fn paths_are_deterministic() {
        let dir = Path::new("/out");
        assert_eq!(
            batch_path(dir, "vbim-akqf"),
            PathBuf::from("/out/dataset_vbim-akqf.json.gz")
        );
        assert_eq!(
            stream_path(dir, "vbim-akqf"),
            PathBuf::from("/out/dataset_vbim-akqf.jsonl.gz")
        );
    }

    #[test]
    fn name_falls_back_to_id() {
        assert_eq!(
            dataset_name(&json!({"name": "Monthly Births"}), "e6fc-ccez"),
            "Monthly Births"
        );
        assert_eq!(dataset_name(&json!({}), "e6fc-ccez"), "e6fc-ccez");
        assert_eq!(dataset_name(&json!({"name": 42}), "e6fc-ccez"), "e6fc-ccez");
    }

    #[test]
    fn remove_if_exists_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dataset_x.json.gz");
        std::fs::write(&path, b"x").unwrap();
        assert!(remove_if_exists(&path).unwrap());
        assert!(!remove_if_exists(&path).unwrap());
    }
}
