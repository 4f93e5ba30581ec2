//! Compressed artifact sinks: gzip NDJSON stream writer and single-document
//! writer, both with atomic tmp→rename

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Gzip NDJSON writer for streamed dataset artifacts.
///
/// Writes exactly one header line, then rows one JSON object per line, into a
/// `.tmp` sibling of the final path. Nothing is buffered beyond the encoder's
/// internal block, so resident memory stays bounded by the caller's current
/// page regardless of dataset size. [`finalize`](StreamSink::finalize)
/// closes the gzip framing and atomically renames tmp → final; a sink that is
/// dropped instead leaves only the `.tmp` file behind.
pub struct StreamSink {
    encoder: GzEncoder<BufWriter<File>>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    row_count: usize,
    wrote_header: bool,
}

impl std::fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSink")
            .field("final_path", &self.final_path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl StreamSink {
    /// Open a sink writing to a temporary sibling of `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let tmp_path = tmp_path_for(path);

        // Clean up stale tmp file from an interrupted run
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }

        let file = File::create(&tmp_path)?;
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

        Ok(Self {
            encoder,
            tmp_path,
            final_path: path.to_path_buf(),
            row_count: 0,
            wrote_header: false,
        })
    }

    /// Write the header record. Must be the first line, exactly once.
    pub fn write_header<H: Serialize>(&mut self, header: &H) -> io::Result<()> {
        if self.wrote_header || self.row_count > 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "header must be the first line written",
            ));
        }
        serde_json::to_writer(&mut self.encoder, header)?;
        self.encoder.write_all(b"\n")?;
        self.wrote_header = true;
        Ok(())
    }

    /// Append rows, one JSON object per line. Callable across many pages;
    /// previously written rows are not retained.
    pub fn write_rows(&mut self, rows: &[serde_json::Value]) -> io::Result<()> {
        for row in rows {
            serde_json::to_writer(&mut self.encoder, row)?;
            self.encoder.write_all(b"\n")?;
        }
        self.row_count += rows.len();
        Ok(())
    }

    /// Rows written so far.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Finalize gzip framing, flush, and atomically rename tmp → final.
    pub fn finalize(self) -> io::Result<usize> {
        let mut inner = self.encoder.finish()?;
        inner.flush()?;
        drop(inner);
        fs::rename(&self.tmp_path, &self.final_path)?;
        Ok(self.row_count)
    }
}

/// Write a whole value as one gzip-compressed JSON document, atomically.
///
/// The batch-path counterpart of [`StreamSink`] for datasets that fit in a
/// single page.
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let tmp_path = tmp_path_for(path);
    if tmp_path.exists() {
        fs::remove_file(&tmp_path)?;
    }

    let file = File::create(&tmp_path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_json::to_writer(&mut encoder, value)?;
    let mut inner = encoder.finish()?;
    inner.flush()?;
    drop(inner);
    fs::rename(&tmp_path, path)
}

/// Remove stale `*.tmp` files left by an interrupted run.
///
/// Returns how many were removed. Partial stream output is never valid, so
/// sweeping is always safe.
pub fn cleanup_tmp_files(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "tmp") {
            log::warn!("removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use flate2::read::GzDecoder;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn read_gz(path: &Path) -> String {
        let mut out = String::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn stream_writes_header_then_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl.gz");

        let mut sink = StreamSink::create(&path).unwrap();
        sink.write_header(&json!({"_header": true, "id": "abcd-1234"}))
            .unwrap();
        sink.write_rows(&[json!({"a": 1}), json!({"a": 2})]).unwrap();
        let rows = sink.finalize().unwrap();

        assert_eq!(rows, 2);
        let lines: Vec<String> = read_gz(&path).lines().map(String::from).collect();
        assert_eq!(lines.len(), 3);
        let header: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(header["_header"], json!(true));
        let first: Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(first["a"], json!(1));
    }

    #[test]
    fn many_batches_append_incrementally() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.jsonl.gz");

        let mut sink = StreamSink::create(&path).unwrap();
        sink.write_header(&json!({"_header": true})).unwrap();
        let page: Vec<Value> = (0..500).map(|i| json!({"n": i})).collect();
        for _ in 0..10 {
            sink.write_rows(&page).unwrap();
        }
        assert_eq!(sink.row_count(), 5000);
        assert_eq!(sink.finalize().unwrap(), 5000);

        assert_eq!(read_gz(&path).lines().count(), 5001);
    }

    #[test]
    fn header_after_rows_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut sink = StreamSink::create(&dir.path().join("x.jsonl.gz")).unwrap();
        sink.write_rows(&[json!({})]).unwrap();
        assert!(sink.write_header(&json!({"_header": true})).is_err());
    }

    #[test]
    fn double_header_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut sink = StreamSink::create(&dir.path().join("x.jsonl.gz")).unwrap();
        sink.write_header(&json!({"_header": true})).unwrap();
        assert!(sink.write_header(&json!({"_header": true})).is_err());
    }

    #[test]
    fn finalize_removes_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl.gz");
        let mut sink = StreamSink::create(&path).unwrap();
        sink.write_header(&json!({"_header": true})).unwrap();
        sink.finalize().unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("out.jsonl.gz.tmp").exists());
    }

    #[test]
    fn dropped_sink_leaves_only_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl.gz");
        {
            let mut sink = StreamSink::create(&path).unwrap();
            sink.write_rows(&[json!({"partial": true})]).unwrap();
        }
        assert!(!path.exists());
        assert!(dir.path().join("out.jsonl.gz.tmp").exists());
    }

    #[test]
    fn write_document_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json.gz");
        write_document(&path, &json!({"id": "abcd-1234", "data": [1, 2, 3]})).unwrap();

        let doc: Value = serde_json::from_str(&read_gz(&path)).unwrap();
        assert_eq!(doc["data"], json!([1, 2, 3]));
        assert!(!dir.path().join("doc.json.gz.tmp").exists());
    }

    #[test]
    fn cleanup_removes_only_tmp() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jsonl.gz.tmp"), b"stale").unwrap();
        fs::write(dir.path().join("b.json.gz"), b"keep").unwrap();
        fs::write(dir.path().join("c.tmp"), b"stale2").unwrap();

        let removed = cleanup_tmp_files(dir.path()).unwrap();

        assert_eq!(removed, 2);
        assert!(!dir.path().join("a.jsonl.gz.tmp").exists());
        assert!(dir.path().join("b.json.gz").exists());
    }
}
