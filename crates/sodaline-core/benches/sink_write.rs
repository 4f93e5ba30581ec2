use serde_json::{Value, json};
use sodaline_core::StreamSink;

fn synthetic_page(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            json!({
                "row": i,
                "jurisdiction": "United States",
                "indicator": format!("indicator value for record {i}"),
                "value": (i as f64) * 0.25,
            })
        })
        .collect()
}

#[divan::bench(args = [1_000, 10_000, 50_000])]
fn ndjson_stream_write(bencher: divan::Bencher, rows: usize) {
    let page = synthetic_page(rows);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.jsonl.gz");
    bencher.bench(|| {
        let mut sink = StreamSink::create(&path).unwrap();
        sink.write_header(&json!({"_header": true, "id": "bench"}))
            .unwrap();
        sink.write_rows(&page).unwrap();
        sink.finalize().unwrap();
    });
}

fn main() {
    divan::main();
}
