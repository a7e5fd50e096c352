//! Parse and stringify throughput, with serde_json as the baseline.
//!
//! The generated document is strict JSON so both parsers accept the
//! same bytes. Run with: cargo bench --bench parse

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use jsonkit_core::{parse, stringify};

/// A flat-ish document with a mix of scalars, arrays, and nesting.
fn generate_document(count: usize) -> String {
    let mut out = String::from("{\n");
    for i in 0..count {
        out.push_str(&format!(
            "  \"item_{i}\": {{\"id\": {i}, \"score\": {}.5, \"active\": {}, \"tags\": [\"a\", \"b\", \"c\"]}},\n",
            i * 3,
            i % 2 == 0,
        ));
    }
    out.push_str("  \"count\": ");
    out.push_str(&count.to_string());
    out.push_str("\n}");
    out
}

fn bench_parse(c: &mut Criterion) {
    let document = generate_document(200);

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(document.len() as u64));
    group.bench_function("jsonkit", |b| {
        b.iter(|| parse(black_box(&document)).unwrap())
    });
    group.bench_function("serde_json", |b| {
        b.iter(|| serde_json::from_str::<serde_json::Value>(black_box(&document)).unwrap())
    });
    group.finish();
}

fn bench_stringify(c: &mut Criterion) {
    let document = generate_document(200);
    let tree = parse(&document).unwrap();
    let serde_tree: serde_json::Value = serde_json::from_str(&document).unwrap();

    let mut group = c.benchmark_group("stringify");
    group.bench_function("jsonkit", |b| {
        b.iter(|| stringify(black_box(&tree)).unwrap())
    });
    group.bench_function("serde_json", |b| {
        b.iter(|| serde_json::to_string_pretty(black_box(&serde_tree)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_stringify);
criterion_main!(benches);
