// Export parsing, diffing and rendering benchmarks.
//
// Run with: cargo bench
//
// Performance Targets:
// | Operation           | Target    | Description                          |
// |---------------------|-----------|--------------------------------------|
// | Parse (1k)          | < 5ms     | Parse an export with 1000 records    |
// | Diff (1k)           | < 1ms     | Classify 1000 common benchmarks      |
// | Diff (10k)          | < 10ms    | Classify 10000 common benchmarks     |
// | Render text (1k)    | < 5ms     | Section tables for a 1k report       |
// | Render JSON (1k)    | < 5ms     | JSON document for a 1k report        |

use benchdiff::collect::parse_export;
use benchdiff::diff::{DEFAULT_THRESHOLD_PERCENT, diff};
use benchdiff::format::{ReportOutput, TextFormatOptions, report_to_string};
use benchdiff::model::{Measurement, NamingMode, ResultSet};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::json;
use std::path::Path;
use std::sync::Once;
use std::time::Instant;
use tracing::info;

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn init_bench_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = benchdiff::logging::init_logging(0, false, None);
    });
}

fn log_group_start(name: &str) {
    info!("benchmark_group_start: name={name}");
}

fn log_group_end(name: &str) {
    info!("benchmark_group_end: name={name}");
}

fn log_bench_end(name: &str, started_at: Instant) {
    info!("benchmark_end: {name} duration={:?}", started_at.elapsed());
}

/// Mean for benchmark `i` in the given pass; every third one regresses.
fn mean_for(i: usize, head: bool) -> f64 {
    let base = 100.0 + (i % 97) as f64;
    match (head, i % 3) {
        (false, _) => base,
        (true, 0) => base * 1.25,
        (true, 1) => base * 0.8,
        (true, _) => base * 1.001,
    }
}

fn allocation_for(i: usize, head: bool) -> Option<i64> {
    let base = i64::try_from(i % 512).expect("fits i64") * 8;
    match (head, i % 4) {
        (_, 3) => None,
        (true, 0) => Some(base + 64),
        _ => Some(base),
    }
}

fn result_set(count: usize, head: bool) -> ResultSet {
    let mut set = ResultSet::new();
    // Shift head identities so a few benchmarks only exist on one side.
    let offset = usize::from(head) * (count / 50);
    for i in offset..count + offset {
        set.insert(
            format!("Suite{}.Method{i}", i % 20),
            Measurement::new(mean_for(i, head), allocation_for(i, head)),
        );
    }
    set
}

fn export_document(count: usize) -> String {
    let records: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "Namespace": "Perf",
                "Type": format!("Suite{}", i % 20),
                "Method": format!("Method{i}"),
                "Parameters": if i % 5 == 0 { format!("Size={i}") } else { String::new() },
                "FullName": format!("Perf.Suite{}.Method{i}", i % 20),
                "Statistics": { "Mean": mean_for(i, false), "N": 15 },
                "Memory": { "BytesAllocatedPerOperation": allocation_for(i, false) },
            })
        })
        .collect();
    json!({ "Title": "bench", "Benchmarks": records }).to_string()
}

// =============================================================================
// Export Parsing
// =============================================================================

fn bench_parse_export(c: &mut Criterion) {
    init_bench_logging();
    let group_name = "export/parse";
    log_group_start(group_name);

    let mut group = c.benchmark_group(group_name);
    for size in SIZES {
        let document = export_document(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &document, |b, doc| {
            let started = Instant::now();
            b.iter(|| {
                parse_export(
                    black_box(doc),
                    Path::new("bench.json"),
                    NamingMode::Short,
                )
                .expect("parse export")
            });
            log_bench_end(&format!("{group_name}/{size}"), started);
        });
    }
    group.finish();

    log_group_end(group_name);
}

// =============================================================================
// Diff
// =============================================================================

fn bench_diff(c: &mut Criterion) {
    init_bench_logging();
    let group_name = "diff/classify";
    log_group_start(group_name);

    let mut group = c.benchmark_group(group_name);
    for size in SIZES {
        let sets = (result_set(size, false), result_set(size, true));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &sets, |b, (base, head)| {
            let started = Instant::now();
            b.iter(|| diff(black_box(base), black_box(head), DEFAULT_THRESHOLD_PERCENT));
            log_bench_end(&format!("{group_name}/{size}"), started);
        });
    }
    group.finish();

    log_group_end(group_name);
}

// =============================================================================
// Rendering
// =============================================================================

fn bench_render(c: &mut Criterion) {
    init_bench_logging();
    let group_name = "format/render";
    log_group_start(group_name);

    let report = diff(
        &result_set(1_000, false),
        &result_set(1_000, true),
        DEFAULT_THRESHOLD_PERCENT,
    );

    let mut group = c.benchmark_group(group_name);
    group.bench_function("text_1000", |b| {
        let started = Instant::now();
        b.iter(|| report_to_string(black_box(&report), TextFormatOptions::plain()));
        log_bench_end(&format!("{group_name}/text_1000"), started);
    });
    group.bench_function("json_1000", |b| {
        let started = Instant::now();
        b.iter(|| {
            serde_json::to_string(&ReportOutput::new(black_box(&report))).expect("serialize")
        });
        log_bench_end(&format!("{group_name}/json_1000"), started);
    });
    group.finish();

    log_group_end(group_name);
}

criterion_group!(benchmarks, bench_parse_export, bench_diff, bench_render);
criterion_main!(benchmarks);
