//! Benchmarks for coupling record ingestion

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use jarviz_graph::{GraphOptions, convert_to_usage_count, process_reader};

/// Synthetic report: `apps` applications, each calling into a shared pool
/// of target classes, with plenty of repeated couplings.
fn synthetic_report(lines: usize, apps: usize) -> String {
    let mut report = String::with_capacity(lines * 320);
    for i in 0..lines {
        let app = i % apps;
        let target = i % 37;
        report.push_str(&format!(
            r#"{{"appSetName":"bench","applicationName":"app-{app}","artifactFileName":"app-{app}.jar","artifactId":"app-{app}","artifactGroup":"com.example","artifactVersion":"1.0","sourceClass":"com.example.app{app}.Service{src}","sourceMethod":"handle{m}","targetClass":"com.example.shared.Client{target}","targetMethod":"call{m}"}}"#,
            app = app,
            src = i % 11,
            m = i % 5,
            target = target,
        ));
        report.push('\n');
    }
    report
}

fn bench_process_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_reader");

    for lines in [1_000, 10_000] {
        let report = synthetic_report(lines, 12);
        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &report, |b, report| {
            b.iter(|| {
                process_reader("bench", black_box(report.as_bytes()), GraphOptions::default())
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_usage_count(c: &mut Criterion) {
    let usages: Vec<String> = (0..10_000)
        .map(|i| format!("com.example.Service{}#call{}", i % 50, i % 7))
        .collect();

    c.bench_function("convert_to_usage_count/10000", |b| {
        b.iter(|| convert_to_usage_count(black_box(&usages)))
    });
}

criterion_group!(benches, bench_process_reader, bench_usage_count);
criterion_main!(benches);
