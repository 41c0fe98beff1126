//! Analysis pipeline performance benchmarks.
//!
//! Measures risk scoring, pattern analysis and the end-to-end file pipeline
//! on synthetic station data.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tempfile::NamedTempFile;
use watermetal::pattern::{correlation_matrix, principal_components};
use watermetal::{Analyzer, Dataset, PcaConfig, ReferenceTable, RiskScorer, Sample};

const METALS: [(&str, f64); 8] = [
    ("Fe", 35000.0),
    ("Mn", 600.0),
    ("Cr", 90.0),
    ("Cu", 45.0),
    ("Ni", 50.0),
    ("Co", 19.0),
    ("Pb", 20.0),
    ("Zn", 95.0),
];

/// Concentrations scattered around background, with a shared pollution
/// factor driving Pb, Cu and Zn so PCA has structure to find.
fn generate_rows(rows: usize) -> Vec<(String, Vec<f64>)> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..rows)
        .map(|i| {
            let source: f64 = rng.gen_range(0.0..3.0);
            let values = METALS
                .iter()
                .map(|(metal, background)| {
                    let noise: f64 = rng.gen_range(0.6..1.4);
                    let load = if matches!(*metal, "Pb" | "Cu" | "Zn") {
                        1.0 + source
                    } else {
                        1.0
                    };
                    background * noise * load
                })
                .collect();
            ((i + 1).to_string(), values)
        })
        .collect()
}

fn generate_dataset(rows: usize) -> Dataset {
    let samples = generate_rows(rows)
        .into_iter()
        .map(|(id, values)| {
            METALS
                .iter()
                .zip(values)
                .fold(Sample::new(id), |s, ((metal, _), v)| s.with(*metal, v))
        })
        .collect();
    Dataset::new(METALS.iter().map(|(m, _)| m.to_string()).collect(), samples).unwrap()
}

fn generate_csv(rows: usize) -> String {
    let mut data = String::from("S.No");
    for (metal, _) in METALS {
        data.push(',');
        data.push_str(metal);
    }
    data.push('\n');
    for (id, values) in generate_rows(rows) {
        data.push_str(&id);
        for v in values {
            data.push_str(&format!(",{:.2}", v));
        }
        data.push('\n');
    }
    data
}

/// Benchmark PERI scoring.
fn bench_risk_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("risk_scoring");
    let references = ReferenceTable::standard();

    for rows in [100, 1_000, 10_000].iter() {
        let dataset = generate_dataset(*rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("samples", rows), &dataset, |b, ds| {
            let scorer = RiskScorer::new();
            b.iter(|| black_box(scorer.score(ds, &references).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark correlation and PCA separately.
fn bench_pattern_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_analysis");

    for rows in [100, 1_000, 10_000].iter() {
        let dataset = generate_dataset(*rows);
        group.throughput(Throughput::Elements(*rows as u64));

        group.bench_with_input(BenchmarkId::new("correlation", rows), &dataset, |b, ds| {
            b.iter(|| black_box(correlation_matrix(ds)))
        });
        group.bench_with_input(BenchmarkId::new("pca", rows), &dataset, |b, ds| {
            let config = PcaConfig::default();
            b.iter(|| black_box(principal_components(ds, &config).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the full file pipeline.
fn bench_full_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_analysis");

    for rows in [50, 500, 5_000].iter() {
        let data = generate_csv(*rows);
        group.throughput(Throughput::Bytes(data.len() as u64));

        let mut temp = NamedTempFile::with_suffix(".csv").unwrap();
        temp.write_all(data.as_bytes()).unwrap();

        group.bench_with_input(BenchmarkId::new("stations", rows), &temp, |b, temp| {
            let analyzer = Analyzer::new();
            b.iter(|| black_box(analyzer.analyze(temp.path()).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_risk_scoring,
    bench_pattern_analysis,
    bench_full_analysis
);
criterion_main!(benches);
