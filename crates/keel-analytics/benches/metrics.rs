//! Benchmarks for the keel-analytics engine and rolling metrics.
//!
//! Run with: cargo bench -p keel-analytics

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use keel_analytics::prelude::*;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn simple_hash(seed: u64, i: u64) -> u64 {
    let mut x = seed.wrapping_add(i).wrapping_mul(0x517c_c1b7_2722_0a95);
    x ^= x >> 32;
    x = x.wrapping_mul(0x517c_c1b7_2722_0a95);
    x ^= x >> 32;
    x
}

/// A panel of `assets` random-walk price columns over `rows` dates.
fn create_panel(rows: usize, assets: usize) -> PricePanel {
    let start = Date::from_ymd(2015, 1, 1).unwrap();
    let dates: Vec<Date> = (0..rows as u64).map(|i| start.add_days(i).unwrap()).collect();
    let tickers: Vec<String> = (0..assets).map(|j| format!("ASSET_{j:03}")).collect();
    let columns = (0..assets)
        .map(|j| {
            let mut price = 100.0;
            (0..rows)
                .map(|i| {
                    let step = (simple_hash(j as u64, i as u64) % 400) as f64 / 10_000.0 - 0.02;
                    price *= 1.0 + step;
                    price
                })
                .collect()
        })
        .collect();
    PricePanel::new(dates, tickers, columns).unwrap()
}

fn create_context(rows: usize, assets: usize) -> PortfolioContext {
    let panel = create_panel(rows, assets);
    PortfolioContext::builder()
        .prices(panel)
        .equal_weights()
        .build()
        .unwrap()
}

// =============================================================================
// ENGINE
// =============================================================================

fn bench_engine_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_construction");

    for rows in [252, 2520] {
        let panel = create_panel(rows, 20);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &panel, |b, panel| {
            b.iter(|| {
                PortfolioContext::builder()
                    .prices(black_box(panel.clone()))
                    .equal_weights()
                    .build()
            });
        });
    }

    group.finish();
}

// =============================================================================
// ROLLING METRICS
// =============================================================================

fn bench_ulcer_series(c: &mut Criterion) {
    let ctx = create_context(2520, 5);
    let mut group = c.benchmark_group("ulcer_series");

    group.bench_function("sequential", |b| {
        b.iter(|| ulcer_series(&ctx, black_box(14), &ComputeConfig::sequential()));
    });
    group.bench_function("configured", |b| {
        b.iter(|| ulcer_series(&ctx, black_box(14), &ComputeConfig::default()));
    });

    group.finish();
}

fn bench_omega_curve(c: &mut Criterion) {
    let ctx = create_context(2520, 5);
    c.bench_function("omega_curve", |b| {
        b.iter(|| omega_curve(&ctx, black_box(&MarSweep::default()), &ComputeConfig::default()));
    });
}

fn bench_report(c: &mut Criterion) {
    let ctx = create_context(1260, 10);
    let config = MetricConfig::new();
    let report_config = ReportConfig::default();
    c.bench_function("report", |b| {
        b.iter(|| Report::compute(&ctx, None, black_box(&config), &report_config));
    });
}

// =============================================================================
// CRITERION GROUPS
// =============================================================================

criterion_group!(engine, bench_engine_construction,);

criterion_group!(rolling, bench_ulcer_series, bench_omega_curve, bench_report,);

criterion_main!(engine, rolling);
