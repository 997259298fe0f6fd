//! Criterion benchmarks for ZoneLab hot paths.
//!
//! Benchmarks:
//! 1. Candle series build (MA and ATR columns)
//! 2. Full pipeline per preset
//! 3. Multi-instrument scan through rayon

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use zonelab_core::config::{ConfigPreset, MovingAverageConfig};
use zonelab_core::data::MemoryCandleSource;
use zonelab_core::domain::{Candle, Granularity};
use zonelab_core::pipeline::{analyze, analyze_many, analyze_snapshot, MarketSnapshot};
use zonelab_core::series::CandleSeries;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_candles(n: usize, granularity: Granularity, base: f64) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let mut prev = base;
    (0..n)
        .map(|i| {
            let close = base * (1.0 + 0.005 * (i as f64 * 0.1).sin() + 0.00002 * i as f64);
            let candle = Candle::new(
                start + chrono::Duration::seconds(granularity.seconds() * i as i64),
                prev,
                prev.max(close) * 1.0004,
                prev.min(close) * 0.9996,
                close,
                1_000.0 + (i % 50) as f64 * 20.0,
            );
            prev = close;
            candle
        })
        .collect()
}

fn snapshot(instrument: &str, base: f64) -> MarketSnapshot {
    MarketSnapshot::new(instrument)
        .with(Granularity::D, make_candles(250, Granularity::D, base))
        .with(Granularity::H4, make_candles(250, Granularity::H4, base))
        .with(Granularity::H1, make_candles(500, Granularity::H1, base))
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_series_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_build");
    let config = MovingAverageConfig::default();
    for n in [250usize, 500, 2_000] {
        let candles = make_candles(n, Granularity::H1, 1.1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &candles, |b, candles| {
            b.iter(|| {
                CandleSeries::build("EUR_USD", Granularity::H1, black_box(candles.clone()), &config)
            });
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_snapshot");
    let snap = snapshot("EUR_USD", 1.1);
    for preset in ConfigPreset::ALL {
        let config = preset.to_config();
        group.bench_with_input(BenchmarkId::from_parameter(preset), &config, |b, config| {
            b.iter(|| analyze_snapshot(black_box(&snap), config));
        });
    }
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    let pairs = [
        ("EUR_USD", 1.08),
        ("GBP_USD", 1.27),
        ("USD_JPY", 151.0),
        ("AUD_USD", 0.66),
        ("USD_CAD", 1.36),
        ("EUR_JPY", 163.0),
        ("NZD_USD", 0.61),
        ("USD_CHF", 0.88),
    ];
    let mut source = MemoryCandleSource::new();
    for (pair, base) in pairs {
        let snap = snapshot(pair, base);
        for (g, candles) in snap.candles {
            source.insert(pair, g, candles);
        }
    }
    let instruments: Vec<String> = pairs.iter().map(|(p, _)| p.to_string()).collect();
    let config = ConfigPreset::Conservative.to_config();

    group.bench_function("sequential_8", |b| {
        b.iter(|| {
            for instrument in &instruments {
                let _ = analyze(instrument, &source, &config);
            }
        });
    });
    group.bench_function("rayon_8", |b| {
        b.iter(|| analyze_many(black_box(&instruments), &source, &config));
    });
    group.finish();
}

criterion_group!(benches, bench_series_build, bench_pipeline, bench_scan);
criterion_main!(benches);
