//! Benchmarks for tide prediction.
//!
//! Run with: `cargo bench --bench prediction_bench`
//!
//! Benchmarks level evaluation and event search for sets of increasing
//! size.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tide_harmonics::analysis::ModeCatalog;
use tide_harmonics::constituents::RunningSet;
use tide_harmonics::prediction::{EventFilter, Station};
use tide_harmonics::types::{Amplitude, Interval, Timestamp};

/// Running set with the first `n` harmonic modes of the standard catalog.
fn setup_set(n: usize) -> RunningSet {
    let mut set = RunningSet::new(Amplitude::meters(1.0), Timestamp::from_seconds(0));
    for (i, mode) in ModeCatalog::standard().harmonics().iter().take(n).enumerate() {
        let amplitude = 1.0 / (1.0 + i as f64);
        set.append(Amplitude::meters(amplitude), mode.speed, 0.37 * i as f64)
            .unwrap();
    }
    set
}

/// Benchmark level evaluation.
fn bench_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict_level");

    for n in [4, 16, 37] {
        let set = setup_set(n);
        let station = Station::new(Some(&set));
        let t = Timestamp::from_seconds(1_000_000);

        group.bench_with_input(
            BenchmarkId::new("constituents", n),
            &n,
            |b, _| {
                b.iter(|| station.predict_level(black_box(t)));
            },
        );
    }

    group.finish();
}

/// Benchmark a month of event search.
fn bench_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict_events");
    let start = Timestamp::from_seconds(0);
    let end = start + Interval::from_days(30);

    for n in [4, 16, 37] {
        let set = setup_set(n);
        let station = Station::new(Some(&set));

        group.bench_with_input(
            BenchmarkId::new("max_min", n),
            &n,
            |b, _| {
                b.iter(|| {
                    station.predict_events(
                        black_box(start),
                        black_box(end),
                        None,
                        EventFilter::MaxMin,
                    )
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("with_mark", n),
            &n,
            |b, _| {
                b.iter(|| {
                    station.predict_events(
                        black_box(start),
                        black_box(end),
                        Some(Amplitude::meters(1.2)),
                        EventFilter::NoFilter,
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_level, bench_events);
criterion_main!(benches);
