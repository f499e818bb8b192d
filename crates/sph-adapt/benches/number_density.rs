//! Criterion benchmarks for the reference-number-density calibration.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sph_adapt::SpatialAdaptation;

// ---------------------------------------------------------------------------
// Benchmark 1: construction cost across smoothing ratios (2-D lattice)
// ---------------------------------------------------------------------------

fn bench_calibration_2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibration_2d");
    for &h_spacing_ratio in &[1.0, 1.3, 2.0] {
        group.bench_with_input(
            BenchmarkId::from_parameter(h_spacing_ratio),
            &h_spacing_ratio,
            |b, &ratio| {
                b.iter(|| SpatialAdaptation::<2>::with_ratios(0.1, ratio, 1.0).unwrap());
            },
        );
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 2: the 3-D lattice, whose cost grows with the cube of the depth
// ---------------------------------------------------------------------------

fn bench_calibration_3d(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibration_3d");
    for &h_spacing_ratio in &[1.0, 1.3, 2.0] {
        group.bench_with_input(
            BenchmarkId::from_parameter(h_spacing_ratio),
            &h_spacing_ratio,
            |b, &ratio| {
                b.iter(|| SpatialAdaptation::<3>::with_ratios(0.1, ratio, 1.0).unwrap());
            },
        );
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 3: ratio reset, which re-runs the calibration
// ---------------------------------------------------------------------------

fn bench_ratio_reset(c: &mut Criterion) {
    let mut adaptation = SpatialAdaptation::<3>::new(0.1).unwrap();
    c.bench_function("ratio_reset_3d", |b| {
        b.iter(|| adaptation.reset_adaptation_ratios(1.3, 1.0).unwrap());
    });
}

criterion_group!(
    benches,
    bench_calibration_2d,
    bench_calibration_3d,
    bench_ratio_reset,
);
criterion_main!(benches);
