//! Criterion benchmarks for the pairs-trading hot path.
//!
//! Benchmarks:
//! 1. Rolling signal generation over the spread
//! 2. Stop-loss simulation over executed signals
//! 3. Performance evaluation
//! 4. Spread fit plus ADF test

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pairlab_core::domain::Signal;
use pairlab_core::engine::simulate;
use pairlab_core::performance::evaluate;
use pairlab_core::signals::{execute_signals, generate_signals};
use pairlab_core::spread::fit_spread;
use pairlab_core::stationarity::{adf_test, AdfOptions};

fn make_spread(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| (i as f64 * 0.21).sin() + ((i * 7919) % 97) as f64 * 0.01)
        .collect()
}

fn make_legs(n: usize) -> (Vec<f64>, Vec<f64>) {
    let b: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.05).sin() * 10.0).collect();
    let a: Vec<f64> = b
        .iter()
        .enumerate()
        .map(|(i, x)| 5.0 + 0.8 * x + ((i * 31) % 17) as f64 * 0.05)
        .collect();
    (a, b)
}

fn bench_signals(c: &mut Criterion) {
    let mut group = c.benchmark_group("signals");
    for n in [1_260usize, 10_000] {
        let spread = make_spread(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &spread, |bch, s| {
            bch.iter(|| generate_signals(black_box(s), 10, 1.5))
        });
    }
    group.finish();
}

fn bench_simulate(c: &mut Criterion) {
    let n = 10_000;
    let executed: Vec<Signal> = execute_signals(&generate_signals(&make_spread(n), 10, 0.5).unwrap());
    let ret_a: Vec<f64> = (0..n).map(|i| ((i * 13) % 21) as f64 * 0.001 - 0.01).collect();
    let ret_b: Vec<f64> = (0..n).map(|i| ((i * 17) % 23) as f64 * 0.001 - 0.011).collect();
    c.bench_function("simulate_10k", |bch| {
        bch.iter(|| simulate(black_box(&executed), &ret_a, &ret_b, -0.02))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let returns: Vec<f64> = (0..10_000).map(|i| ((i * 29) % 41) as f64 * 0.0005 - 0.01).collect();
    c.bench_function("evaluate_10k", |bch| bch.iter(|| evaluate(black_box(&returns))));
}

fn bench_spread_and_adf(c: &mut Criterion) {
    let (a, b) = make_legs(1_260);
    c.bench_function("fit_spread_adf_1260", |bch| {
        bch.iter(|| {
            let model = fit_spread(black_box(&a), black_box(&b)).unwrap();
            adf_test(&model.residuals, AdfOptions::default())
        })
    });
}

criterion_group!(
    benches,
    bench_signals,
    bench_simulate,
    bench_evaluate,
    bench_spread_and_adf
);
criterion_main!(benches);
