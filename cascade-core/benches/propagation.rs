//! Benchmarks for cascade-core propagation
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cascade_core::{Signal, Update};

// =============================================================================
// SIGNAL BENCHMARKS
// =============================================================================

fn bench_signal_create(c: &mut Criterion) {
    c.bench_function("signal_create", |b| b.iter(|| black_box(Signal::new(0i32))));
}

fn bench_signal_change(c: &mut Criterion) {
    let s = Signal::new(0i32);
    c.bench_function("signal_change", |b| {
        b.iter(|| {
            s.change(black_box(42)).unwrap();
        })
    });
}

fn bench_derive_create(c: &mut Criterion) {
    let s = Signal::new(0i32);
    c.bench_function("derive_create", |b| {
        b.iter(|| {
            black_box(Signal::derive(&[&s], |v: &[i32], _| Update::Value(v[0] * 2)).unwrap())
        })
    });
}

// =============================================================================
// PROPAGATION BENCHMARKS
// =============================================================================

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");

    for depth in [10, 100, 1000] {
        let root = Signal::new(0i64);
        let mut chain = vec![root.clone()];
        for _ in 0..depth {
            let next = chain[chain.len() - 1].map(|v| v + 1).unwrap();
            chain.push(next);
        }

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            let mut i = 0i64;
            b.iter(|| {
                i += 1;
                root.change(black_box(i)).unwrap();
            })
        });

        while chain.pop().is_some() {}
    }

    group.finish();
}

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for width in [10, 100, 1000] {
        let root = Signal::new(0i64);
        let followers: Vec<_> = (0..width)
            .map(|_| Signal::follows(&[&root]).unwrap())
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            let mut i = 0i64;
            b.iter(|| {
                i += 1;
                root.change(black_box(i)).unwrap();
            })
        });

        black_box(&followers);
    }

    group.finish();
}

fn bench_cycle(c: &mut Criterion) {
    let a = Signal::new(0i64);
    let b = Signal::follows(&[&a]).unwrap();
    a.follow(&[&b]).unwrap();

    c.bench_function("mutual_followers", |bench| {
        let mut i = 0i64;
        bench.iter(|| {
            i += 1;
            a.change(black_box(i)).unwrap();
        })
    });

    a.dont_follow(&[&b]).unwrap();
}

fn bench_combine(c: &mut Criterion) {
    let inputs: Vec<_> = (0..8).map(Signal::new).collect();
    let refs: Vec<&Signal<i32>> = inputs.iter().collect();
    let combined = Signal::combine(&refs).unwrap();

    c.bench_function("combine_8", |b| {
        let mut i = 0;
        b.iter(|| {
            i += 1;
            inputs[0].change(black_box(i)).unwrap();
        })
    });

    black_box(combined.value());
}

criterion_group!(signal_benches, bench_signal_create, bench_signal_change, bench_derive_create);

criterion_group!(propagation_benches, bench_chain, bench_fan_out, bench_cycle, bench_combine);

criterion_main!(signal_benches, propagation_benches);
