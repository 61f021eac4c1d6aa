//! Criterion benchmarks for the series pipeline hot paths.
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use polymarket_price_series::domain::{
    Observation, Series, Tick, derive_inverse, merge_tick, normalize,
};

/// Deterministic pseudo-random batch, unsorted with a few bad entries.
fn batch(n: usize) -> Vec<Observation> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    (0..n)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let t = (state % 1_000_000) as f64;
            let p = (state % 1_200) as f64 / 1_000.0 - 0.1;
            if i % 97 == 0 {
                Observation::new(f64::NAN, p)
            } else {
                Observation::new(t, p)
            }
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for n in [100usize, 1_000, 10_000] {
        let input = batch(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| normalize(black_box(input.clone())))
        });
    }
    group.finish();
}

fn bench_inverse(c: &mut Criterion) {
    let series = normalize(batch(10_000));
    c.bench_function("derive_inverse_10k", |b| {
        b.iter(|| derive_inverse(black_box(&series)))
    });
}

fn bench_merge(c: &mut Criterion) {
    let series = normalize(batch(10_000));
    let tail = series.last().map(|p| p.time).unwrap_or_default();

    c.bench_function("merge_tick_append_10k", |b| {
        b.iter(|| merge_tick(black_box(&series), black_box(Tick::new(tail + 1.0, 0.5))))
    });

    c.bench_function("apply_tick_in_place", |b| {
        let mut live: Series = series.clone();
        let mut time = tail;
        b.iter(|| {
            time += 1.0;
            live.apply_tick(black_box(Tick::new(time, 0.5)))
        })
    });
}

criterion_group!(benches, bench_normalize, bench_inverse, bench_merge);
criterion_main!(benches);
