//! Benchmark for terrain noise and height sampling.
//!
//! TARGET: 1,000,000 height samples per second
//!
//! Run with: cargo bench --package verdant_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use verdant_procedural::{CachedHeights, HeightMap, HeightSource, NoiseField, WorldSeed};

fn benchmark_single_sample(c: &mut Criterion) {
    let noise = NoiseField::new(WorldSeed::new(42));

    c.bench_function("single_noise_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.sample(black_box(x)))
        });
    });
}

fn benchmark_terrain_noise(c: &mut Criterion) {
    let noise = NoiseField::new(WorldSeed::new(42));

    c.bench_function("terrain_noise_4_octaves", |b| {
        let mut x = 0.0f32;
        b.iter(|| {
            x += 30.0;
            black_box(noise.noise(black_box(x), black_box(210.0)))
        });
    });
}

fn benchmark_million_heights(c: &mut Criterion) {
    let heights = HeightMap::new(WorldSeed::new(42), 480.0, 210.0);

    let mut group = c.benchmark_group("million_heights");
    group.throughput(Throughput::Elements(1_000_000));
    group.sample_size(10);

    group.bench_function("1M_height_samples", |b| {
        b.iter(|| {
            for i in 0..1_000_000 {
                black_box(heights.height_at(i as f32 * 30.0));
            }
        });
    });

    group.finish();
}

fn benchmark_cached_heights(c: &mut Criterion) {
    let cached = CachedHeights::new(HeightMap::new(WorldSeed::new(42), 480.0, 210.0));

    // One window's worth of columns, warmed
    for i in 0..64 {
        cached.height_at(i as f32 * 30.0);
    }

    c.bench_function("cached_height_hit", |b| {
        let mut i = 0u32;
        b.iter(|| {
            i = (i + 1) % 64;
            black_box(cached.height_at(black_box(i as f32 * 30.0)))
        });
    });
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_terrain_noise,
    benchmark_million_heights,
    benchmark_cached_heights
);
criterion_main!(benches);
