//! Benchmark for lineage graph construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lineage_core::{build, DistroRecord, LineageCache};

/// A wide, shallow catalog: a few roots, many derivatives, some forward references.
fn synthetic_catalog(size: usize) -> Vec<DistroRecord> {
    (0..size)
        .map(|i| {
            let record = DistroRecord::new(format!("distro-{}", i))
                .with_description(format!("Distribution number {}", i));
            if i % 10 == 0 {
                record
            } else {
                // Records ending in 5 point forward to the next root
                let base = if i % 5 == 0 { (i + 5) % size } else { i / 10 * 10 };
                record.derived_from(format!("distro-{}", base))
            }
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let records = synthetic_catalog(10_000);

    c.bench_function("build_10000_records", |b| {
        b.iter(|| build(black_box(&records)).unwrap())
    });
}

fn bench_cache_hit(c: &mut Criterion) {
    let records = synthetic_catalog(10_000);
    let cache = LineageCache::new();
    cache.get_or_build(&records).unwrap();

    c.bench_function("cache_hit_10000_records", |b| {
        b.iter(|| cache.get_or_build(black_box(&records)).unwrap())
    });
}

criterion_group!(benches, bench_build, bench_cache_hit);
criterion_main!(benches);
