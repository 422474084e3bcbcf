//! Topology benches.
//!
//! Neighbor ring walks dominate a bake; index conversion is only used by
//! readers and checks, but should stay cheap at large radii.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hexbake_topology::{
    coord_to_spiral, neighbors_within, spiral_to_coord, total_slots_through, HexCoord,
    NeighborRings, Spiral, SpiralIndex, SpiralRing,
};

/// Closed-form slot <-> coordinate at the last slot of increasing rings.
fn bench_spiral_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("spiral_index");
    group.throughput(Throughput::Elements(1));

    for ring in [1u64, 30, 1_000, 30_000] {
        let last = SpiralIndex(total_slots_through(ring) - 1);
        group.bench_with_input(BenchmarkId::new("to_coord", ring), &last, |b, &i| {
            b.iter(|| spiral_to_coord(black_box(i)))
        });
        let coord = spiral_to_coord(last);
        group.bench_with_input(BenchmarkId::new("from_coord", ring), &coord, |b, &h| {
            b.iter(|| coord_to_spiral(black_box(h)))
        });
    }
    group.finish();
}

/// One ring around an off-origin center.
fn bench_ring_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_walk");

    for &radius in &[1u32, 10, 100, 1000] {
        group.throughput(Throughput::Elements(6 * u64::from(radius)));
        group.bench_with_input(BenchmarkId::new("radius", radius), &radius, |b, &r| {
            b.iter(|| SpiralRing::new(black_box(HexCoord::new(12, -7)), r).count())
        });
    }
    group.finish();
}

/// All rings out to `range`: the per-tile cost of neighbor generation.
fn bench_neighbor_rings(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_rings");

    for &range in &[1u32, 5, 10, 20] {
        group.throughput(Throughput::Elements(neighbors_within(u64::from(range))));
        group.bench_with_input(BenchmarkId::new("range", range), &range, |b, &n| {
            b.iter(|| NeighborRings::of(black_box(HexCoord::new(3, 4)), n))
        });
    }
    group.finish();
}

/// Whole grid, by index and by ring walks.
fn bench_spiral_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("spiral_iteration");

    for &rings in &[5u64, 20, 60] {
        let count = total_slots_through(rings);
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("indexed", rings), &rings, |b, &n| {
            b.iter(|| Spiral::rings(0, black_box(n)).count())
        });
        group.bench_with_input(BenchmarkId::new("walked", rings), &rings, |b, &n| {
            b.iter(|| {
                (1..=black_box(n) as u32)
                    .map(|r| SpiralRing::new(HexCoord::ORIGIN, r).count())
                    .sum::<usize>()
                    + 1
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_spiral_index,
    bench_ring_walk,
    bench_neighbor_rings,
    bench_spiral_iteration,
);

criterion_main!(benches);
