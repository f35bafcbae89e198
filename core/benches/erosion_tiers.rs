//! Cost of one erosion cycle's building blocks as islands grow

#![allow(missing_docs)]

use atoll_core::*;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::hint::black_box;

const PATH_LENGTHS: [Coord; 3] = [4, 8, 16];

fn row_path(length: Coord) -> Vec<Cell> {
    (0..length).map(|x| Cell::new(x, 0)).collect()
}

fn island(length: Coord) -> Option<Island> {
    LayeredIslandGenerator::new(7, IslandConfig::default())
        .generate(&row_path(length))
        .ok()
}

fn bench_identify_erodable(c: &mut Criterion) {
    let mut group = c.benchmark_group("identify_erodable_cells");

    for length in PATH_LENGTHS {
        let Some(island) = island(length) else {
            group.finish();
            return;
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(island.len()),
            &island,
            |b, island| {
                b.iter(|| identify_erodable_cells(black_box(&island.cells), &island.path, &[], &[]));
            },
        );
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_cells_to_erode");

    for length in PATH_LENGTHS {
        let Some(island) = island(length) else {
            group.finish();
            return;
        };
        let erodable = identify_erodable_cells(&island.cells, &island.path, &[], &[]);
        let count = ceil_fraction(erodable.len(), 0.10);
        let mut rng = SmallRng::seed_from_u64(12345);
        group.bench_with_input(
            BenchmarkId::from_parameter(erodable.len()),
            &erodable,
            |b, erodable| {
                b.iter(|| select_cells_to_erode(black_box(erodable), count, &mut rng));
            },
        );
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_island");

    for length in PATH_LENGTHS {
        let path = row_path(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &path, |b, path| {
            b.iter(|| {
                LayeredIslandGenerator::new(7, IslandConfig::default()).generate(black_box(path))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_identify_erodable, bench_select, bench_generate);
criterion_main!(benches);
