use criterion::{black_box, criterion_group, criterion_main, Benchmark, Criterion};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use shardgrid::{BoxError, Grid, GridOptions, LockStrategy};

criterion_group!(
    grid,
    fill_benchmark,
    for_each_benchmark,
    extract_benchmark
);
criterion_main!(grid);

const SIZES: &[usize] = &[16, 64, 256];

fn options(strategy: LockStrategy) -> GridOptions {
    GridOptions {
        strategy,
        ..GridOptions::default()
    }
}

fn fill_benchmark(c: &mut Criterion) {
    for &size in SIZES {
        bench_fill(c, "fill_sharded", LockStrategy::Sharded, size);
        bench_fill(c, "fill_coarse", LockStrategy::Coarse, size);
    }
}

fn bench_fill(c: &mut Criterion, name: &str, strategy: LockStrategy, size: usize) {
    let rt = Runtime::new().unwrap();
    let grid = Grid::with_options(size, size, options(strategy)).unwrap();
    c.bench(
        name,
        Benchmark::new(&format!("{}x{}", size, size), move |b| {
            b.iter(|| {
                rt.block_on(grid.fill(
                    |row, column| (row * column) as u64,
                    CancellationToken::new(),
                ))
                .unwrap()
            })
        }),
    );
}

fn for_each_benchmark(c: &mut Criterion) {
    for &size in SIZES {
        let rt = Runtime::new().unwrap();
        let grid = Grid::with_options(size, size, GridOptions::default()).unwrap();
        rt.block_on(grid.fill(|row, column| (row + column) as u64, CancellationToken::new()))
            .unwrap();
        c.bench(
            "for_each",
            Benchmark::new(&format!("{}x{}", size, size), move |b| {
                b.iter(|| {
                    rt.block_on(grid.for_each(
                        |_, _, value| async move {
                            black_box(value);
                            Ok::<(), BoxError>(())
                        },
                        CancellationToken::new(),
                    ))
                    .unwrap()
                })
            }),
        );
    }
}

fn extract_benchmark(c: &mut Criterion) {
    for &size in SIZES {
        let grid = filled_grid(size);
        c.bench(
            "row",
            Benchmark::new(&format!("{}x{}", size, size), move |b| {
                b.iter(|| black_box(grid.row(size / 2).unwrap()))
            }),
        );
        let grid = filled_grid(size);
        c.bench(
            "column",
            Benchmark::new(&format!("{}x{}", size, size), move |b| {
                b.iter(|| black_box(grid.column(size / 2).unwrap()))
            }),
        );
        let grid = filled_grid(size);
        c.bench(
            "snapshot",
            Benchmark::new(&format!("{}x{}", size, size), move |b| {
                b.iter(|| black_box(grid.snapshot().unwrap()))
            }),
        );
    }
}

fn filled_grid(size: usize) -> Grid<u64> {
    let rt = Runtime::new().unwrap();
    let grid = Grid::new(size, size).unwrap();
    rt.block_on(grid.fill(|row, column| (row * column) as u64, CancellationToken::new()))
        .unwrap();
    grid
}
