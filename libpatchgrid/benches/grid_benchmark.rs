use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::RgbImage;
use patchgrid::*;

fn bench_grid_origins(c: &mut Criterion) {
    let grid = PatchGrid::new(20_000, 20_000, 256, 256).unwrap();

    c.bench_function("grid_origins", |b| {
        b.iter(|| black_box(grid.origins().count()))
    });
}

fn bench_patch_extraction(c: &mut Criterion) {
    let image = RgbImage::new(3000, 2000);
    let grid = PatchGrid::new(3000, 2000, 1920, 1080).unwrap();

    c.bench_function("patch_extraction", |b| {
        b.iter(|| black_box(grid.patches(black_box(&image)).count()))
    });
}

fn bench_layout_analysis(c: &mut Criterion) {
    let grid = PatchGrid::new(20_000, 20_000, 256, 256).unwrap();
    let origins: Vec<(u32, u32)> = grid.origins().map(|o| (o.top, o.left)).collect();

    c.bench_function("layout_analysis", |b| {
        b.iter(|| black_box(GridLayout::analyze(origins.iter().copied(), 256, 256)))
    });
}

criterion_group!(
    benches,
    bench_grid_origins,
    bench_patch_extraction,
    bench_layout_analysis
);
criterion_main!(benches);
