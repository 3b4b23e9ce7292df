use criterion::{black_box, criterion_group, criterion_main, Criterion};
use patchgrid_split::*;

fn bench_split_png(c: &mut Criterion) {
    let image = image::DynamicImage::new_rgb8(1024, 768);
    let dir = tempfile::tempdir().unwrap();

    c.bench_function("split_png", |b| {
        b.iter(|| {
            black_box(split_image_to_dir(
                black_box(&image),
                dir.path(),
                256,
                256,
                "patch",
                PatchFormat::Png,
            ))
        })
    });
}

fn bench_splitter_creation(c: &mut Criterion) {
    c.bench_function("splitter_creation", |b| {
        b.iter(|| black_box(Splitter::new(black_box(1920), black_box(1080))))
    });
}

criterion_group!(benches, bench_split_png, bench_splitter_creation);
criterion_main!(benches);
