//! Benchmarks for the pixelbench filter stages.
//!
//! Run with: cargo bench -p pixelbench-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pixelbench_core::filter::{self, FilterSettings};
use pixelbench_core::{Pipeline, RasterBuffer};

fn gradient(width: u32, height: u32) -> RasterBuffer {
    let data = (0..width * height * 3)
        .map(|i| ((i * 7) % 251) as u8)
        .collect();
    RasterBuffer::new(width, height, 3, data).unwrap()
}

fn benchmark_grayscale(c: &mut Criterion) {
    let img = gradient(640, 480);

    c.bench_function("grayscale_640x480", |b| {
        b.iter(|| {
            let _ = filter::grayscale(black_box(img.clone()));
        })
    });
}

fn benchmark_smooth(c: &mut Criterion) {
    let img = filter::grayscale(gradient(640, 480)).unwrap();

    c.bench_function("smooth_640x480", |b| {
        b.iter(|| {
            let _ = filter::smooth(black_box(img.clone()));
        })
    });
}

fn benchmark_edge_magnitude(c: &mut Criterion) {
    let img = filter::grayscale(gradient(640, 480)).unwrap();

    c.bench_function("edge_magnitude_640x480", |b| {
        b.iter(|| {
            let _ = filter::edge_magnitude(black_box(img.clone()));
        })
    });
}

fn benchmark_full_pipeline(c: &mut Criterion) {
    let img = gradient(640, 480);
    let pipeline = Pipeline::new(&FilterSettings::default());

    c.bench_function("pipeline_640x480", |b| {
        b.iter(|| {
            let _ = pipeline.run(black_box(img.clone()));
        })
    });
}

criterion_group!(
    benches,
    benchmark_grayscale,
    benchmark_smooth,
    benchmark_edge_magnitude,
    benchmark_full_pipeline,
);
criterion_main!(benches);
