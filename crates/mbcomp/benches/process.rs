//! Block processing benchmarks

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mbcomp::prelude::*;

fn prepared(block_size: usize) -> (MultibandProcessor, std::sync::Arc<MultibandParameters>) {
    let plugin = MultibandCompressor::new();
    let parameters = plugin.parameters_handle();
    let processor = plugin
        .prepare(AudioSetup::new(48_000.0, block_size, BusLayout::stereo()))
        .unwrap();
    (processor, parameters)
}

fn signal(len: usize) -> (Vec<f32>, Vec<f32>) {
    let left = (0..len).map(|i| (i as f32 * 0.013).sin() * 0.5).collect();
    let right = (0..len).map(|i| (i as f32 * 0.017).cos() * 0.5).collect();
    (left, right)
}

fn bench_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiband_stereo");

    for block_size in [64, 256, 1024] {
        let (mut processor, parameters) = prepared(block_size);
        for band in Band::ALL {
            parameters.band(band).threshold.set(-24.0);
        }
        let (mut left, mut right) = signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, &n| {
                b.iter(|| {
                    let mut buffer = Buffer::new([left.as_mut_slice(), right.as_mut_slice()], n);
                    processor.process(black_box(&mut buffer));
                })
            },
        );
    }

    group.finish();
}

fn bench_automated_crossover(c: &mut Criterion) {
    let (mut processor, parameters) = prepared(512);
    let (mut left, mut right) = signal(512);
    let mut step = 0u32;

    c.bench_function("multiband_crossover_automation_512", |b| {
        b.iter(|| {
            step = step.wrapping_add(1);
            parameters
                .low_mid_crossover
                .set(200.0 + (step % 600) as f64);
            let mut buffer = Buffer::new([left.as_mut_slice(), right.as_mut_slice()], 512);
            processor.process(black_box(&mut buffer));
        })
    });
}

criterion_group!(benches, bench_block_sizes, bench_automated_crossover);
criterion_main!(benches);
