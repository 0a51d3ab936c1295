use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ndarray::prelude::*;
use ndarray_pad::*;
use ndarray_rand::{rand_distr::Uniform, RandomExt};

fn criterion_benchmark(c: &mut Criterion) {
    let x = Array::random((64, 256, 256), Uniform::new(0f32, 1.));
    let padding = [[2, 2], [8, 8], [8, 8]];

    for strategy in Strategy::ALL {
        let options = PadOptions::default().with_strategy(strategy);
        c.bench_function(&format!("reflect_{strategy:?}"), |b| {
            b.iter(|| black_box(x.pad_with(PaddingMode::Reflect, padding, &options)))
        });
    }

    c.bench_function("circular_batched", |b| {
        b.iter(|| black_box(x.pad(PaddingMode::Circular, padding)))
    });

    c.bench_function("reference", |b| {
        b.iter(|| black_box(reference(&x, PaddingMode::Reflect, padding)))
    });

    let wide = Array::random((4, 1 << 20), Uniform::new(0f32, 1.));
    let options = PadOptions::default().with_strategy(Strategy::RowStream);
    c.bench_function("row_stream_wide", |b| {
        b.iter(|| black_box(wide.pad_with(PaddingMode::Zeros, [[0, 0], [100, 3]], &options)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
