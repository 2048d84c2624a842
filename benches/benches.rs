use bevy::math::IVec2;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use bevy_flowcache::prelude::*;

/// Packed grid with a vertical wall every 16 columns, each with a single gap.
fn walled_grid(width: usize, height: usize) -> Vec<u8> {
    let bytes_per_row = width / 2;
    let mut data = vec![0x11u8; bytes_per_row * height];

    for x in (8..width).step_by(16) {
        let gap = (x * 7) % height;
        for y in (0..height).filter(|&y| y != gap) {
            let byte = &mut data[y * bytes_per_row + x / 2];
            *byte &= if x & 1 == 0 { 0xF0 } else { 0x0F };
        }
    }

    data
}

fn build_and_wait(cache: &FlowFieldCache, target: IVec2) {
    cache.ensure_field(target);
    while !cache.is_field_ready(target) {
        std::thread::yield_now();
    }
}

fn benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("flowfield");
    group.sample_size(10);

    let open = vec![0x11u8; 128 * 256];
    group.bench_function("decode_grid_256x256", |b| {
        b.iter(|| WalkableGrid::from_packed(black_box(&open), 128))
    });

    for (name, data) in [("open", open.clone()), ("walled", walled_grid(256, 256))] {
        group.bench_function(format!("build_field_256x256_{name}"), |b| {
            b.iter(|| {
                let cache = FlowFieldCache::from_packed(&data, 128).unwrap();
                build_and_wait(&cache, IVec2::new(203, 180));
            })
        });
    }

    let cache = FlowFieldCache::from_packed(&walled_grid(512, 512), 256).unwrap();
    let target = IVec2::new(500, 500);
    build_and_wait(&cache, target);

    group.bench_function("walk_path_512x512", |b| {
        b.iter(|| cache.try_get_path_default(black_box(IVec2::new(3, 3)), target))
    });

    group.finish();
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
