// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the raster compositor. Copies a US Letter page at
// 2x scale (1224x1584) with padded source rows into RGB and RGBA targets.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use psview_core::{ChannelLayout, SourceRaster, TargetSurface};
use psview_render::composite;

const WIDTH: u32 = 1224;
const HEIGHT: u32 = 1584;
const SOURCE_STRIDE: usize = WIDTH as usize * 4 + 64;

fn source() -> SourceRaster {
    let data: Vec<u8> = (0..SOURCE_STRIDE * HEIGHT as usize)
        .map(|i| (i % 251) as u8)
        .collect();
    SourceRaster::new(WIDTH, HEIGHT, SOURCE_STRIDE, data).expect("valid source")
}

fn bench_composite(c: &mut Criterion) {
    let template = source();

    for layout in [ChannelLayout::Rgb, ChannelLayout::Rgba] {
        let mut buffer = vec![0u8; WIDTH as usize * HEIGHT as usize * layout.channel_count()];
        c.bench_function(&format!("composite letter@2x ({layout:?})"), |b| {
            b.iter(|| {
                let mut target =
                    TargetSurface::packed(WIDTH, HEIGHT, layout, &mut buffer).expect("target");
                composite(black_box(template.clone()), &mut target).expect("composite");
            });
        });
    }
}

criterion_group!(benches, bench_composite);
criterion_main!(benches);
