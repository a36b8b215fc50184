use broadphase_core::{PointIndexConfig, PointSpatialIndex, PositionEncoding};
use broadphase_core::gpu::Stream;
use broadphase_core::UINT_MAX;
use criterion::{criterion_group, criterion_main, Criterion};

fn scattered_positions(n: usize, spacing: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(n * 3);
    let side = (n as f32).cbrt().ceil() as usize;
    for i in 0..n {
        let x = (i % side) as f32 * spacing;
        let y = ((i / side) % side) as f32 * spacing;
        let z = (i / (side * side)) as f32 * spacing;
        out.extend_from_slice(&[x, y, z]);
    }
    out
}

fn point_index_build_and_find(c: &mut Criterion) {
    let n = 8192;
    let config = PointIndexConfig::new(1.0, 0.5, n).unwrap();
    let positions = scattered_positions(n, 0.3);

    c.bench_function("point_index_build", |b| {
        b.iter(|| {
            let mut index = PointSpatialIndex::new(config);
            let mut stream = Stream::new();
            index.build(std::hint::black_box(&positions), PositionEncoding::F32x3Packed, &mut stream).unwrap();
        });
    });

    let mut index = PointSpatialIndex::new(config);
    let mut stream = Stream::new();
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();

    c.bench_function("point_index_find", |b| {
        b.iter(|| {
            let mut candidates = vec![UINT_MAX; n * 8];
            index.find(None, std::hint::black_box(&mut candidates), None, &mut stream).unwrap();
        });
    });
}

criterion_group!(benches, point_index_build_and_find);
criterion_main!(benches);
