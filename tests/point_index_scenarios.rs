use broadphase_core::gpu::Stream;
use broadphase_core::{PointIndexConfig, PointSpatialIndex, PositionEncoding, UINT_MAX};

fn flat(points: &[(f32, f32, f32)]) -> Vec<f32> {
    points.iter().flat_map(|&(x, y, z)| [x, y, z]).collect()
}

fn row(candidates: &[u32], k: usize, q: usize) -> &[u32] {
    &candidates[q * k..(q + 1) * k]
}

#[test]
fn closest_pair_on_a_line_finds_each_other_first() {
    // five points spaced 0.5 apart on the x-axis; every interior point's nearest
    // neighbour should be whichever of its two line-neighbours is present.
    let points: Vec<(f32, f32, f32)> = (0..5).map(|i| (i as f32 * 0.5, 0.0, 0.0)).collect();
    let positions = flat(&points);

    let config = PointIndexConfig::new(1.0, 0.5, points.len()).unwrap();
    let mut index = PointSpatialIndex::new(config);
    let mut stream = Stream::new();
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();

    let k = 2;
    let mut candidates = vec![UINT_MAX; points.len() * k];
    index.find(None, &mut candidates, None, &mut stream).unwrap();

    // point 2 (middle) has neighbours 1 and 3, both at distance 0.5.
    let r = row(&candidates, k, 2);
    assert!(r.contains(&1));
    assert!(r.contains(&3));
}

#[test]
fn tight_cells_do_not_miss_neighbours_across_a_cell_boundary() {
    // two points straddling a cell boundary, cell_size == radius so they fall in
    // adjacent cells; the 27-cell neighbourhood search must still find the pair.
    let points = [(0.99, 0.0, 0.0), (1.01, 0.0, 0.0)];
    let positions = flat(&points);

    let config = PointIndexConfig::new(1.0, 0.5, points.len()).unwrap();
    let mut index = PointSpatialIndex::new(config);
    let mut stream = Stream::new();
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();

    let mut candidates = vec![UINT_MAX; points.len()];
    index.find(None, &mut candidates, None, &mut stream).unwrap();

    assert_eq!(candidates[0], 1);
    assert_eq!(candidates[1], 0);
}

#[test]
fn self_query_excludes_the_query_point_itself() {
    let points = [(0.0, 0.0, 0.0), (0.2, 0.0, 0.0)];
    let positions = flat(&points);

    let config = PointIndexConfig::new(1.0, 0.5, points.len()).unwrap();
    let mut index = PointSpatialIndex::new(config);
    let mut stream = Stream::new();
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();

    let mut candidates = vec![UINT_MAX; points.len()];
    index.find(None, &mut candidates, None, &mut stream).unwrap();

    assert_ne!(candidates[0], 0);
    assert_ne!(candidates[1], 1);
}

#[test]
fn connected_vertex_exclusion_skips_listed_indices() {
    // three colocated-ish points; point 0's only candidates are 1 and 2, but 1 is
    // listed as topologically connected and must be excluded.
    let points = [(0.0, 0.0, 0.0), (0.1, 0.0, 0.0), (0.2, 0.0, 0.0)];
    let positions = flat(&points);

    let config = PointIndexConfig::new(1.0, 0.5, points.len()).unwrap();
    let mut index = PointSpatialIndex::new(config);
    let mut stream = Stream::new();
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();

    let k = 1;
    let mut candidates = vec![UINT_MAX; points.len() * k];
    let connected = vec![1u32, UINT_MAX, UINT_MAX]; // only point 0 excludes point 1
    index.find(None, &mut candidates, Some(&connected), &mut stream).unwrap();

    assert_eq!(candidates[0], 2);
}

#[test]
fn candidates_are_sorted_ascending_by_distance() {
    let points = [
        (0.0, 0.0, 0.0),
        (0.3, 0.0, 0.0),
        (0.1, 0.0, 0.0),
        (0.2, 0.0, 0.0),
    ];
    let positions = flat(&points);

    let config = PointIndexConfig::new(1.0, 0.5, points.len()).unwrap();
    let mut index = PointSpatialIndex::new(config);
    let mut stream = Stream::new();
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();

    let k = 3;
    let mut candidates = vec![UINT_MAX; points.len() * k];
    index.find(None, &mut candidates, None, &mut stream).unwrap();

    let r = row(&candidates, k, 0);
    assert_eq!(r, &[2, 3, 1]);
}

#[test]
fn distance_bound_excludes_points_beyond_the_diameter() {
    let points = [(0.0, 0.0, 0.0), (10.0, 10.0, 10.0)];
    let positions = flat(&points);

    let config = PointIndexConfig::new(1.0, 0.25, points.len()).unwrap();
    let mut index = PointSpatialIndex::new(config);
    let mut stream = Stream::new();
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();

    let mut candidates = vec![UINT_MAX; points.len()];
    index.find(None, &mut candidates, None, &mut stream).unwrap();

    assert_eq!(candidates[0], UINT_MAX);
    assert_eq!(candidates[1], UINT_MAX);
}

#[test]
fn rebuild_is_idempotent_for_an_unchanged_point_set() {
    let points = [(0.0, 0.0, 0.0), (0.3, 0.1, 0.0), (1.0, 1.0, 1.0)];
    let positions = flat(&points);

    let config = PointIndexConfig::new(1.0, 0.5, points.len()).unwrap();
    let mut index = PointSpatialIndex::new(config);
    let mut stream = Stream::new();

    let k = 2;
    let mut first = vec![UINT_MAX; points.len() * k];
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();
    index.find(None, &mut first, None, &mut stream).unwrap();

    let mut second = vec![UINT_MAX; points.len() * k];
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();
    index.find(None, &mut second, None, &mut stream).unwrap();

    assert_eq!(first, second);
}

#[test]
fn a_ring_of_one_hundred_points_finds_its_angular_neighbours() {
    let n = 100;
    let radius = 10.0;
    let points: Vec<(f32, f32, f32)> = (0..n)
        .map(|i| {
            let theta = (i as f32 / n as f32) * std::f32::consts::TAU;
            (radius * theta.cos(), radius * theta.sin(), 0.0)
        })
        .collect();
    let positions = flat(&points);

    // chord between adjacent ring points ~= 2*pi*10/100 = 0.628; cell_size/radius
    // chosen generously above that.
    let config = PointIndexConfig::new(2.0, 1.0, n).unwrap();
    let mut index = PointSpatialIndex::new(config);
    let mut stream = Stream::new();
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();

    let k = 2;
    let mut candidates = vec![UINT_MAX; n * k];
    index.find(None, &mut candidates, None, &mut stream).unwrap();

    // every point's two found neighbours should be its immediate ring neighbours.
    for i in 0..n {
        let prev = (i + n - 1) % n;
        let next = (i + 1) % n;
        let r = row(&candidates, k, i);
        assert!(r.contains(&(prev as u32)), "point {i} missing prev neighbour");
        assert!(r.contains(&(next as u32)), "point {i} missing next neighbour");
    }
}

#[test]
fn external_query_does_not_apply_self_exclusion() {
    let points = [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)];
    let positions = flat(&points);

    let config = PointIndexConfig::new(1.0, 0.5, points.len()).unwrap();
    let mut index = PointSpatialIndex::new(config);
    let mut stream = Stream::new();
    index.build(&positions, PositionEncoding::F32x3Packed, &mut stream).unwrap();

    // query the exact location of indexed point 0 from an external buffer.
    let queries = flat(&[(0.0, 0.0, 0.0)]);
    let mut candidates = vec![UINT_MAX; 1];
    index
        .find(Some((&queries, PositionEncoding::F32x3Packed)), &mut candidates, None, &mut stream)
        .unwrap();

    assert_eq!(candidates[0], 0);
}

#[test]
fn mixed_encodings_agree_on_positions() {
    let packed = [0.0f32, 0.0, 0.0, 0.2, 0.0, 0.0];
    let padded = [0.0f32, 0.0, 0.0, 99.0, 0.2, 0.0, 0.0, 99.0];

    let config = PointIndexConfig::new(1.0, 0.5, 2).unwrap();
    let mut a = PointSpatialIndex::new(config);
    let mut b = PointSpatialIndex::new(config);
    let mut stream = Stream::new();

    a.build(&packed, PositionEncoding::F32x3Packed, &mut stream).unwrap();
    b.build(&padded, PositionEncoding::F32x4Padded, &mut stream).unwrap();

    let mut ca = vec![UINT_MAX; 2];
    let mut cb = vec![UINT_MAX; 2];
    a.find(None, &mut ca, None, &mut stream).unwrap();
    b.find(None, &mut cb, None, &mut stream).unwrap();

    assert_eq!(ca, cb);
}
