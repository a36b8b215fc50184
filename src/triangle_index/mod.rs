//! C4: the triangle spatial index (spec §4.4, §6).
//!
//! Unlike the point index, buckets are fixed-size (`bucket_size` ∈ {8, 16}) and a
//! triangle is registered in every cell its AABB overlaps, so `find` only needs to scan
//! the query's own cell rather than a 3×3×3 neighbourhood. Per-bucket fill counts are
//! generation-stamped (`step`) rather than cleared on every build: a bucket whose stamp
//! doesn't match the current `step` is treated as empty without touching its contents,
//! the same amortized-reset trick a double-buffered frame counter gives a real
//! compute-kernel pipeline that can't afford an O(capacity) clear every frame.

mod build;
mod config;
mod find;

pub use config::TriangleIndexConfig;

use crate::candidate::UINT_MAX;

pub struct TriangleSpatialIndex {
    config: TriangleIndexConfig,
    capacity: u32,
    step: u32,
    counter_gen: Vec<u32>,
    counter: Vec<u32>,
    buckets: Vec<u32>,
    m: usize,
}

impl TriangleSpatialIndex {
    pub fn new(config: TriangleIndexConfig) -> Self {
        let capacity = config.m_max.max(1) as u32;
        let bucket_size = config.bucket_size as usize;
        Self {
            config,
            capacity,
            step: 0,
            counter_gen: vec![UINT_MAX; capacity as usize],
            counter: vec![0; capacity as usize],
            buckets: vec![UINT_MAX; capacity as usize * bucket_size],
            m: 0,
        }
    }

    pub fn config(&self) -> TriangleIndexConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.m
    }

    pub fn is_empty(&self) -> bool {
        self.m == 0
    }

    /// Estimated persistent buffer footprint in bytes for a given `m_max` and bucket
    /// size (spec §6 external interface): bucket storage + per-bucket counters.
    pub fn sizeof_buffers(m_max: usize, bucket_size: u32) -> usize {
        m_max * bucket_size as usize * 4 + 2 * 4 * m_max
    }

    #[inline]
    fn bucket_count(&self, h: usize) -> usize {
        if self.counter_gen[h] == self.step {
            (self.counter[h] as usize).min(self.config.bucket_size as usize)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{IndexEncoding, PositionEncoding};
    use crate::gpu::Stream;

    fn flat(points: &[(f32, f32, f32)]) -> Vec<f32> {
        points.iter().flat_map(|&(x, y, z)| [x, y, z]).collect()
    }

    #[test]
    fn build_then_find_locates_nearby_triangle() {
        let config = TriangleIndexConfig::new(1.0, 0.5, 4, 8).unwrap();
        let mut index = TriangleSpatialIndex::new(config);
        let mut stream = Stream::new();

        let positions = flat(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);
        let indices = [0u32, 1, 2];
        index
            .build(&positions, PositionEncoding::F32x3Packed, &indices, IndexEncoding::U32x3Packed, &mut stream)
            .unwrap();
        assert_eq!(index.len(), 1);

        let query = flat(&[(0.2, 0.2, 0.05)]);
        let mut candidates = vec![UINT_MAX; 1];
        index
            .find(
                &positions,
                PositionEncoding::F32x3Packed,
                &indices,
                IndexEncoding::U32x3Packed,
                Some((&query, PositionEncoding::F32x3Packed)),
                &mut candidates,
                None,
                &mut stream,
            )
            .unwrap();

        assert_eq!(candidates[0], 0);
    }
}
