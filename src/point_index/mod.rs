//! C3: the point spatial index (spec §4.3, §6).
//!
//! Three buffers persist across calls: a sorted `(hash, payload)` table, a pair of
//! cell-boundary arrays sized to `capacity = 2 * n_max` (the load factor the spec fixes
//! to keep expected bucket occupancy low), and two half-precision position mirrors —
//! one indexed by original source index (`half_positions`, used to re-derive distances
//! for reuse-seeded candidates), one indexed by sorted-table position (`sorted_half`,
//! used by the cell walk in `find`).

mod build;
mod config;
mod find;

pub use config::PointIndexConfig;

use crate::candidate::UINT_MAX;
use crate::half_pos::HalfVec3;
use crate::sort::HashPayload;

/// Spatial index over a bounded set of points, rebuilt once per frame and queried any
/// number of times against either itself or an external query set (spec §4.3).
pub struct PointSpatialIndex {
    config: PointIndexConfig,
    capacity: u32,
    n_pad: usize,
    n: usize,
    hash_table: Vec<HashPayload>,
    start: Vec<u32>,
    end: Vec<u32>,
    half_positions: Vec<HalfVec3>,
    sorted_half: Vec<HalfVec3>,
}

impl PointSpatialIndex {
    pub fn new(config: PointIndexConfig) -> Self {
        let n_max = config.n_max;
        let capacity = (2 * n_max).max(1) as u32;
        let n_pad = crate::utils::next_pow2(n_max.max(1));
        Self {
            config,
            capacity,
            n_pad,
            n: 0,
            hash_table: vec![(UINT_MAX, UINT_MAX); n_pad],
            start: vec![UINT_MAX; capacity as usize],
            end: vec![UINT_MAX; capacity as usize],
            half_positions: vec![HalfVec3::default(); n_max],
            sorted_half: vec![HalfVec3::default(); n_max],
        }
    }

    pub fn config(&self) -> PointIndexConfig {
        self.config
    }

    /// Number of points ingested by the most recent `build`.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Estimated persistent buffer footprint in bytes for a given `n_max` (spec §6
    /// external interface): cell-start + cell-end + hash-table + half-position mirror.
    pub fn sizeof_buffers(n_max: usize) -> usize {
        2 * 4 * n_max + 2 * 4 * n_max + 16 * n_max + 6 * n_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::PositionEncoding;
    use crate::gpu::Stream;

    fn flat(points: &[(f32, f32, f32)]) -> Vec<f32> {
        points.iter().flat_map(|&(x, y, z)| [x, y, z]).collect()
    }

    #[test]
    fn build_then_self_find_returns_nearest_neighbours() {
        let config = PointIndexConfig::new(1.0, 0.5, 8).unwrap();
        let mut index = PointSpatialIndex::new(config);
        let mut stream = Stream::new();

        let points = flat(&[(0.0, 0.0, 0.0), (0.1, 0.0, 0.0), (5.0, 5.0, 5.0)]);
        index.build(&points, PositionEncoding::F32x3Packed, &mut stream).unwrap();
        assert_eq!(index.len(), 3);

        let mut candidates = vec![UINT_MAX; 3 * 2];
        index.find(None, &mut candidates, None, &mut stream).unwrap();

        // point 0's nearest neighbour (excluding itself) should be point 1.
        assert_eq!(candidates[0], 1);
    }

    #[test]
    fn find_rejects_candidate_buffer_not_shaped_to_query_count() {
        let config = PointIndexConfig::new(1.0, 0.5, 4).unwrap();
        let mut index = PointSpatialIndex::new(config);
        let mut stream = Stream::new();
        let points = flat(&[(0.0, 0.0, 0.0), (1.0, 1.0, 1.0)]);
        index.build(&points, PositionEncoding::F32x3Packed, &mut stream).unwrap();

        let mut candidates = vec![UINT_MAX; 5];
        assert!(index.find(None, &mut candidates, None, &mut stream).is_err());
    }
}
