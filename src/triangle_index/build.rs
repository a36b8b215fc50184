use super::TriangleSpatialIndex;
use crate::candidate::UINT_MAX;
use crate::encoding::{IndexEncoding, PositionEncoding, PositionReader, TriangleIndexReader};
use crate::error::{CoreError, CoreResult};
use crate::gpu::Stream;
use crate::hash::{cell_hash, cell_range};
use crate::utils::profiler::{ProfileCategory, Profiler};
use glam::Vec3;
use tracing::{debug, warn};

impl TriangleSpatialIndex {
    /// Rebuilds the bucket hash from the current triangle set (spec §4.4): every
    /// triangle is registered once per grid cell its AABB overlaps. The per-bucket
    /// counter is bumped to the current generation (`step`) lazily — a bucket never
    /// touched this build keeps stale contents but reports a zero count.
    pub fn build(
        &mut self,
        positions: &[f32],
        pos_encoding: PositionEncoding,
        indices: &[u32],
        idx_encoding: IndexEncoding,
        stream: &mut Stream,
    ) -> CoreResult<()> {
        let pos_reader = PositionReader::new(positions, pos_encoding)?;
        let tri_reader = TriangleIndexReader::new(indices, idx_encoding)?;
        let m = tri_reader.len();
        if m > self.config.m_max {
            return Err(CoreError::CapacityExceeded {
                requested: m,
                capacity: self.config.m_max,
            });
        }

        debug!(m, capacity = self.capacity, "triangle index build");
        Profiler::start(ProfileCategory::TriangleBuild);

        self.step = self.step.wrapping_add(1);
        let cell_size = self.config.cell_size;
        let capacity = self.capacity;
        let bucket_size = self.config.bucket_size as usize;
        let mut overflowed = 0u32;

        // Processing order is rotated by `step` (spec §4.4: `g' = (step + g) mod m`) so
        // that when a bucket overflows, it is not always the same high-index triangles
        // that get dropped every frame — the loss spreads across the whole set instead.
        for t in 0..m {
            let g = (self.step as usize).wrapping_add(t) % m;
            let (i0, i1, i2) = tri_reader.get(g);
            let v0 = pos_reader.get(i0 as usize);
            let v1 = pos_reader.get(i1 as usize);
            let v2 = pos_reader.get(i2 as usize);

            let min = v0.min(v1).min(v2);
            let max = v0.max(v1).max(v2);
            let (lo, hi) = cell_range(min, max, cell_size);

            for z in lo.2..hi.2 {
                for y in lo.1..hi.1 {
                    for x in lo.0..hi.0 {
                        let h = cell_hash((x, y, z), capacity) as usize;
                        let slot = self.fetch_add(h);
                        if slot < bucket_size {
                            self.buckets[h * bucket_size + slot] = g as u32;
                        } else {
                            overflowed += 1;
                        }
                    }
                }
            }
        }

        if overflowed > 0 {
            warn!(overflowed, bucket_size, "triangle bucket overflow, dropped entries");
        }

        self.m = m;
        Profiler::end(ProfileCategory::TriangleBuild);
        stream.submit();
        Ok(())
    }

    fn fetch_add(&mut self, h: usize) -> usize {
        if self.counter_gen[h] != self.step {
            self.counter_gen[h] = self.step;
            self.counter[h] = 0;
        }
        let slot = self.counter[h];
        self.counter[h] += 1;
        slot as usize
    }
}
