use super::PointSpatialIndex;
use crate::candidate::UINT_MAX;
use crate::encoding::{PositionEncoding, PositionReader};
use crate::error::{CoreError, CoreResult};
use crate::gpu::{Stream, ThreadgroupWidth};
use crate::half_pos::HalfVec3;
use crate::hash::{cell_coord, cell_hash};
use crate::sort::{self, SENTINEL};
use crate::utils::profiler::{ProfileCategory, Profiler};
use tracing::debug;

impl PointSpatialIndex {
    /// Rebuilds the index from `positions` (spec §4.3 build pipeline):
    /// 1. reset the hash table to the empty sentinel,
    /// 2. mirror positions to half precision,
    /// 3. hash every point into `(hash, original_index)`,
    /// 4. bitonic-sort the table by hash,
    /// 5. reorder the half-position mirror into sorted-table order,
    /// 6. sweep the sorted table once to derive cell start/end boundaries.
    pub fn build(&mut self, positions: &[f32], encoding: PositionEncoding, stream: &mut Stream) -> CoreResult<()> {
        let reader = PositionReader::new(positions, encoding)?;
        let n = reader.len();
        if n > self.config.n_max {
            return Err(CoreError::CapacityExceeded {
                requested: n,
                capacity: self.config.n_max,
            });
        }

        debug!(n, n_pad = self.n_pad, capacity = self.capacity, "point index build");
        Profiler::start(ProfileCategory::PointBuild);

        for slot in self.hash_table.iter_mut() {
            *slot = SENTINEL;
        }

        if n == 0 {
            self.n = 0;
            Profiler::end(ProfileCategory::PointBuild);
            stream.submit();
            return Ok(());
        }

        for i in 0..n {
            self.half_positions[i] = HalfVec3::from_vec3(reader.get(i));
        }

        let capacity = self.capacity;
        let cell_size = self.config.cell_size;
        for i in 0..n {
            let cell = cell_coord(reader.get(i), cell_size);
            let h = cell_hash(cell, capacity);
            self.hash_table[i] = (h, i as u32);
        }

        Profiler::start(ProfileCategory::PointSort);
        sort::sort_in_place(&mut self.hash_table, ThreadgroupWidth::DEFAULT);
        Profiler::end(ProfileCategory::PointSort);

        for i in 0..n {
            let payload = self.hash_table[i].1 as usize;
            self.sorted_half[i] = self.half_positions[payload];
        }

        Profiler::start(ProfileCategory::PointCellBoundaries);
        for slot in self.start.iter_mut() {
            *slot = UINT_MAX;
        }
        for slot in self.end.iter_mut() {
            *slot = UINT_MAX;
        }
        for gid in 0..n {
            let h = self.hash_table[gid].0 as usize;
            if gid == 0 || self.hash_table[gid].0 != self.hash_table[gid - 1].0 {
                self.start[h] = gid as u32;
                if gid > 0 {
                    let prev_h = self.hash_table[gid - 1].0 as usize;
                    self.end[prev_h] = gid as u32;
                }
            }
            if gid == n - 1 {
                self.end[h] = gid as u32 + 1;
            }
        }
        Profiler::end(ProfileCategory::PointCellBoundaries);

        self.n = n;
        Profiler::end(ProfileCategory::PointBuild);
        stream.submit();
        Ok(())
    }
}
