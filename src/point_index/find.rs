use super::PointSpatialIndex;
use crate::candidate::{self, Candidate, UINT_MAX};
use crate::encoding::{PositionEncoding, PositionReader};
use crate::error::{CoreError, CoreResult};
use crate::gpu::Stream;
use crate::hash::{cell_coord, cell_hash, sds_box};
use crate::utils::profiler::{ProfileCategory, Profiler};
use glam::Vec3;

/// Entries scanned per cell is capped at 32 even when a bucket overflows that
/// (spec §4.3 find pipeline: "walk entries i in [start, min(end, start + 32))").
const MAX_SCAN_PER_CELL: u32 = 32;

impl PointSpatialIndex {
    /// Finds, for every query, up to `K` nearest indexed points within `(2 * radius)^2`
    /// (spec §4.3, §9 open question on the radius convention).
    ///
    /// `external` is `Some((positions, encoding))` to query against an outside point
    /// set, or `None` to query every indexed point against itself (with self-exclusion).
    /// `candidates` is the caller's row-major `[query][K]` buffer, read as the reuse
    /// seed and overwritten with the refined result. `connected` is an optional
    /// row-major `[query][V]` buffer of indices to exclude (e.g. mesh-adjacent
    /// vertices), only meaningful in self-query mode.
    pub fn find(
        &mut self,
        external: Option<(&[f32], PositionEncoding)>,
        candidates: &mut [u32],
        connected: Option<&[u32]>,
        stream: &mut Stream,
    ) -> CoreResult<()> {
        Profiler::start(ProfileCategory::PointFind);

        let (reader, n_query) = match external {
            Some((data, encoding)) => {
                let reader = PositionReader::new(data, encoding)?;
                let len = reader.len();
                (Some(reader), len)
            }
            None => (None, self.n),
        };

        if n_query == 0 {
            Profiler::end(ProfileCategory::PointFind);
            stream.submit();
            return Ok(());
        }
        if candidates.len() % n_query != 0 {
            return Err(CoreError::BufferShapeMismatch {
                len: candidates.len(),
                divisor: n_query,
            });
        }
        let k = candidates.len() / n_query;
        if k == 0 || k > 32 {
            return Err(CoreError::CapacityExceeded { requested: k, capacity: 32 });
        }

        let v = match connected {
            Some(rows) => {
                if rows.len() % n_query != 0 {
                    return Err(CoreError::BufferShapeMismatch {
                        len: rows.len(),
                        divisor: n_query,
                    });
                }
                rows.len() / n_query
            }
            None => 0,
        };

        let cell_size = self.config.cell_size;
        let half_extent = cell_size * 0.5;
        let diameter_sq = self.config.diameter_sq();

        for q in 0..n_query {
            let (query_pos, self_index) = match &reader {
                Some(r) => (r.get(q), None),
                None => (self.sorted_half[q].to_vec3(), Some(self.hash_table[q].1)),
            };

            let connected_row: &[u32] = match connected {
                Some(rows) => &rows[q * v..(q + 1) * v],
                None => &[],
            };

            let out_row = &mut candidates[q * k..(q + 1) * k];
            let half_positions = &self.half_positions;
            let mut row = candidate::seed_row(out_row, |idx| {
                half_positions
                    .get(idx as usize)
                    .map(|h| h.to_vec3().distance_squared(query_pos))
            });

            let (cx, cy, cz) = cell_coord(query_pos, cell_size);
            for dz in -1..=1i32 {
                for dy in -1..=1i32 {
                    for dx in -1..=1i32 {
                        let cell = (cx + dx, cy + dy, cz + dz);
                        let cell_centre = Vec3::new(
                            (cell.0 as f32 + 0.5) * cell_size,
                            (cell.1 as f32 + 0.5) * cell_size,
                            (cell.2 as f32 + 0.5) * cell_size,
                        );
                        if sds_box(cell_centre - query_pos, half_extent) > diameter_sq {
                            continue;
                        }

                        let h = cell_hash(cell, self.capacity) as usize;
                        let start = self.start[h];
                        if start == UINT_MAX {
                            continue;
                        }
                        let end = self.end[h];
                        let scan_end = end.min(start + MAX_SCAN_PER_CELL);

                        for i in start..scan_end {
                            let payload = self.hash_table[i as usize].1;
                            if let Some(self_idx) = self_index {
                                if payload == self_idx {
                                    continue;
                                }
                            }
                            if connected_row.contains(&payload) {
                                continue;
                            }
                            let cand_pos = self.sorted_half[i as usize].to_vec3();
                            let dist_sq = query_pos.distance_squared(cand_pos);
                            if dist_sq > diameter_sq {
                                continue;
                            }
                            let worst = row.last().map(|c| c.dist_sq).unwrap_or(f32::INFINITY);
                            if dist_sq > worst {
                                continue;
                            }
                            candidate::bounded_insert(&mut row, Candidate { index: payload, dist_sq });
                        }
                    }
                }
            }

            candidate::write_back(&row, out_row);
        }

        Profiler::end(ProfileCategory::PointFind);
        stream.submit();
        Ok(())
    }
}
