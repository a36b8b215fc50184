use super::TriangleSpatialIndex;
use crate::candidate::{self, Candidate, UINT_MAX};
use crate::encoding::{IndexEncoding, PositionEncoding, PositionReader, TriangleIndexReader};
use crate::error::{CoreError, CoreResult};
use crate::gpu::Stream;
use crate::hash::{cell_coord, cell_hash, usd_triangle};
use crate::utils::profiler::{ProfileCategory, Profiler};

impl TriangleSpatialIndex {
    /// Finds, for every query, up to `K` nearest triangles within `(2 * radius)^2`
    /// (spec §4.4). Unlike the point index, only the query's own cell is scanned —
    /// every triangle overlapping a neighbouring cell is already registered in any cell
    /// its AABB touches, so a triangle close enough to matter is always found there.
    ///
    /// `queries = None` queries every vertex of the current mesh (`positions`) against
    /// the triangle set, with self-exclusion (a vertex's own incident faces are never
    /// returned as its nearest triangles); `Some((data, encoding))` queries an external
    /// point set, where self-exclusion does not apply. `connected_vertices` is an
    /// optional row-major `[query][W]` buffer of vertex indices (e.g. topologically
    /// adjacent vertices); any candidate triangle with a vertex in that row is skipped,
    /// in either mode.
    pub fn find(
        &mut self,
        positions: &[f32],
        pos_encoding: PositionEncoding,
        indices: &[u32],
        idx_encoding: IndexEncoding,
        queries: Option<(&[f32], PositionEncoding)>,
        candidates: &mut [u32],
        connected_vertices: Option<&[u32]>,
        stream: &mut Stream,
    ) -> CoreResult<()> {
        Profiler::start(ProfileCategory::TriangleFind);

        let pos_reader = PositionReader::new(positions, pos_encoding)?;
        let tri_reader = TriangleIndexReader::new(indices, idx_encoding)?;

        let (query_reader, n_query) = match queries {
            Some((data, encoding)) => {
                let reader = PositionReader::new(data, encoding)?;
                let len = reader.len();
                (Some(reader), len)
            }
            None => (None, pos_reader.len()),
        };

        if n_query == 0 {
            Profiler::end(ProfileCategory::TriangleFind);
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
        let w = match connected_vertices {
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
        let diameter_sq = self.config.diameter_sq();
        let bucket_size = self.config.bucket_size as usize;

        for q in 0..n_query {
            let query_pos = match &query_reader {
                Some(r) => r.get(q),
                None => pos_reader.get(q),
            };
            // Self-exclusion only applies when the query *is* vertex `q`.
            let self_vertex: Option<u32> = if query_reader.is_none() { Some(q as u32) } else { None };
            let connected_row: &[u32] = match connected_vertices {
                Some(rows) => &rows[q * w..(q + 1) * w],
                None => &[],
            };

            let out_row = &mut candidates[q * k..(q + 1) * k];
            let tri_reader_ref = &tri_reader;
            let pos_reader_ref = &pos_reader;
            let mut row = candidate::seed_row(out_row, |idx| {
                if idx as usize >= tri_reader_ref.len() {
                    return None;
                }
                let (i0, i1, i2) = tri_reader_ref.get(idx as usize);
                let v0 = pos_reader_ref.get(i0 as usize);
                let v1 = pos_reader_ref.get(i1 as usize);
                let v2 = pos_reader_ref.get(i2 as usize);
                Some(usd_triangle(query_pos, v0, v1, v2))
            });

            let cell = cell_coord(query_pos, cell_size);
            let h = cell_hash(cell, self.capacity) as usize;
            let count = self.bucket_count(h);

            for slot in 0..count {
                let t = self.buckets[h * bucket_size + slot];
                if t == UINT_MAX {
                    continue;
                }
                let (i0, i1, i2) = tri_reader.get(t as usize);
                if let Some(sv) = self_vertex {
                    if i0 == sv || i1 == sv || i2 == sv {
                        continue;
                    }
                }
                if connected_row.contains(&i0) || connected_row.contains(&i1) || connected_row.contains(&i2) {
                    continue;
                }
                let v0 = pos_reader.get(i0 as usize);
                let v1 = pos_reader.get(i1 as usize);
                let v2 = pos_reader.get(i2 as usize);
                let dist_sq = usd_triangle(query_pos, v0, v1, v2);
                if dist_sq > diameter_sq {
                    continue;
                }
                let worst = row.last().map(|c| c.dist_sq).unwrap_or(f32::INFINITY);
                if dist_sq > worst {
                    continue;
                }
                candidate::bounded_insert(&mut row, Candidate { index: t, dist_sq });
            }

            candidate::write_back(&row, out_row);
        }

        Profiler::end(ProfileCategory::TriangleFind);
        stream.submit();
        Ok(())
    }
}
