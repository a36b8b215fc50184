use super::MAX_PROBES;
use crate::candidate::{self, Candidate, UINT_MAX};
use crate::encoding::{IndexEncoding, PositionEncoding, PositionReader, TriangleIndexReader};
use crate::error::{CoreError, CoreResult};
use crate::gpu::Stream;
use crate::hash::usd_triangle;
use crate::utils::profiler::{ProfileCategory, Profiler};

/// Refines a per-vertex triangle-candidate buffer two ways (spec §4.5 triangle reuse):
///
/// - vertex-neighbour refinement (always applied): for up to [`MAX_PROBES`] of a
///   vertex's nearby vertices (`vertex_candidates`, typically the point index's own
///   candidate buffer), try that neighbour's single best candidate triangle.
/// - triangle-neighbour refinement (applied when `triangle_adjacency` is supplied):
///   for the vertex's own current best triangle `t0`, also try the triangles that
///   share an edge with it (`triangle_adjacency` is a `[m][3]` buffer, `UINT_MAX`
///   marking a boundary edge with no neighbour).
///
/// The acceptance bound is `(2 * radius)^2`, the same convention `find` uses.
#[allow(clippy::too_many_arguments)]
pub fn triangle_reuse(
    positions: &[f32],
    pos_encoding: PositionEncoding,
    indices: &[u32],
    idx_encoding: IndexEncoding,
    vertex_candidates: &[u32],
    triangle_candidates: &mut [u32],
    triangle_adjacency: Option<&[u32]>,
    radius: f32,
    stream: &mut Stream,
) -> CoreResult<()> {
    Profiler::start(ProfileCategory::TriangleReuse);

    let pos_reader = PositionReader::new(positions, pos_encoding)?;
    let tri_reader = TriangleIndexReader::new(indices, idx_encoding)?;
    let m = tri_reader.len();
    let n = pos_reader.len();
    if n == 0 {
        Profiler::end(ProfileCategory::TriangleReuse);
        stream.submit();
        return Ok(());
    }
    if triangle_candidates.len() % n != 0 {
        return Err(CoreError::BufferShapeMismatch {
            len: triangle_candidates.len(),
            divisor: n,
        });
    }
    let kt = triangle_candidates.len() / n;
    if kt == 0 {
        return Ok(());
    }
    if vertex_candidates.len() % n != 0 {
        return Err(CoreError::BufferShapeMismatch {
            len: vertex_candidates.len(),
            divisor: n,
        });
    }
    let kv = vertex_candidates.len() / n;

    if let Some(adj) = triangle_adjacency {
        if adj.len() != m * 3 {
            return Err(CoreError::BufferShapeMismatch { len: adj.len(), divisor: 3 });
        }
    }

    let diameter_sq = {
        let d = 2.0 * radius;
        d * d
    };

    let tri_dist = |query_pos: glam::Vec3, t: u32| -> Option<f32> {
        if t as usize >= m {
            return None;
        }
        let (i0, i1, i2) = tri_reader.get(t as usize);
        let v0 = pos_reader.get(i0 as usize);
        let v1 = pos_reader.get(i1 as usize);
        let v2 = pos_reader.get(i2 as usize);
        Some(usd_triangle(query_pos, v0, v1, v2))
    };

    let tri_snapshot = triangle_candidates.to_vec();

    for q in 0..n {
        let qpos = pos_reader.get(q);
        let own_tri_row = &tri_snapshot[q * kt..(q + 1) * kt];

        let mut row = candidate::seed_row(own_tri_row, |t| tri_dist(qpos, t));

        let mut try_insert = |row: &mut Vec<Candidate>, t: u32| {
            if t == UINT_MAX {
                return;
            }
            let Some(dist_sq) = tri_dist(qpos, t) else { return };
            if dist_sq > diameter_sq {
                return;
            }
            let worst = row.last().map(|c| c.dist_sq).unwrap_or(f32::INFINITY);
            if dist_sq > worst {
                return;
            }
            candidate::bounded_insert(row, Candidate { index: t, dist_sq });
        };

        if kv > 0 {
            let own_vertex_row = &vertex_candidates[q * kv..(q + 1) * kv];
            for &nb in own_vertex_row.iter().take(kv.min(MAX_PROBES)) {
                if nb == UINT_MAX || nb as usize >= n {
                    continue;
                }
                let nb_tri_row = &tri_snapshot[nb as usize * kt..(nb as usize + 1) * kt];
                if let Some(&t) = nb_tri_row.first() {
                    try_insert(&mut row, t);
                }
            }
        }

        if let Some(adj) = triangle_adjacency {
            if let Some(&t0) = own_tri_row.first() {
                if t0 != UINT_MAX {
                    let neighbours = &adj[t0 as usize * 3..t0 as usize * 3 + 3];
                    for &nbt in neighbours {
                        try_insert(&mut row, nbt);
                    }
                }
            }
        }

        candidate::write_back(&row, &mut triangle_candidates[q * kt..(q + 1) * kt]);
    }

    Profiler::end(ProfileCategory::TriangleReuse);
    stream.submit();
    Ok(())
}
