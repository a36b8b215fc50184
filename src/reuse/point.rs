use super::MAX_PROBES;
use crate::candidate::{self, Candidate, UINT_MAX};
use crate::encoding::{PositionEncoding, PositionReader};
use crate::error::{CoreError, CoreResult};
use crate::gpu::Stream;
use crate::utils::profiler::{ProfileCategory, Profiler};

/// Refines a point-index candidate buffer using each query's own current neighbours as
/// probes: for up to [`MAX_PROBES`] of a query's nearest candidates, fold that
/// candidate's own candidate row into the query's row (spec §4.5 point reuse).
///
/// `candidates` is a `[n][K]` buffer already populated by [`crate::point_index`]'s
/// `find` in self-query mode — reuse only makes sense when every row's source index
/// set and the query set are the same buffer. The acceptance bound is
/// `(cell_size * spacing_scale)^2`, independent of the index's own `(2 * radius)^2`
/// bound, since reuse is explicitly allowed to look slightly further than the original
/// search radius to catch second-degree neighbours.
pub fn point_reuse(
    positions: &[f32],
    pos_encoding: PositionEncoding,
    candidates: &mut [u32],
    cell_size: f32,
    spacing_scale: f32,
    stream: &mut Stream,
) -> CoreResult<()> {
    Profiler::start(ProfileCategory::PointReuse);

    let reader = PositionReader::new(positions, pos_encoding)?;
    let n = reader.len();
    if n == 0 {
        Profiler::end(ProfileCategory::PointReuse);
        stream.submit();
        return Ok(());
    }
    if candidates.len() % n != 0 {
        return Err(CoreError::BufferShapeMismatch {
            len: candidates.len(),
            divisor: n,
        });
    }
    let k = candidates.len() / n;
    if k == 0 {
        return Ok(());
    }

    let bound_sq = {
        let d = cell_size * spacing_scale;
        d * d
    };
    let snapshot = candidates.to_vec();
    let probe_count = k.min(MAX_PROBES);

    for q in 0..n {
        let qpos = reader.get(q);
        let own_row = &snapshot[q * k..(q + 1) * k];

        let mut row = candidate::seed_row(own_row, |idx| {
            if idx as usize >= n {
                return None;
            }
            Some(reader.get(idx as usize).distance_squared(qpos))
        });

        for &nb in own_row.iter().take(probe_count) {
            if nb == UINT_MAX || nb as usize == q {
                continue;
            }
            let nb_row = &snapshot[nb as usize * k..(nb as usize + 1) * k];
            for &cand in nb_row.iter().take(k.min(4)) {
                if cand == UINT_MAX || cand as usize == q {
                    continue;
                }
                let cand_pos = reader.get(cand as usize);
                let dist_sq = qpos.distance_squared(cand_pos);
                if dist_sq > bound_sq {
                    continue;
                }
                let worst = row.last().map(|c| c.dist_sq).unwrap_or(f32::INFINITY);
                if dist_sq > worst {
                    continue;
                }
                candidate::bounded_insert(&mut row, Candidate { index: cand, dist_sq });
            }
        }

        candidate::write_back(&row, &mut candidates[q * k..(q + 1) * k]);
    }

    Profiler::end(ProfileCategory::PointReuse);
    stream.submit();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::UINT_MAX;
    use crate::gpu::Stream;

    fn flat(points: &[(f32, f32, f32)]) -> Vec<f32> {
        points.iter().flat_map(|&(x, y, z)| [x, y, z]).collect()
    }

    #[test]
    fn reuse_pulls_in_a_second_degree_neighbour() {
        // three points roughly in a line; 0's only seeded neighbour is 1, but 1's own
        // neighbour 2 should be recoverable through the reuse pass.
        let positions = flat(&[(0.0, 0.0, 0.0), (0.4, 0.0, 0.0), (0.8, 0.0, 0.0)]);
        let mut stream = Stream::new();

        // candidates[0] = [1, UINT_MAX], candidates[1] = [0, 2] (or [2,0]),
        // candidates[2] = [1, UINT_MAX]
        let mut candidates = vec![1u32, UINT_MAX, 0u32, 2u32, 1u32, UINT_MAX];

        point_reuse(&positions, PositionEncoding::F32x3Packed, &mut candidates, 1.0, 2.0, &mut stream).unwrap();

        // query 0's row should now include point 2, recovered via neighbour 1.
        assert!(candidates[0..2].contains(&2));
    }
}
