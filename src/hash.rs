//! C1: cell-coordinate hashing and squared-distance primitives.
//!
//! The three hash constants and the `(2r)²` pruning convention are fixed points:
//! changing either would break bit-reproducibility of the candidate lists tests assert
//! on (spec §4.1, §9 open question on the radius convention).

use glam::Vec3;

/// Integer cell coordinate: component-wise floor of `position / cell_size`.
#[inline]
pub fn cell_coord(p: Vec3, cell_size: f32) -> (i32, i32, i32) {
    (
        (p.x / cell_size).floor() as i32,
        (p.y / cell_size).floor() as i32,
        (p.z / cell_size).floor() as i32,
    )
}

/// Min/max (exclusive) cell coordinates covering an AABB. The max corner is floored
/// then bumped by one cell rather than ceil'd, so a flat or axis-aligned triangle whose
/// extent lands exactly on a cell boundary still spans at least one cell along every
/// axis (spec §4.4 build step).
#[inline]
pub fn cell_range(min: Vec3, max: Vec3, cell_size: f32) -> ((i32, i32, i32), (i32, i32, i32)) {
    let lo = cell_coord(min, cell_size);
    let hi_inclusive = cell_coord(max, cell_size);
    let hi = (hi_inclusive.0 + 1, hi_inclusive.1 + 1, hi_inclusive.2 + 1);
    (lo, hi)
}

const P1: i64 = 92_837_111;
const P2: i64 = 689_287_499;
const P3: i64 = 283_923_481;

/// Cell hash: `(x·P1) XOR (y·P2) XOR (z·P3)`, reduced into `[0, capacity)`.
/// Negative coordinates are supported; no shift is applied before the XOR.
#[inline]
pub fn cell_hash(cell: (i32, i32, i32), capacity: u32) -> u32 {
    let (x, y, z) = cell;
    let h = (x as i64).wrapping_mul(P1) ^ (y as i64).wrapping_mul(P2) ^ (z as i64).wrapping_mul(P3);
    (h.unsigned_abs() % capacity as u64) as u32
}

/// Squared distance from `q` (a vector already relative to the box centre) to an
/// axis-aligned box of half-extent `half_extent`, using the classic
/// `|max(q,0)|² + min(max(qx,qy,qz), 0)` formulation.
#[inline]
pub fn sds_box(q: Vec3, half_extent: f32) -> f32 {
    let d = Vec3::new(
        q.x.abs() - half_extent,
        q.y.abs() - half_extent,
        q.z.abs() - half_extent,
    );
    let outside = d.max(Vec3::ZERO);
    let inside_term = d.x.max(d.y).max(d.z).min(0.0);
    outside.length_squared() + inside_term
}

/// Unsigned squared distance from a point to a triangle (Inigo Quilez's formulation).
pub fn usd_triangle(p: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> f32 {
    let ba = v1 - v0;
    let pa = p - v0;
    let cb = v2 - v1;
    let pb = p - v1;
    let ac = v0 - v2;
    let pc = p - v2;
    let n = ba.cross(ac);

    let on_edges = (ba.cross(n).dot(pa).signum() + cb.cross(n).dot(pb).signum() + ac.cross(n).dot(pc).signum()) < 2.0;

    if on_edges {
        let d0 = edge_dist_sq(ba, pa);
        let d1 = edge_dist_sq(cb, pb);
        let d2 = edge_dist_sq(ac, pc);
        d0.min(d1).min(d2)
    } else {
        let n_dot_pa = n.dot(pa);
        (n_dot_pa * n_dot_pa) / n.length_squared()
    }
}

#[inline]
fn edge_dist_sq(edge: Vec3, to_point: Vec3) -> f32 {
    let t = (edge.dot(to_point) / edge.dot(edge)).clamp(0.0, 1.0);
    let closest = edge * t - to_point;
    closest.length_squared()
}
