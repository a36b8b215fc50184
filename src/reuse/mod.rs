//! C5: reuse passes (spec §4.5).
//!
//! Both passes are second-order refinements over candidate buffers a `find` call has
//! already populated: rather than re-scanning the spatial hash, they look at what a
//! query's *current* nearest neighbours themselves consider nearby, and fold any
//! previously-unseen proposal back into the bounded-K register. This recovers
//! candidates a single-cell or pruned-box search can miss at cell boundaries, at O(K²)
//! rather than the cost of a second full spatial search.

mod point;
mod triangle;

pub use point::point_reuse;
pub use triangle::triangle_reuse;

/// Caps how many of a query's own current candidates are used as second-order probes.
/// Walking the full `K` would make every reuse pass `O(K^3)` across a whole buffer;
/// the nearest few neighbours carry almost all of the recoverable candidates anyway.
const MAX_PROBES: usize = 4;
