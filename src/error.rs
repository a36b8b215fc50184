//! Error kinds surfaced by the collision core (spec §7).
//!
//! All of `build`/`find`/`reuse` validate their buffer shapes before doing any
//! kernel-equivalent work and return one of these at the call boundary — there is no
//! in-kernel error channel, so a partially-enqueued stream is never observed by a caller.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A build or find call was given more elements than the configured capacity.
    #[error("requested length {requested} exceeds configured capacity {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    /// A buffer's length is not an integer multiple of the query/element count it is
    /// shaped against (candidates vs. query count, connected-vertices vs. query count,
    /// bucket size vs. hash-table length).
    #[error("buffer of length {len} is not a multiple of {divisor}")]
    BufferShapeMismatch { len: usize, divisor: usize },

    /// The element encoding tag was not one of the recognised variants.
    #[error("unsupported position or index encoding")]
    EncodingUnsupported,

    /// The backing allocator (heap pool or device) refused the request.
    #[error("allocator failed to satisfy request for {requested} elements")]
    AllocationFailed { requested: usize },

    /// The kernel/pipeline backend refused to produce a pipeline (integration error).
    #[error("pipeline creation failed: {0}")]
    PipelineCreationFailed(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
