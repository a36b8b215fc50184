//! External-collaborator interfaces (spec §1, §5, §9).
//!
//! The real device/queue/command-buffer runtime lives outside this crate. What the
//! core needs from it is small and is expressed here as traits: an ordering token
//! (`Stream`) standing in for "enqueued work happens-before the next enqueue on the
//! same stream", and a `BufferAllocator` standing in for "device or heap-pool
//! allocation, chosen by the caller, the core depends only on the interface" (§9).

pub mod allocator;
pub mod stream;

pub use allocator::{BufferAllocator, PoolAllocator, SystemAllocator};
pub use stream::{dispatch_1d, Stream, ThreadgroupWidth};
