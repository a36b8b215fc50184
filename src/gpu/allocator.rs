//! Buffer allocation behind an interface (spec §9: "Heap vs device allocator
//! alternation... make this an interface with methods `alloc(len, flags)`").
//!
//! Two implementations ship. `SystemAllocator` is the default: every index simply owns
//! a `Vec`. `PoolAllocator` models "pool-style allocation from a pre-sized region"
//! (§1/§5): it bump-allocates against a byte budget fixed at construction and refuses
//! once exhausted, which is the behaviour `sizeof_buffers` exists to let a caller avoid.

use crate::error::CoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocFlags {
    pub zeroed: bool,
}

impl AllocFlags {
    pub const DEFAULT: AllocFlags = AllocFlags { zeroed: true };
}

/// Allocates buffers of plain, zeroable element types. The core depends only on this
/// trait, never on which concrete allocator backs a given index.
pub trait BufferAllocator {
    fn alloc_u32(&mut self, len: usize, flags: AllocFlags) -> Result<Vec<u32>, CoreError>;
    fn alloc_f32(&mut self, len: usize, flags: AllocFlags) -> Result<Vec<f32>, CoreError>;
}

/// The default allocator: ordinary heap `Vec`s, one per request. Cannot fail short of
/// process-wide OOM (which `Vec::with_capacity` would itself panic on, matching how
/// the rest of this codebase's ancestor treats allocation).
#[derive(Default)]
pub struct SystemAllocator;

impl BufferAllocator for SystemAllocator {
    fn alloc_u32(&mut self, len: usize, flags: AllocFlags) -> Result<Vec<u32>, CoreError> {
        Ok(if flags.zeroed { vec![0u32; len] } else { Vec::with_capacity(len) })
    }

    fn alloc_f32(&mut self, len: usize, flags: AllocFlags) -> Result<Vec<f32>, CoreError> {
        Ok(if flags.zeroed { vec![0.0f32; len] } else { Vec::with_capacity(len) })
    }
}

/// Bump-allocates against a byte budget fixed at construction, modeling a pre-sized
/// heap region shared by several buffers. Does not actually place buffers in a shared
/// arena (no unsafe pointer arithmetic) — it only accounts for the budget, so the
/// behaviour a caller can rely on is "allocation past the configured size fails",
/// which is the only part of pool allocation that is algorithmically observable.
pub struct PoolAllocator {
    capacity_bytes: usize,
    used_bytes: usize,
}

impl PoolAllocator {
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            capacity_bytes,
            used_bytes: 0,
        }
    }

    pub fn remaining_bytes(&self) -> usize {
        self.capacity_bytes.saturating_sub(self.used_bytes)
    }

    fn reserve(&mut self, bytes: usize) -> Result<(), CoreError> {
        if self.used_bytes + bytes > self.capacity_bytes {
            return Err(CoreError::AllocationFailed { requested: bytes });
        }
        self.used_bytes += bytes;
        Ok(())
    }
}

impl BufferAllocator for PoolAllocator {
    fn alloc_u32(&mut self, len: usize, flags: AllocFlags) -> Result<Vec<u32>, CoreError> {
        self.reserve(len * std::mem::size_of::<u32>())?;
        Ok(if flags.zeroed { vec![0u32; len] } else { Vec::with_capacity(len) })
    }

    fn alloc_f32(&mut self, len: usize, flags: AllocFlags) -> Result<Vec<f32>, CoreError> {
        self.reserve(len * std::mem::size_of::<f32>())?;
        Ok(if flags.zeroed { vec![0.0f32; len] } else { Vec::with_capacity(len) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_allocator_refuses_past_budget() {
        let mut pool = PoolAllocator::new(16);
        assert!(pool.alloc_u32(2, AllocFlags::DEFAULT).is_ok()); // 8 bytes
        assert!(pool.alloc_u32(3, AllocFlags::DEFAULT).is_err()); // would need 12 more
    }

    #[test]
    fn system_allocator_zeroes_when_requested() {
        let mut sys = SystemAllocator;
        let buf = sys.alloc_u32(4, AllocFlags::DEFAULT).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 0]);
    }
}
