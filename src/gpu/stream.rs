//! A command stream is, on a real device, the thing that gives enqueue order its
//! happens-before guarantee (spec §5: "callers MUST not observe intermediate results
//! before the stream is signalled complete"). On the CPU reference backend each
//! dispatch already runs to completion before the call returns, so `Stream` is a thin
//! marker — but `build`/`find`/`reuse` all take `&mut Stream` so the call shape matches
//! what a device-backed implementation would require, and `wait()` is where a real
//! backend would block on the completion signal.

/// Caller-chosen threadgroup width (spec §4.2, §5); typically 256.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreadgroupWidth(pub usize);

impl ThreadgroupWidth {
    pub const DEFAULT: ThreadgroupWidth = ThreadgroupWidth(256);

    /// `G` in spec §4.2: the narrower of the hardware maximum and `n_pad / 2`.
    pub fn clamp_to(self, n_pad: usize) -> ThreadgroupWidth {
        ThreadgroupWidth(self.0.min((n_pad / 2).max(1)))
    }
}

/// An ordering token for one build/find/reuse call. Submitting work advances an
/// internal generation counter; `wait` is the CPU-backend no-op standing in for
/// awaiting the stream's completion signal.
#[derive(Default)]
pub struct Stream {
    generation: u64,
}

impl Stream {
    pub fn new() -> Self {
        Self { generation: 0 }
    }

    /// Marks one unit of enqueued work as submitted. The CPU backend has already
    /// executed it by the time this is called; a device-backed stream would instead
    /// append to its command buffer here.
    pub fn submit(&mut self) {
        self.generation += 1;
    }

    /// Awaits the stream's completion signal. No-op on the CPU backend.
    pub fn wait(&self) {}

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Runs `body(i)` for `i in 0..thread_count`, modeling a 1D kernel dispatch with the
/// given threadgroup width. On the CPU backend this is either a sequential loop or,
/// with the `parallel` feature, a rayon `par_iter` chunked by `threadgroup_width` —
/// the same optional-parallelism shape this codebase's ancestor uses for its collision
/// and coloring passes.
pub fn dispatch_1d(thread_count: usize, _threadgroup_width: ThreadgroupWidth, body: impl Fn(usize) + Sync) {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..thread_count).into_par_iter().for_each(|i| body(i));
    }
    #[cfg(not(feature = "parallel"))]
    {
        for i in 0..thread_count {
            body(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threadgroup_width_clamps_to_half_npad() {
        let g = ThreadgroupWidth(256).clamp_to(64);
        assert_eq!(g.0, 32);
    }

    #[test]
    fn stream_counts_submissions() {
        let mut s = Stream::new();
        s.submit();
        s.submit();
        assert_eq!(s.generation(), 2);
    }

    #[test]
    fn dispatch_1d_visits_every_index() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let sum = AtomicUsize::new(0);
        dispatch_1d(100, ThreadgroupWidth::DEFAULT, |i| {
            sum.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), (0..100).sum());
    }
}
