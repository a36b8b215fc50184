//! Per-phase performance profiling for the collision core.
//!
//! Mirrors the scoped-timer / category-table shape used elsewhere in this codebase's
//! ancestry, but backed by `std::time::Instant` rather than the Web Performance API,
//! since this crate has no browser host.
//!
//! # Usage
//! ```
//! use broadphase_core::utils::profiler::{Profiler, ProfileCategory};
//!
//! Profiler::start(ProfileCategory::PointBuild);
//! // ... work ...
//! Profiler::end(ProfileCategory::PointBuild);
//! ```

use std::cell::RefCell;
use std::time::Instant;

#[cfg(feature = "profiling")]
thread_local! {
    static PROFILER: RefCell<ProfilerState> = RefCell::new(ProfilerState::new());
}

/// Profiling categories, one per pipeline stage named in the component design.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProfileCategory {
    PointBuild = 0,
    PointSort = 1,
    PointCellBoundaries = 2,
    PointFind = 3,
    PointReuse = 4,
    TriangleBuild = 5,
    TriangleFind = 6,
    TriangleReuse = 7,
}

impl ProfileCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ProfileCategory::PointBuild => "PointBuild",
            ProfileCategory::PointSort => "PointSort",
            ProfileCategory::PointCellBoundaries => "PointCellBoundaries",
            ProfileCategory::PointFind => "PointFind",
            ProfileCategory::PointReuse => "PointReuse",
            ProfileCategory::TriangleBuild => "TriangleBuild",
            ProfileCategory::TriangleFind => "TriangleFind",
            ProfileCategory::TriangleReuse => "TriangleReuse",
        }
    }

    pub const fn count() -> usize {
        8
    }
}

/// Timing statistics for a single category.
#[derive(Clone, Debug, Default)]
pub struct TimingStats {
    pub total_ms: f64,
    pub count: u32,
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
    pub last_ms: f64,
}

impl TimingStats {
    pub fn new() -> Self {
        Self {
            min_ms: f64::MAX,
            max_ms: 0.0,
            ..Default::default()
        }
    }

    pub fn record(&mut self, duration_ms: f64) {
        self.total_ms += duration_ms;
        self.count += 1;
        self.last_ms = duration_ms;
        self.min_ms = self.min_ms.min(duration_ms);
        self.max_ms = self.max_ms.max(duration_ms);

        const ALPHA: f64 = 0.1;
        if self.count == 1 {
            self.avg_ms = duration_ms;
        } else {
            self.avg_ms = ALPHA * duration_ms + (1.0 - ALPHA) * self.avg_ms;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(feature = "profiling")]
struct ProfilerState {
    stats: [TimingStats; ProfileCategory::count()],
    start_times: [Option<Instant>; ProfileCategory::count()],
    enabled: bool,
}

#[cfg(feature = "profiling")]
impl ProfilerState {
    fn new() -> Self {
        Self {
            stats: std::array::from_fn(|_| TimingStats::new()),
            start_times: [None; ProfileCategory::count()],
            enabled: true,
        }
    }

    fn start(&mut self, category: ProfileCategory) {
        if self.enabled {
            self.start_times[category as usize] = Some(Instant::now());
        }
    }

    fn end(&mut self, category: ProfileCategory) {
        if self.enabled {
            if let Some(start) = self.start_times[category as usize].take() {
                let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                self.stats[category as usize].record(duration_ms);
            }
        }
    }
}

/// Public profiler interface.
pub struct Profiler;

impl Profiler {
    #[inline]
    pub fn start(category: ProfileCategory) {
        #[cfg(feature = "profiling")]
        PROFILER.with(|p| p.borrow_mut().start(category));
        #[cfg(not(feature = "profiling"))]
        let _ = category;
    }

    #[inline]
    pub fn end(category: ProfileCategory) {
        #[cfg(feature = "profiling")]
        PROFILER.with(|p| p.borrow_mut().end(category));
        #[cfg(not(feature = "profiling"))]
        let _ = category;
    }

    pub fn set_enabled(enabled: bool) {
        #[cfg(feature = "profiling")]
        PROFILER.with(|p| p.borrow_mut().enabled = enabled);
        #[cfg(not(feature = "profiling"))]
        let _ = enabled;
    }

    pub fn reset() {
        #[cfg(feature = "profiling")]
        PROFILER.with(|p| {
            let mut profiler = p.borrow_mut();
            for stat in &mut profiler.stats {
                stat.reset();
            }
        });
    }

    #[cfg(feature = "profiling")]
    pub fn get_timing(category: ProfileCategory) -> TimingStats {
        PROFILER.with(|p| p.borrow().stats[category as usize].clone())
    }

    #[cfg(not(feature = "profiling"))]
    pub fn get_timing(_category: ProfileCategory) -> TimingStats {
        TimingStats::new()
    }
}

/// RAII timer for scoped profiling.
pub struct ScopedTimer {
    category: ProfileCategory,
}

impl ScopedTimer {
    #[inline]
    pub fn new(category: ProfileCategory) -> Self {
        Profiler::start(category);
        Self { category }
    }
}

impl Drop for ScopedTimer {
    #[inline]
    fn drop(&mut self) {
        Profiler::end(self.category);
    }
}

/// Scoped-profiling macro, same shape as the ancestor engine's `profile_scope!`.
#[macro_export]
macro_rules! profile_scope {
    ($category:expr) => {
        let _timer = $crate::utils::profiler::ScopedTimer::new($category);
    };
}
