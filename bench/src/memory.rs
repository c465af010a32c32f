//! Heap footprint of a bus, split into registration and dispatch.
//!
//! Registration cost is the listener records themselves (scope handle, callback
//! handle, bound arguments) plus the registry keys. Dispatch cost is what a pass
//! allocates on its own: the listener snapshot, the event descriptor and the
//! positional argument vectors built for each call.
//!
//! Counts come from dhat and are only collected with the `memory_profiling`
//! feature, which also needs `dhat::Alloc` installed as the global allocator:
//!
//! ```bash
//! cargo bench -p rusty_bench --features memory_profiling
//! ```
//!
//! Without the feature every measurement is zero and only the work runs.
//! Each measurement writes `dhat-heap.json`, viewable at
//! <https://nnethercote.github.io/dh_view/dh_view.html>.

use std::fmt;

use rusty_events::EventBus;
use serde_json::Value;

/// Heap counters for one measured section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub bytes_allocated: u64,
    pub allocation_count: u64,
    pub peak_bytes: u64,
}

impl MemoryStats {
    /// Average bytes per unit (listener, pass...); zero for no units.
    pub fn bytes_per(&self, units: usize) -> f64 {
        ratio(self.bytes_allocated, units)
    }

    /// Average allocations per unit; zero for no units.
    pub fn allocations_per(&self, units: usize) -> f64 {
        ratio(self.allocation_count, units)
    }
}

fn ratio(total: u64, units: usize) -> f64 {
    if units == 0 {
        0.0
    } else {
        total as f64 / units as f64
    }
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes in {} allocs (peak {} bytes)",
            self.bytes_allocated, self.allocation_count, self.peak_bytes
        )
    }
}

/// Run `f` and return its result with the heap counters it produced.
pub fn measure_memory<F, R>(f: F) -> (R, MemoryStats)
where
    F: FnOnce() -> R,
{
    #[cfg(feature = "memory_profiling")]
    {
        let _profiler = dhat::Profiler::new_heap();
        let result = f();
        let stats = dhat::HeapStats::get();
        (
            result,
            MemoryStats {
                bytes_allocated: stats.total_bytes,
                allocation_count: stats.total_blocks,
                peak_bytes: stats.max_bytes as u64,
            },
        )
    }
    #[cfg(not(feature = "memory_profiling"))]
    {
        (f(), MemoryStats::default())
    }
}

/// What a populated bus costs to build and to dispatch on.
#[derive(Debug, Clone, Default)]
pub struct BusFootprint {
    /// Listeners registered by the build step.
    pub listeners: usize,
    /// Allocations made while building the bus.
    pub registration: MemoryStats,
    /// Number of dispatch passes measured.
    pub passes: usize,
    /// Allocations made by all measured passes together.
    pub dispatch: MemoryStats,
}

impl BusFootprint {
    /// Build a bus with `build`, then dispatch `event_type` on it `passes` times.
    ///
    /// Returns the bus so callers can inspect listener side effects. The first
    /// listener error stops the passes and is returned.
    pub fn measure<F>(
        build: F,
        event_type: &str,
        parameters: &Value,
        passes: usize,
    ) -> rusty_events::Result<(EventBus, Self)>
    where
        F: FnOnce() -> EventBus,
    {
        let (bus, registration) = measure_memory(build);
        let listeners = bus.total_listener_count();

        let (outcome, dispatch) = measure_memory(|| {
            (0..passes).try_for_each(|_| bus.dispatch(event_type, parameters.clone(), &[]))
        });
        outcome?;

        Ok((
            bus,
            Self {
                listeners,
                registration,
                passes,
                dispatch,
            },
        ))
    }

    /// Registration bytes per listener.
    pub fn bytes_per_listener(&self) -> f64 {
        self.registration.bytes_per(self.listeners)
    }

    /// Dispatch bytes per pass.
    pub fn bytes_per_pass(&self) -> f64 {
        self.dispatch.bytes_per(self.passes)
    }
}

impl fmt::Display for BusFootprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listeners: register {} ({:.1} B/listener); {} passes: dispatch {} ({:.1} B/pass)",
            self.listeners,
            self.registration,
            self.bytes_per_listener(),
            self.passes,
            self.dispatch,
            self.bytes_per_pass()
        )
    }
}
