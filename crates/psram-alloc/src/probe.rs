//! Start-up check for the capability-tagged pool.

use psram_core::Heap;

use crate::platform::HEAP;

/// What the heap found when probed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Availability {
    /// Requests can land in a capability-tagged (PSRAM) pool.
    pub tagged_pool: bool,
    /// Size of the preferred (PSRAM) pool in bytes; zero when absent.
    pub tagged_bytes: usize,
}

/// Probe the process-wide heap. Call once at start-up, never from an
/// allocation path: the log subscriber may allocate.
pub fn probe() -> Availability {
    probe_heap(&HEAP)
}

/// Probe an arbitrary heap and log the outcome.
pub fn probe_heap<H: Heap>(heap: &H) -> Availability {
    let tagged_bytes = heap.preferred_capacity();
    let availability = Availability {
        tagged_pool: heap.is_tiered() && tagged_bytes > 0,
        tagged_bytes,
    };
    if !heap.is_tiered() {
        tracing::debug!("plain system allocator, no capability tiers");
    } else if availability.tagged_pool {
        tracing::debug!(tagged_bytes, "capability-tagged pool available");
    } else {
        tracing::warn!(
            "no capability-tagged pool found, every allocation will use the fallback tier"
        );
    }
    availability
}
