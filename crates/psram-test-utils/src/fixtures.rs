//! Ready-made tiered heaps over [`SimulatedCaps`].

use psram_core::TieredHeap;

use crate::simulated::SimulatedCaps;

/// A tiered heap backed by the simulation.
pub type SimHeap = TieredHeap<SimulatedCaps>;

/// Default PSRAM pool size: roomy, like an external 8 MiB part scaled down.
pub const PSRAM_BYTES: usize = 64 * 1024;

/// Default internal RAM pool size, deliberately smaller than [`PSRAM_BYTES`].
pub const INTERNAL_BYTES: usize = 8 * 1024;

/// A PSRAM-first heap whose pools hold the given number of bytes.
pub fn tiered(preferred_capacity: usize, fallback_capacity: usize) -> SimHeap {
    TieredHeap::new(SimulatedCaps::new(preferred_capacity, fallback_capacity))
}

/// A PSRAM-first heap with the default pool sizes.
pub fn board_heap() -> SimHeap {
    tiered(PSRAM_BYTES, INTERNAL_BYTES)
}
