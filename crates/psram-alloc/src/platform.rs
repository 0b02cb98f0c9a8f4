//! The process-wide heap, selected at compile time.
//!
//! On ESP-IDF the heap is a [`TieredHeap`](psram_core::TieredHeap) over
//! `EspCaps` (PSRAM first, default heap second). Everywhere else it is
//! `SystemHeap`.
//!
//! Every pointer passed to [`reallocate`] or [`free`] must have come from
//! this module's functions (or from [`PsramAllocator`](crate::PsramAllocator)
//! over the same heap). On ESP-IDF a foreign pointer would be accepted
//! silently by the capability-aware free, so nothing can catch the mistake.

#![allow(unsafe_code)]

use psram_core::Heap;

#[cfg(target_os = "espidf")]
use crate::esp::EspCaps;
#[cfg(target_os = "espidf")]
use psram_core::TieredHeap;
#[cfg(not(target_os = "espidf"))]
use crate::system::SystemHeap;

/// The heap this target uses.
#[cfg(target_os = "espidf")]
pub type PlatformHeap = TieredHeap<EspCaps>;

/// The heap this target uses.
#[cfg(not(target_os = "espidf"))]
pub type PlatformHeap = SystemHeap;

/// A fresh handle to this target's heap. The heap is stateless, so every
/// handle behaves identically to [`HEAP`].
#[cfg(target_os = "espidf")]
pub const fn platform_heap() -> PlatformHeap {
    TieredHeap::new(EspCaps)
}

/// A fresh handle to this target's heap. The heap is stateless, so every
/// handle behaves identically to [`HEAP`].
#[cfg(not(target_os = "espidf"))]
pub const fn platform_heap() -> PlatformHeap {
    SystemHeap
}

/// The process-wide heap.
pub static HEAP: PlatformHeap = platform_heap();

/// Allocate `size` bytes, PSRAM first where the target has it.
///
/// Returns null on exhaustion. A zero-size request may return null without
/// that meaning exhaustion.
pub fn allocate(size: usize) -> *mut u8 {
    HEAP.allocate(size)
}

/// Allocate `count * size` zeroed bytes. Same tier policy as [`allocate`].
pub fn zero_allocate(count: usize, size: usize) -> *mut u8 {
    HEAP.zero_allocate(count, size)
}

/// Resize a block, possibly moving it. Null `ptr` behaves as [`allocate`].
///
/// # Safety
///
/// `ptr` must be null or a live block returned by this module.
pub unsafe fn reallocate(ptr: *mut u8, size: usize) -> *mut u8 {
    // SAFETY: forwarded caller contract.
    unsafe { HEAP.reallocate(ptr, size) }
}

/// Release a block. Null is a no-op.
///
/// # Safety
///
/// `ptr` must be null or a live block returned by this module.
pub unsafe fn free(ptr: *mut u8) {
    // SAFETY: forwarded caller contract.
    unsafe { HEAP.free(ptr) }
}
