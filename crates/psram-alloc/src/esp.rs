//! Capability backend over ESP-IDF's `heap_caps_*` API.

#![allow(unsafe_code)]

use esp_idf_sys as sys;
use psram_core::{Caps, CapsBackend};

/// ESP-IDF's multi-heap, addressed by capability.
///
/// Blocks are 4-byte aligned. `heap_caps_free` and `heap_caps_realloc` find
/// the owning region themselves, so a block from any pool can be passed back.
#[derive(Clone, Copy, Debug, Default)]
pub struct EspCaps;

// SAFETY: forwards to the IDF heap, which is internally locked and upholds
// the block validity rules for every region.
unsafe impl CapsBackend for EspCaps {
    const MIN_ALIGN: usize = 4;

    fn malloc(&self, size: usize, caps: Caps) -> *mut u8 {
        // SAFETY: no preconditions.
        unsafe { sys::heap_caps_malloc(size as _, caps.bits() as _) }.cast()
    }

    fn calloc(&self, count: usize, size: usize, caps: Caps) -> *mut u8 {
        // SAFETY: no preconditions; the product is overflow-checked by IDF.
        unsafe { sys::heap_caps_calloc(count as _, size as _, caps.bits() as _) }.cast()
    }

    fn aligned_alloc(&self, align: usize, size: usize, caps: Caps) -> *mut u8 {
        // SAFETY: `align` is a power of two per the `Heap` contract.
        unsafe { sys::heap_caps_aligned_alloc(align as _, size as _, caps.bits() as _) }.cast()
    }

    unsafe fn realloc(&self, ptr: *mut u8, size: usize, caps: Caps) -> *mut u8 {
        // SAFETY: the caller guarantees `ptr` is a live IDF heap block.
        unsafe { sys::heap_caps_realloc(ptr.cast(), size as _, caps.bits() as _) }.cast()
    }

    unsafe fn free(&self, ptr: *mut u8) {
        // SAFETY: the caller guarantees `ptr` is null or a live IDF heap block.
        unsafe { sys::heap_caps_free(ptr.cast()) }
    }

    unsafe fn allocated_size(&self, ptr: *mut u8) -> usize {
        // SAFETY: the caller guarantees `ptr` is a live IDF heap block.
        unsafe { sys::heap_caps_get_allocated_size(ptr.cast()) as usize }
    }

    fn total_size(&self, caps: Caps) -> usize {
        // SAFETY: no preconditions.
        unsafe { sys::heap_caps_get_total_size(caps.bits() as _) as usize }
    }
}
