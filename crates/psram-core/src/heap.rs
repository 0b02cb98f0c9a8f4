//! The heap strategy interface and the vendor capability-heap surface.
//!
//! [`Heap`] is the four-operation contract the rest of a program consumes.
//! It has two implementations chosen at compile time: a capability-aware
//! [`TieredHeap`](crate::TieredHeap) over a [`CapsBackend`], and a plain
//! forwarder to the C allocator family.
//!
//! # Ownership
//!
//! A pointer obtained from a heap must only be resized or released through
//! that same heap. The capability-aware free resolves ownership internally and
//! would silently accept a foreign pointer, so this is a caller precondition
//! rather than something the shim can check.

#![allow(unsafe_code)]

use crate::caps::Caps;

/// A raw allocator with C allocation semantics.
///
/// Exhaustion is reported by returning null. A zero-size request may return
/// either null or a unique pointer that must not be dereferenced; neither is
/// exhaustion.
///
/// # Safety
///
/// Implementors must return null or a pointer to at least the requested
/// number of bytes, aligned to [`min_align`](Heap::min_align) (or to the
/// requested alignment for [`allocate_aligned`](Heap::allocate_aligned)),
/// that stays valid until passed to [`reallocate`](Heap::reallocate) or
/// [`free`](Heap::free). Implementations must be safe to call from any thread.
pub unsafe trait Heap {
    /// Allocate `size` uninitialised bytes.
    fn allocate(&self, size: usize) -> *mut u8;

    /// Allocate `count * size` bytes, all zero.
    ///
    /// Returns null when the product overflows.
    fn zero_allocate(&self, count: usize, size: usize) -> *mut u8;

    /// Allocate `size` bytes aligned to `align` (a power of two).
    fn allocate_aligned(&self, align: usize, size: usize) -> *mut u8;

    /// Resize a block, possibly moving it.
    ///
    /// A null `ptr` behaves as [`allocate`](Heap::allocate). On success the
    /// old pointer is invalid and the first `min(old, size)` bytes are
    /// preserved. On failure with `size > 0` null is returned and `ptr` is
    /// still valid. With `size == 0` the block may be released and null
    /// returned.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live block obtained from this heap.
    unsafe fn reallocate(&self, ptr: *mut u8, size: usize) -> *mut u8;

    /// Release a block. Null is a no-op.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live block obtained from this heap.
    unsafe fn free(&self, ptr: *mut u8);

    /// Alignment every non-null block is guaranteed to have.
    fn min_align(&self) -> usize;

    /// Whether this heap routes requests by capability tier at all.
    fn is_tiered(&self) -> bool {
        false
    }

    /// Whether a capability-tagged preferred pool exists on this target.
    fn has_preferred_tier(&self) -> bool {
        false
    }

    /// Total size in bytes of the preferred pool, or zero if there is none.
    fn preferred_capacity(&self) -> usize {
        0
    }
}

/// The vendor heap-capability API: every request carries a [`Caps`] hint.
///
/// This mirrors ESP-IDF's `heap_caps_*` family closely enough that a binding
/// is a direct forward. A host-side simulation implements it for tests.
///
/// # Safety
///
/// Implementors must uphold the block validity rules described on [`Heap`],
/// with blocks aligned to at least [`MIN_ALIGN`](CapsBackend::MIN_ALIGN), and
/// [`free`](CapsBackend::free) / [`realloc`](CapsBackend::realloc) must accept
/// a block regardless of which capability pool it came from.
pub unsafe trait CapsBackend {
    /// Alignment of every non-null block.
    const MIN_ALIGN: usize;

    /// `heap_caps_malloc`.
    fn malloc(&self, size: usize, caps: Caps) -> *mut u8;

    /// `heap_caps_calloc`. Returns null when `count * size` overflows.
    fn calloc(&self, count: usize, size: usize, caps: Caps) -> *mut u8;

    /// `heap_caps_aligned_alloc`.
    fn aligned_alloc(&self, align: usize, size: usize, caps: Caps) -> *mut u8;

    /// `heap_caps_realloc`: move or resize `ptr` into memory with `caps`.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live block from this backend.
    unsafe fn realloc(&self, ptr: *mut u8, size: usize, caps: Caps) -> *mut u8;

    /// `heap_caps_free`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live block from this backend.
    unsafe fn free(&self, ptr: *mut u8);

    /// `heap_caps_get_allocated_size`: size of a block the backend tracks,
    /// zero otherwise.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live block from this backend.
    unsafe fn allocated_size(&self, ptr: *mut u8) -> usize;

    /// `heap_caps_get_total_size`: bytes across all regions with `caps`.
    fn total_size(&self, caps: Caps) -> usize;
}
