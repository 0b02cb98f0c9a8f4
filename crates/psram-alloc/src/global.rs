//! `GlobalAlloc` adapter so Rust code can allocate through a [`Heap`].
//!
//! ```rust,ignore
//! use psram_alloc::PsramAllocator;
//!
//! #[global_allocator]
//! static GLOBAL: PsramAllocator = PsramAllocator::new();
//! ```

#![allow(unsafe_code)]

use core::alloc::{GlobalAlloc, Layout};
use core::ptr;

use psram_core::Heap;

use crate::platform::{platform_heap, PlatformHeap};

/// A [`GlobalAlloc`] over any [`Heap`], by default this target's heap.
///
/// Layouts whose alignment the heap already guarantees go through the plain
/// allocate / zero-allocate / reallocate operations, so they keep the tier
/// fallback. Over-aligned layouts use the heap's aligned allocation and are
/// resized by allocate-copy-free.
pub struct PsramAllocator<H = PlatformHeap> {
    heap: H,
}

impl PsramAllocator {
    /// An allocator over this target's heap, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            heap: platform_heap(),
        }
    }
}

impl Default for PsramAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> PsramAllocator<H> {
    /// An allocator over an explicit heap.
    pub const fn with_heap(heap: H) -> Self {
        Self { heap }
    }

    /// The heap requests are forwarded to.
    pub fn heap(&self) -> &H {
        &self.heap
    }
}

impl<H: Heap> PsramAllocator<H> {
    /// Whether `layout` can be served by the unaligned operations.
    #[inline]
    fn natively_aligned(&self, align: usize, size: usize) -> bool {
        align <= self.heap.min_align() && align <= size
    }
}

// SAFETY: every block comes from `H`, whose `Heap` contract guarantees the
// requested size and alignment; over-aligned layouts use `allocate_aligned`.
unsafe impl<H: Heap> GlobalAlloc for PsramAllocator<H> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if self.natively_aligned(layout.align(), layout.size()) {
            self.heap.allocate(layout.size())
        } else {
            self.heap.allocate_aligned(layout.align(), layout.size())
        }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if self.natively_aligned(layout.align(), layout.size()) {
            return self.heap.zero_allocate(1, layout.size());
        }
        let block = self.heap.allocate_aligned(layout.align(), layout.size());
        if !block.is_null() {
            // SAFETY: `block` is a fresh allocation of `layout.size()` bytes.
            unsafe { ptr::write_bytes(block, 0, layout.size()) };
        }
        block
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        // SAFETY: `GlobalAlloc` guarantees `ptr` came from this allocator.
        unsafe { self.heap.free(ptr) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if self.natively_aligned(layout.align(), new_size) {
            // SAFETY: `ptr` came from this allocator and `new_size` is non-zero.
            return unsafe { self.heap.reallocate(ptr, new_size) };
        }
        // SAFETY: `GlobalAlloc::realloc` guarantees `new_size`, rounded up to
        // `layout.align()`, does not overflow `isize`.
        let new_layout = unsafe { Layout::from_size_align_unchecked(new_size, layout.align()) };
        // SAFETY: `new_layout` has non-zero size.
        let moved = unsafe { self.alloc(new_layout) };
        if !moved.is_null() {
            // SAFETY: both blocks are live, distinct, and at least this long.
            unsafe {
                ptr::copy_nonoverlapping(ptr, moved, layout.size().min(new_size));
                self.dealloc(ptr, layout);
            }
        }
        moved
    }
}
