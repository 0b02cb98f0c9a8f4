//! Plain backend: forwards straight to the C allocator family.
//!
//! Used on every target without a capability heap. There is no second tier
//! and no retry; a null from `malloc` is returned as is.

#![allow(unsafe_code)]

use core::ptr;

use psram_core::Heap;

/// Alignment `malloc` guarantees on the host targets this backend serves.
const MIN_ALIGN: usize = if cfg!(target_pointer_width = "64") {
    16
} else {
    8
};

/// The platform's default allocator (`malloc`, `calloc`, `realloc`, `free`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemHeap;

// SAFETY: every block comes from libc's allocator, which hands out
// `MIN_ALIGN`-aligned, thread-safe allocations.
unsafe impl Heap for SystemHeap {
    fn allocate(&self, size: usize) -> *mut u8 {
        // SAFETY: `malloc` has no preconditions.
        unsafe { libc::malloc(size) }.cast()
    }

    fn zero_allocate(&self, count: usize, size: usize) -> *mut u8 {
        // SAFETY: `calloc` has no preconditions and checks the product itself.
        unsafe { libc::calloc(count, size) }.cast()
    }

    fn allocate_aligned(&self, align: usize, size: usize) -> *mut u8 {
        aligned_malloc(align, size)
    }

    unsafe fn reallocate(&self, ptr: *mut u8, size: usize) -> *mut u8 {
        // SAFETY: the caller guarantees `ptr` is null or a live libc block.
        unsafe { libc::realloc(ptr.cast(), size) }.cast()
    }

    unsafe fn free(&self, ptr: *mut u8) {
        // SAFETY: the caller guarantees `ptr` is null or a live libc block,
        // and `free(NULL)` is defined as a no-op.
        unsafe { libc::free(ptr.cast()) }
    }

    fn min_align(&self) -> usize {
        MIN_ALIGN
    }
}

#[cfg(unix)]
fn aligned_malloc(align: usize, size: usize) -> *mut u8 {
    // posix_memalign wants a power of two that is a multiple of the pointer size.
    let align = align.max(core::mem::size_of::<usize>());
    let mut out = ptr::null_mut();
    // SAFETY: `out` is a valid place to store the result.
    let ret = unsafe { libc::posix_memalign(&mut out, align, size) };
    if ret != 0 {
        return ptr::null_mut();
    }
    out.cast()
}

#[cfg(not(unix))]
fn aligned_malloc(align: usize, size: usize) -> *mut u8 {
    // Without posix_memalign only what malloc guarantees can be served, since
    // the block must stay releasable through plain `free`.
    if align > MIN_ALIGN {
        return ptr::null_mut();
    }
    // SAFETY: `malloc` has no preconditions.
    unsafe { libc::malloc(size) }.cast()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_free() {
        let heap = SystemHeap;
        let p = heap.allocate(64);
        assert!(!p.is_null());
        assert_eq!(p as usize % heap.min_align(), 0);
        unsafe {
            p.write_bytes(0x5A, 64);
            heap.free(p);
        }
    }

    #[test]
    fn zero_allocate_is_zeroed() {
        let heap = SystemHeap;
        let p = heap.zero_allocate(32, 8);
        assert!(!p.is_null());
        let bytes = unsafe { std::slice::from_raw_parts(p, 256) };
        assert!(bytes.iter().all(|&b| b == 0));
        unsafe { heap.free(p) };
    }

    #[test]
    fn zero_allocate_overflow_is_null() {
        assert!(SystemHeap.zero_allocate(usize::MAX, 2).is_null());
    }

    #[test]
    fn reallocate_preserves_prefix() {
        let heap = SystemHeap;
        let p = heap.allocate(16);
        unsafe {
            for i in 0..16 {
                p.add(i).write(i as u8);
            }
            let q = heap.reallocate(p, 4096);
            assert!(!q.is_null());
            let bytes = std::slice::from_raw_parts(q, 16);
            assert_eq!(bytes, (0..16).collect::<Vec<u8>>().as_slice());
            heap.free(q);
        }
    }

    #[test]
    fn reallocate_null_allocates() {
        let heap = SystemHeap;
        let p = unsafe { heap.reallocate(ptr::null_mut(), 32) };
        assert!(!p.is_null());
        unsafe { heap.free(p) };
    }

    #[test]
    fn free_null_is_a_no_op() {
        unsafe { SystemHeap.free(ptr::null_mut()) };
    }

    #[test]
    fn plain_heap_has_no_tiers() {
        assert!(!SystemHeap.is_tiered());
        assert!(!SystemHeap.has_preferred_tier());
        assert_eq!(SystemHeap.preferred_capacity(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn aligned_allocation_is_aligned() {
        let heap = SystemHeap;
        for align in [32, 64, 4096] {
            let p = heap.allocate_aligned(align, 100);
            assert!(!p.is_null());
            assert_eq!(p as usize % align, 0);
            unsafe { heap.free(p) };
        }
    }
}
