//! Two-tier capability heap: preferred pool first, one fallback retry.

#![allow(unsafe_code)]

use core::ptr;

use crate::caps::Caps;
use crate::config::TierConfig;
use crate::heap::{CapsBackend, Heap};

/// A [`Heap`] that requests the preferred capabilities first and retries
/// exactly once against the fallback capabilities when that returns null.
///
/// Holds no mutable state; thread-safety is whatever the backend provides.
pub struct TieredHeap<B> {
    backend: B,
    config: TierConfig,
}

impl<B> TieredHeap<B> {
    /// Wrap `backend` with the default PSRAM-then-default-heap tiers.
    pub const fn new(backend: B) -> Self {
        Self::with_config(backend, TierConfig::DEFAULT)
    }

    /// Wrap `backend` with explicit tiers.
    pub const fn with_config(backend: B, config: TierConfig) -> Self {
        Self { backend, config }
    }

    /// The underlying capability backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The tier configuration in use.
    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    #[inline]
    fn preferred(&self) -> Caps {
        self.config.preferred
    }

    #[inline]
    fn fallback(&self) -> Caps {
        self.config.fallback
    }
}

// SAFETY: every block comes straight from `B`, which upholds the same
// validity contract; this type only chooses the capability hint.
unsafe impl<B: CapsBackend> Heap for TieredHeap<B> {
    fn allocate(&self, size: usize) -> *mut u8 {
        let block = self.backend.malloc(size, self.preferred());
        if block.is_null() && size > 0 {
            return self.backend.malloc(size, self.fallback());
        }
        block
    }

    fn zero_allocate(&self, count: usize, size: usize) -> *mut u8 {
        let Some(bytes) = count.checked_mul(size) else {
            return ptr::null_mut();
        };
        let block = self.backend.calloc(count, size, self.preferred());
        if block.is_null() && bytes > 0 {
            return self.backend.calloc(count, size, self.fallback());
        }
        block
    }

    fn allocate_aligned(&self, align: usize, size: usize) -> *mut u8 {
        let block = self.backend.aligned_alloc(align, size, self.preferred());
        if block.is_null() && size > 0 {
            return self.backend.aligned_alloc(align, size, self.fallback());
        }
        block
    }

    unsafe fn reallocate(&self, ptr: *mut u8, size: usize) -> *mut u8 {
        if ptr.is_null() {
            return self.allocate(size);
        }
        // SAFETY: the caller guarantees `ptr` is a live block from this heap,
        // hence from `self.backend`. A failed realloc leaves it live, so the
        // fallback attempt may use it again.
        unsafe {
            if self.backend.allocated_size(ptr) == 0 {
                return self.backend.realloc(ptr, size, self.fallback());
            }
            let moved = self.backend.realloc(ptr, size, self.preferred());
            if moved.is_null() && size > 0 {
                return self.backend.realloc(ptr, size, self.fallback());
            }
            moved
        }
    }

    unsafe fn free(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        // SAFETY: the caller guarantees `ptr` is a live block from this heap.
        unsafe { self.backend.free(ptr) }
    }

    fn min_align(&self) -> usize {
        B::MIN_ALIGN
    }

    fn is_tiered(&self) -> bool {
        true
    }

    fn has_preferred_tier(&self) -> bool {
        self.preferred_capacity() > 0
    }

    fn preferred_capacity(&self) -> usize {
        self.backend.total_size(self.preferred())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::ptr::NonNull;

    /// Hands out dangling pointers for any caps not in `refuse` and records
    /// the caps of every request. Never touches real memory.
    struct Scripted {
        refuse: Caps,
        tracked: bool,
        log: RefCell<Vec<(&'static str, Caps)>>,
    }

    impl Scripted {
        fn new(refuse: Caps) -> Self {
            Self {
                refuse,
                tracked: true,
                log: RefCell::new(Vec::new()),
            }
        }

        fn answer(&self, op: &'static str, caps: Caps) -> *mut u8 {
            self.log.borrow_mut().push((op, caps));
            if !self.refuse.is_empty() && caps.contains(self.refuse) {
                ptr::null_mut()
            } else {
                NonNull::<u64>::dangling().as_ptr().cast()
            }
        }

        fn calls(&self) -> Vec<(&'static str, Caps)> {
            self.log.borrow().clone()
        }
    }

    unsafe impl CapsBackend for Scripted {
        const MIN_ALIGN: usize = 8;

        fn malloc(&self, _size: usize, caps: Caps) -> *mut u8 {
            self.answer("malloc", caps)
        }

        fn calloc(&self, _count: usize, _size: usize, caps: Caps) -> *mut u8 {
            self.answer("calloc", caps)
        }

        fn aligned_alloc(&self, _align: usize, _size: usize, caps: Caps) -> *mut u8 {
            self.answer("aligned_alloc", caps)
        }

        unsafe fn realloc(&self, _ptr: *mut u8, _size: usize, caps: Caps) -> *mut u8 {
            self.answer("realloc", caps)
        }

        unsafe fn free(&self, _ptr: *mut u8) {
            self.log.borrow_mut().push(("free", Caps::empty()));
        }

        unsafe fn allocated_size(&self, _ptr: *mut u8) -> usize {
            if self.tracked {
                16
            } else {
                0
            }
        }

        fn total_size(&self, caps: Caps) -> usize {
            if !self.refuse.is_empty() && caps.contains(self.refuse) {
                0
            } else {
                1024
            }
        }
    }

    fn some_block() -> *mut u8 {
        NonNull::<u64>::dangling().as_ptr().cast()
    }

    #[test]
    fn allocate_prefers_spiram() {
        let heap = TieredHeap::new(Scripted::new(Caps::empty()));
        assert!(!heap.allocate(32).is_null());
        assert_eq!(heap.backend().calls(), vec![("malloc", Caps::SPIRAM)]);
    }

    #[test]
    fn allocate_retries_once_on_fallback() {
        let heap = TieredHeap::new(Scripted::new(Caps::SPIRAM));
        assert!(!heap.allocate(32).is_null());
        assert_eq!(
            heap.backend().calls(),
            vec![("malloc", Caps::SPIRAM), ("malloc", Caps::DEFAULT)]
        );
    }

    #[test]
    fn zero_size_null_is_not_retried() {
        let heap = TieredHeap::new(Scripted::new(Caps::SPIRAM));
        assert!(heap.allocate(0).is_null());
        assert!(heap.zero_allocate(4, 0).is_null());
        assert_eq!(
            heap.backend().calls(),
            vec![("malloc", Caps::SPIRAM), ("calloc", Caps::SPIRAM)]
        );
    }

    #[test]
    fn zero_allocate_overflow_skips_backend() {
        let heap = TieredHeap::new(Scripted::new(Caps::empty()));
        assert!(heap.zero_allocate(usize::MAX, 2).is_null());
        assert!(heap.backend().calls().is_empty());
    }

    #[test]
    fn realloc_of_untracked_block_goes_straight_to_fallback() {
        let mut backend = Scripted::new(Caps::empty());
        backend.tracked = false;
        let heap = TieredHeap::new(backend);
        let moved = unsafe { heap.reallocate(some_block(), 64) };
        assert!(!moved.is_null());
        assert_eq!(heap.backend().calls(), vec![("realloc", Caps::DEFAULT)]);
    }

    #[test]
    fn realloc_of_tracked_block_falls_back_once() {
        let heap = TieredHeap::new(Scripted::new(Caps::SPIRAM));
        let moved = unsafe { heap.reallocate(some_block(), 64) };
        assert!(!moved.is_null());
        assert_eq!(
            heap.backend().calls(),
            vec![("realloc", Caps::SPIRAM), ("realloc", Caps::DEFAULT)]
        );
    }

    #[test]
    fn realloc_to_zero_does_not_retry() {
        let heap = TieredHeap::new(Scripted::new(Caps::SPIRAM));
        let moved = unsafe { heap.reallocate(some_block(), 0) };
        assert!(moved.is_null());
        assert_eq!(heap.backend().calls(), vec![("realloc", Caps::SPIRAM)]);
    }

    #[test]
    fn realloc_null_is_allocate() {
        let heap = TieredHeap::new(Scripted::new(Caps::empty()));
        assert!(!unsafe { heap.reallocate(ptr::null_mut(), 8) }.is_null());
        assert_eq!(heap.backend().calls(), vec![("malloc", Caps::SPIRAM)]);
    }

    #[test]
    fn free_null_never_reaches_backend() {
        let heap = TieredHeap::new(Scripted::new(Caps::empty()));
        unsafe { heap.free(ptr::null_mut()) };
        assert!(heap.backend().calls().is_empty());
        unsafe { heap.free(some_block()) };
        assert_eq!(heap.backend().calls(), vec![("free", Caps::empty())]);
    }

    #[test]
    fn custom_tiers_are_honoured() {
        let config = TierConfig::new(Caps::DMA | Caps::INTERNAL, Caps::INTERNAL);
        let heap = TieredHeap::with_config(Scripted::new(Caps::DMA), config);
        assert!(!heap.allocate_aligned(64, 128).is_null());
        assert_eq!(
            heap.backend().calls(),
            vec![
                ("aligned_alloc", Caps::DMA | Caps::INTERNAL),
                ("aligned_alloc", Caps::INTERNAL)
            ]
        );
    }

    #[test]
    fn preferred_tier_presence_follows_backend() {
        let present = TieredHeap::new(Scripted::new(Caps::DMA));
        assert!(present.is_tiered());
        assert!(present.has_preferred_tier());
        assert_eq!(present.preferred_capacity(), 1024);
        let absent = TieredHeap::new(Scripted::new(Caps::SPIRAM));
        assert!(!absent.has_preferred_tier());
        assert_eq!(absent.min_align(), 8);
    }
}
