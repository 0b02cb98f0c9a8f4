//! `malloc`-family entry points.
//!
//! Every pointer handed to [`psram_realloc`] or [`psram_free`] must have come
//! from one of these functions. Blocks from the C library's own `malloc` are
//! not interchangeable on ESP-IDF targets.

use std::ffi::c_void;
use std::ptr;

/// Allocate `size` bytes, PSRAM first where the target has it.
///
/// Returns null when every tier is exhausted. `size == 0` may return null
/// or a pointer that must not be dereferenced.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn psram_malloc(size: usize) -> *mut c_void {
    ffi_guard!(ptr::null_mut(), {
        psram_alloc::allocate(size).cast::<c_void>()
    })
}

/// Allocate `count * size` zeroed bytes. Null on exhaustion or overflow.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn psram_calloc(count: usize, size: usize) -> *mut c_void {
    ffi_guard!(ptr::null_mut(), {
        psram_alloc::zero_allocate(count, size).cast::<c_void>()
    })
}

/// Resize a block, possibly moving it. `ptr == NULL` allocates.
///
/// On success the old pointer is invalid. On failure with `size > 0` null is
/// returned and `ptr` stays valid.
///
/// # Safety
///
/// `ptr` must be null or a live block from this library.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn psram_realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
    ffi_guard!(ptr::null_mut(), {
        // SAFETY: forwarded caller contract.
        unsafe { psram_alloc::reallocate(ptr.cast(), size) }.cast::<c_void>()
    })
}

/// Release a block. `ptr == NULL` is a no-op.
///
/// # Safety
///
/// `ptr` must be null or a live block from this library.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn psram_free(ptr: *mut c_void) {
    ffi_guard!((), {
        // SAFETY: forwarded caller contract.
        unsafe { psram_alloc::free(ptr.cast()) }
    })
}
