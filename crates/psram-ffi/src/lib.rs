//! C ABI for the psram allocator shim.
//!
//! Exposes the four allocation operations with C signatures so C and C++
//! code linked into the same image shares the PSRAM-first heap:
//!
//! ```c
//! void *psram_malloc(size_t size);
//! void *psram_calloc(size_t count, size_t size);
//! void *psram_realloc(void *ptr, size_t size);
//! void  psram_free(void *ptr);
//! ```
//!
//! The header is generated into `include/psram.h` by the build script.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run `$body`, turning an unwinding panic into `$fallback` so it never
/// crosses the C boundary.
macro_rules! ffi_guard {
    ($fallback:expr, $body:block) => {
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(_) => $fallback,
        }
    };
}

pub mod alloc;

pub use alloc::{psram_calloc, psram_free, psram_malloc, psram_realloc};
