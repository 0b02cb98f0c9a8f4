//! Capability flags, tier policy and heap traits for the psram allocator shim.
//!
//! This is the leaf crate with zero dependencies. It defines the
//! [`Heap`] strategy interface (allocate, zero-allocate, reallocate, free),
//! the [`CapsBackend`] surface that mirrors a vendor heap-capability API, and
//! [`TieredHeap`], which turns any capability backend into a heap that tries
//! a preferred pool first and falls back once to the default pool.
//!
//! # Architecture
//!
//! ```text
//! Heap (four C-style operations)
//! ├── TieredHeap<B: CapsBackend>   capability-aware targets
//! │   └── TierConfig               preferred caps, fallback caps
//! └── SystemHeap                   everything else (psram-alloc)
//! ```
//!
//! Which implementation a program gets is decided by `cfg`, never at run
//! time. Allocation failure is always a null pointer, never a panic.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod caps;
pub mod config;
pub mod error;
pub mod heap;
pub mod tiered;

pub use caps::{Caps, Tier};
pub use config::TierConfig;
pub use error::ConfigError;
pub use heap::{CapsBackend, Heap};
pub use tiered::TieredHeap;
