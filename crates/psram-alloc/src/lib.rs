//! PSRAM-first heap on ESP-IDF targets, the C allocator everywhere else.
//!
//! The backend is picked at compile time:
//!
//! ```text
//! target_os = "espidf"   HEAP = TieredHeap<EspCaps>   heap_caps_* (SPIRAM, then DEFAULT)
//! anything else          HEAP = SystemHeap            malloc / calloc / realloc / free
//! ```
//!
//! Programs use the heap through the four free functions ([`allocate`],
//! [`zero_allocate`], [`reallocate`], [`free`]), through
//! [`PsramAllocator`] as the `#[global_allocator]`, or through the C ABI in
//! `psram-ffi`. Exhaustion is always a null pointer, never a panic, and the
//! allocation paths never log. [`probe()`] reports at start-up whether the
//! PSRAM pool exists at all.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

#[cfg(target_os = "espidf")]
mod esp;
pub mod global;
pub mod platform;
pub mod probe;
#[cfg(not(target_os = "espidf"))]
mod system;

#[cfg(target_os = "espidf")]
pub use esp::EspCaps;
#[cfg(not(target_os = "espidf"))]
pub use system::SystemHeap;

pub use global::PsramAllocator;
pub use platform::{
    allocate, free, platform_heap, reallocate, zero_allocate, PlatformHeap, HEAP,
};
pub use probe::{probe, probe_heap, Availability};
pub use psram_core::{Caps, ConfigError, Heap, Tier, TierConfig, TieredHeap};
