//! Test utilities for psram allocator development.
//!
//! Provides [`SimulatedCaps`], a host-side capability heap with
//! byte-bounded PSRAM and internal pools, plus fixtures that wrap it in a
//! [`TieredHeap`] for exercising the fallback and exhaustion paths.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod simulated;

pub use fixtures::{board_heap, tiered, SimHeap};
pub use simulated::{Call, Op, SimulatedCaps, SizeProbe, SIMULATED_MIN_ALIGN};

#[doc(no_inline)]
pub use psram_core::TieredHeap;
