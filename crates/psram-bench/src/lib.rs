//! Benchmark workloads for the psram allocator shim.
//!
//! - [`size_trace`]: deterministic request sizes via seed, skewed toward
//!   small blocks the way firmware heaps usually are.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Largest request a trace produces.
pub const MAX_REQUEST: usize = 16 * 1024;

/// Generate `len` request sizes in `1..=MAX_REQUEST`.
///
/// Three quarters of the sizes are at most 256 bytes; the rest are spread
/// over the full range. The same seed always yields the same trace.
pub fn size_trace(len: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let roll = rng.next_u32();
            let bound = if roll % 4 == 0 { MAX_REQUEST } else { 256 };
            (rng.next_u32() as usize % bound) + 1
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_is_deterministic() {
        assert_eq!(size_trace(64, 7), size_trace(64, 7));
        assert_ne!(size_trace(64, 7), size_trace(64, 8));
    }

    #[test]
    fn sizes_are_in_range() {
        let trace = size_trace(1000, 42);
        assert!(trace.iter().all(|&s| (1..=MAX_REQUEST).contains(&s)));
        let small = trace.iter().filter(|&&s| s <= 256).count();
        assert!(small > trace.len() / 2);
    }
}
