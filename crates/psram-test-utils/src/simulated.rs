//! A host-side two-pool capability heap with byte-bounded pools.
//!
//! Requests whose caps contain [`Caps::SPIRAM`] are served from the
//! preferred pool, everything else from the fallback pool. Each pool has a
//! byte capacity; a request that would exceed it returns null, which is how
//! tests drive the exhaustion paths of [`TieredHeap`](psram_core::TieredHeap).

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use psram_core::{Caps, CapsBackend, Tier};

/// Alignment of every block handed out by [`SimulatedCaps`].
pub const SIMULATED_MIN_ALIGN: usize = 16;

/// Backend operation recorded in the call log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Malloc,
    Calloc,
    AlignedAlloc,
    Realloc,
    Free,
}

/// One backend request and the capabilities it asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub caps: Caps,
}

/// What `allocated_size` reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeProbe {
    /// Sizes of preferred-pool blocks only: an exact ownership query.
    PreferredOnly,
    /// Sizes of every live block, like `heap_caps_get_allocated_size`.
    AnyBlock,
}

#[derive(Clone, Copy, Debug)]
struct Block {
    size: usize,
    align: usize,
    tier: Tier,
}

#[derive(Default)]
struct Pool {
    capacity: usize,
    used: usize,
}

impl Pool {
    fn fits(&self, extra: usize) -> bool {
        self.used
            .checked_add(extra)
            .is_some_and(|total| total <= self.capacity)
    }
}

struct State {
    preferred: Pool,
    fallback: Pool,
    blocks: IndexMap<usize, Block>,
    calls: Vec<Call>,
}

impl State {
    fn pool(&self, tier: Tier) -> &Pool {
        match tier {
            Tier::Preferred => &self.preferred,
            Tier::Fallback => &self.fallback,
        }
    }

    fn pool_mut(&mut self, tier: Tier) -> &mut Pool {
        match tier {
            Tier::Preferred => &mut self.preferred,
            Tier::Fallback => &mut self.fallback,
        }
    }

    /// Reserve `size` bytes in `tier` and back them with host memory.
    fn carve(&mut self, size: usize, align: usize, tier: Tier, zeroed: bool) -> *mut u8 {
        if size == 0 || !self.pool(tier).fits(size) {
            return ptr::null_mut();
        }
        let Ok(layout) = Layout::from_size_align(size, align) else {
            return ptr::null_mut();
        };
        // SAFETY: `layout` has non-zero size.
        let block = unsafe {
            if zeroed {
                alloc::alloc_zeroed(layout)
            } else {
                alloc::alloc(layout)
            }
        };
        if block.is_null() {
            return block;
        }
        self.pool_mut(tier).used += size;
        self.blocks.insert(block as usize, Block { size, align, tier });
        block
    }

    /// Return a block's bytes to its pool and release the host memory.
    fn release(&mut self, ptr: *mut u8) {
        let Some(block) = self.blocks.swap_remove(&(ptr as usize)) else {
            panic!("simulated heap: {ptr:p} was not allocated by this heap");
        };
        self.pool_mut(block.tier).used -= block.size;
        // SAFETY: `ptr` was allocated in `carve` with exactly this layout.
        unsafe {
            alloc::dealloc(
                ptr,
                Layout::from_size_align_unchecked(block.size, block.align),
            )
        };
    }
}

/// Capacity-bounded simulation of a PSRAM + internal RAM capability heap.
///
/// Zero-size requests return null, as `heap_caps_malloc(0, ..)` does.
/// Blocks still live when the simulation is dropped are released.
pub struct SimulatedCaps {
    state: Mutex<State>,
    probe: SizeProbe,
}

impl SimulatedCaps {
    /// Create a heap whose pools hold at most the given number of bytes.
    pub fn new(preferred_capacity: usize, fallback_capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                preferred: Pool {
                    capacity: preferred_capacity,
                    used: 0,
                },
                fallback: Pool {
                    capacity: fallback_capacity,
                    used: 0,
                },
                blocks: IndexMap::new(),
                calls: Vec::new(),
            }),
            probe: SizeProbe::PreferredOnly,
        }
    }

    /// A heap with no preferred pool at all, as on a board without PSRAM.
    pub fn without_psram(fallback_capacity: usize) -> Self {
        Self::new(0, fallback_capacity)
    }

    /// Change what `allocated_size` reports.
    pub fn with_size_probe(mut self, probe: SizeProbe) -> Self {
        self.probe = probe;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tier_for(caps: Caps) -> Tier {
        if caps.contains(Caps::SPIRAM) {
            Tier::Preferred
        } else {
            Tier::Fallback
        }
    }

    /// Change a pool's capacity. Live blocks keep their bytes, so a capacity
    /// below the current usage simply refuses new requests.
    pub fn set_capacity(&self, tier: Tier, bytes: usize) {
        self.lock().pool_mut(tier).capacity = bytes;
    }

    /// Refuse every further request to `tier`.
    pub fn exhaust(&self, tier: Tier) {
        self.set_capacity(tier, 0);
    }

    /// The pool a live block belongs to, or `None` for unknown pointers.
    pub fn tier_of(&self, ptr: *const u8) -> Option<Tier> {
        self.lock().blocks.get(&(ptr as usize)).map(|b| b.tier)
    }

    /// Size of a live block, or `None` for unknown pointers.
    pub fn size_of(&self, ptr: *const u8) -> Option<usize> {
        self.lock().blocks.get(&(ptr as usize)).map(|b| b.size)
    }

    /// Bytes currently allocated from `tier`.
    pub fn used(&self, tier: Tier) -> usize {
        self.lock().pool(tier).used
    }

    /// Number of live blocks across both pools.
    pub fn live_blocks(&self) -> usize {
        self.lock().blocks.len()
    }

    /// Every backend request so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Forget the call log.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

impl Drop for SimulatedCaps {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let live: Vec<usize> = state.blocks.keys().copied().collect();
        for addr in live {
            state.release(addr as *mut u8);
        }
    }
}

unsafe impl CapsBackend for SimulatedCaps {
    const MIN_ALIGN: usize = SIMULATED_MIN_ALIGN;

    fn malloc(&self, size: usize, caps: Caps) -> *mut u8 {
        let mut state = self.lock();
        state.calls.push(Call {
            op: Op::Malloc,
            caps,
        });
        state.carve(size, SIMULATED_MIN_ALIGN, Self::tier_for(caps), false)
    }

    fn calloc(&self, count: usize, size: usize, caps: Caps) -> *mut u8 {
        let mut state = self.lock();
        state.calls.push(Call {
            op: Op::Calloc,
            caps,
        });
        match count.checked_mul(size) {
            Some(bytes) => state.carve(bytes, SIMULATED_MIN_ALIGN, Self::tier_for(caps), true),
            None => ptr::null_mut(),
        }
    }

    fn aligned_alloc(&self, align: usize, size: usize, caps: Caps) -> *mut u8 {
        let mut state = self.lock();
        state.calls.push(Call {
            op: Op::AlignedAlloc,
            caps,
        });
        let align = align.max(SIMULATED_MIN_ALIGN);
        state.carve(size, align, Self::tier_for(caps), false)
    }

    unsafe fn realloc(&self, ptr: *mut u8, size: usize, caps: Caps) -> *mut u8 {
        let mut state = self.lock();
        state.calls.push(Call {
            op: Op::Realloc,
            caps,
        });
        let Some(old) = state.blocks.get(&(ptr as usize)).copied() else {
            panic!("simulated heap: {ptr:p} was not allocated by this heap");
        };
        if size == 0 {
            state.release(ptr);
            return ptr::null_mut();
        }
        let tier = Self::tier_for(caps);
        // A same-pool move may reuse the old block's reservation.
        state.pool_mut(old.tier).used -= old.size;
        let moved = state.carve(size, old.align, tier, false);
        state.pool_mut(old.tier).used += old.size;
        if moved.is_null() {
            return moved;
        }
        // SAFETY: both blocks are live, distinct, and at least this long.
        unsafe { ptr::copy_nonoverlapping(ptr, moved, old.size.min(size)) };
        state.release(ptr);
        moved
    }

    unsafe fn free(&self, ptr: *mut u8) {
        let mut state = self.lock();
        state.calls.push(Call {
            op: Op::Free,
            caps: Caps::empty(),
        });
        if !ptr.is_null() {
            state.release(ptr);
        }
    }

    unsafe fn allocated_size(&self, ptr: *mut u8) -> usize {
        let state = self.lock();
        match state.blocks.get(&(ptr as usize)) {
            Some(block) if self.probe == SizeProbe::AnyBlock => block.size,
            Some(block) if block.tier == Tier::Preferred => block.size,
            _ => 0,
        }
    }

    fn total_size(&self, caps: Caps) -> usize {
        self.lock().pool(Self::tier_for(caps)).capacity
    }
}
