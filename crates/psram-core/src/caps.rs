//! Heap capability flags and allocation tiers.
//!
//! Bit values match ESP-IDF's `MALLOC_CAP_*` constants so a [`Caps`] can be
//! handed to `heap_caps_*` unchanged.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// A set of heap capabilities a block of memory must satisfy.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Caps(u32);

impl Caps {
    /// Memory must be able to run executable code.
    pub const EXEC: Caps = Caps(1 << 0);
    /// Memory must allow 32-bit aligned access.
    pub const BIT32: Caps = Caps(1 << 1);
    /// Memory must allow byte-addressed access.
    pub const BIT8: Caps = Caps(1 << 2);
    /// Memory must be reachable by DMA engines.
    pub const DMA: Caps = Caps(1 << 3);
    /// Memory must live in external SPI RAM (PSRAM).
    pub const SPIRAM: Caps = Caps(1 << 10);
    /// Memory must be internal on-chip RAM.
    pub const INTERNAL: Caps = Caps(1 << 11);
    /// The pool plain `malloc` draws from.
    pub const DEFAULT: Caps = Caps(1 << 12);

    /// The empty capability set.
    pub const fn empty() -> Self {
        Caps(0)
    }

    /// Build a set from raw `MALLOC_CAP_*` bits.
    pub const fn from_bits(bits: u32) -> Self {
        Caps(bits)
    }

    /// Raw bits, suitable for `heap_caps_*` calls.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Union of two sets, usable in `const` contexts.
    pub const fn union(self, other: Caps) -> Self {
        Caps(self.0 | other.0)
    }

    /// Whether every capability in `other` is also in `self`.
    pub const fn contains(self, other: Caps) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no capability bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Caps {
    type Output = Caps;

    fn bitor(self, rhs: Caps) -> Caps {
        self.union(rhs)
    }
}

impl BitOrAssign for Caps {
    fn bitor_assign(&mut self, rhs: Caps) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Caps, &str); 7] = [
            (Caps::EXEC, "EXEC"),
            (Caps::BIT32, "BIT32"),
            (Caps::BIT8, "BIT8"),
            (Caps::DMA, "DMA"),
            (Caps::SPIRAM, "SPIRAM"),
            (Caps::INTERNAL, "INTERNAL"),
            (Caps::DEFAULT, "DEFAULT"),
        ];
        let mut rest = self.0;
        let mut first = true;
        f.write_str("Caps(")?;
        for (caps, name) in NAMES {
            if self.contains(caps) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                rest &= !caps.0;
                first = false;
            }
        }
        if rest != 0 {
            if !first {
                f.write_str(" | ")?;
            }
            write!(f, "{rest:#x}")?;
        } else if first {
            f.write_str("empty")?;
        }
        f.write_str(")")
    }
}

/// Which pool of a two-tier heap a request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    /// The capability-tagged pool tried first (PSRAM by default).
    Preferred,
    /// The default pool used once the preferred pool is exhausted.
    Fallback,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Preferred => f.write_str("preferred"),
            Tier::Fallback => f.write_str("fallback"),
        }
    }
}
