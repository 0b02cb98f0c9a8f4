//! Tier configuration for the two-tier heap.

use crate::caps::{Caps, Tier};
use crate::error::ConfigError;

/// Capability sets for the preferred and fallback tiers.
///
/// Constructible in `const` context so a [`TieredHeap`](crate::TieredHeap)
/// can live in a `static`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierConfig {
    /// Capabilities requested first.
    ///
    /// Default: [`Caps::SPIRAM`].
    pub preferred: Caps,

    /// Capabilities requested once when the preferred tier returns null.
    ///
    /// Default: [`Caps::DEFAULT`].
    pub fallback: Caps,
}

impl TierConfig {
    /// Default preferred tier: external PSRAM.
    pub const DEFAULT_PREFERRED: Caps = Caps::SPIRAM;

    /// Default fallback tier: whatever plain `malloc` would use.
    pub const DEFAULT_FALLBACK: Caps = Caps::DEFAULT;

    /// PSRAM first, default heap second.
    pub const DEFAULT: TierConfig =
        TierConfig::new(Self::DEFAULT_PREFERRED, Self::DEFAULT_FALLBACK);

    /// Create a config from explicit capability sets.
    pub const fn new(preferred: Caps, fallback: Caps) -> Self {
        Self {
            preferred,
            fallback,
        }
    }

    /// Capabilities for the given tier.
    pub const fn caps(&self, tier: Tier) -> Caps {
        match tier {
            Tier::Preferred => self.preferred,
            Tier::Fallback => self.fallback,
        }
    }

    /// Check that both tiers are usable and distinct.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preferred.is_empty() {
            return Err(ConfigError::EmptyCaps {
                tier: Tier::Preferred,
            });
        }
        if self.fallback.is_empty() {
            return Err(ConfigError::EmptyCaps {
                tier: Tier::Fallback,
            });
        }
        if self.preferred == self.fallback {
            return Err(ConfigError::RedundantFallback);
        }
        Ok(())
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
