//! Configuration error types.
//!
//! Allocation exhaustion is never an error value: it is reported as a null
//! pointer by every allocating operation.

use core::error::Error;
use core::fmt;

use crate::caps::Tier;

/// Errors found while validating a [`TierConfig`](crate::TierConfig).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A tier was configured with no capability bits at all.
    EmptyCaps {
        /// The tier with the empty set.
        tier: Tier,
    },
    /// The fallback tier asks for exactly the preferred capabilities, so the
    /// retry could never find memory the first request missed.
    RedundantFallback,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCaps { tier } => {
                write!(f, "{tier} tier has an empty capability set")
            }
            Self::RedundantFallback => {
                write!(f, "fallback tier repeats the preferred capabilities")
            }
        }
    }
}

impl Error for ConfigError {}
