//! Motif counting.
//!
//! A motif is a weakly connected induced subgraph on `k` vertices, `k` being
//! 3 or 4. Counting proceeds in three stages that both execution strategies
//! share:
//!
//! 1. **Enumerate** every connected `k`-vertex subset exactly once
//!    ([`enumerate`]).
//! 2. **Classify** the induced directed edge pattern into its isomorphism
//!    class ([`catalog`]).
//! 3. **Tally** one occurrence of that class for each member vertex
//!    ([`tally`]).
//!
//! [`strategy`] picks between the rayon-based [`cpu`] path and the
//! data-parallel `accelerated` path, which runs its kernels on a CUDA device
//! or on the host; all of them produce identical [`MotifCounts`].

pub mod catalog;
pub mod cpu;
pub mod enumerate;
pub mod strategy;
pub mod tally;

#[cfg(feature = "accelerator")]
pub mod accelerated;

use std::fmt;

use graphfeat_common::utils::error::Error;

pub use catalog::{MotifCatalog, catalog};
pub use cpu::CpuStrategy;
pub use strategy::{
    AcceleratorBackend, AcceleratorConfig, AcceleratorFallback, MotifOptions, MotifStrategy,
    count_motifs, select_strategy,
};
pub use tally::MotifCounts;

#[cfg(feature = "accelerator")]
pub use accelerated::AcceleratedStrategy;

/// Supported motif sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MotifLevel {
    /// Three-vertex motifs, 13 classes.
    Three,
    /// Four-vertex motifs, 199 classes.
    Four,
}

impl MotifLevel {
    /// Number of vertices in a motif of this level.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            MotifLevel::Three => 3,
            MotifLevel::Four => 4,
        }
    }

    /// Number of weakly connected directed isomorphism classes.
    #[inline]
    #[must_use]
    pub const fn num_classes(self) -> usize {
        match self {
            MotifLevel::Three => 13,
            MotifLevel::Four => 199,
        }
    }

    /// Number of ordered vertex pairs, i.e. bits in an edge pattern.
    #[inline]
    #[must_use]
    pub const fn pattern_bits(self) -> usize {
        let k = self.size();
        k * (k - 1)
    }
}

impl TryFrom<usize> for MotifLevel {
    type Error = Error;

    fn try_from(k: usize) -> Result<Self, Self::Error> {
        match k {
            3 => Ok(MotifLevel::Three),
            4 => Ok(MotifLevel::Four),
            other => Err(Error::UnsupportedMotifSize(other)),
        }
    }
}

impl fmt::Display for MotifLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_size() {
        assert_eq!(MotifLevel::try_from(3).unwrap(), MotifLevel::Three);
        assert_eq!(MotifLevel::try_from(4).unwrap(), MotifLevel::Four);
        assert_eq!(
            MotifLevel::try_from(5).unwrap_err(),
            Error::UnsupportedMotifSize(5)
        );
        assert!(MotifLevel::try_from(2).is_err());
    }

    #[test]
    fn test_level_sizes() {
        assert_eq!(MotifLevel::Three.pattern_bits(), 6);
        assert_eq!(MotifLevel::Four.pattern_bits(), 12);
        assert_eq!(MotifLevel::Four.to_string(), "4");
    }
}
