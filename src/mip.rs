//! Minimum Information Partition search.
//!
//! [`mips`] walks every set-partition of a table's nodes, scores each one with
//! the configured [`NormalizationMethod`], and keeps all partitions tied for
//! the lowest score. MIPs are not unique in general, and callers that need a
//! single one take the first: it is the earliest in enumeration order.
//!
//! # Search policy
//!
//! ```text
//! best  = [all-in-one partition]      min = N
//! for every later partition P:
//!     |score(P) − min| <  tolerance   → best.push(P)
//!      score(P) − min  < −tolerance   → best = [P], min = score(P)
//! ```
//!
//! The subset variants run the same search on a reduced entropy table and map
//! the result back to global node indices.

use alloc::vec::Vec;

use tracing::debug;

use crate::enumerator::PartitionEnumerator;
use crate::entropy::EntropyTable;
use crate::error::Result;
use crate::normalization::{NodeDegree, NormalizationMethod, Scorer};
use crate::partition::Partition;
use crate::state::{check_subset, full_mask};

/// Scores closer than this are tied MIPs.
pub const DEFAULT_MIP_TOLERANCE: f64 = 1e-10;

/// Phi values closer than this are tied main complexes.
pub const DEFAULT_PHI_TOLERANCE: f64 = 1e-6;

// ─── SearchConfig ───────────────────────────────────────────────────────────

/// Everything a search needs besides the data: passed by reference through
/// every call and recursion level.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Scoring method for candidate partitions.
    pub normalization: NormalizationMethod,
    /// Average node degree, required by [`NormalizationMethod::AvgNodeDegree`].
    pub avg_node_degree: Option<f64>,
    /// Tie tolerance for MIP scores.
    pub mip_tolerance: f64,
    /// Tie tolerance for main-complex Phi values.
    pub phi_tolerance: f64,
}

impl SearchConfig {
    /// Default tolerances with the given method.
    pub fn new(normalization: NormalizationMethod) -> Self {
        Self {
            normalization,
            avg_node_degree: None,
            mip_tolerance: DEFAULT_MIP_TOLERANCE,
            phi_tolerance: DEFAULT_PHI_TOLERANCE,
        }
    }

    /// Same config, different method.
    pub fn with_normalization(mut self, normalization: NormalizationMethod) -> Self {
        self.normalization = normalization;
        self
    }

    /// Same config with an explicit average node degree.
    ///
    /// Not checked here: a search with [`NormalizationMethod::AvgNodeDegree`]
    /// fails with [`PhiError::InvalidNodeDegree`](crate::error::PhiError::InvalidNodeDegree)
    /// if it is negative or not finite.
    pub fn with_avg_node_degree(mut self, degree: f64) -> Self {
        self.avg_node_degree = Some(degree);
        self
    }

    /// Same config with the average taken from `degree`.
    pub fn with_node_degree(self, degree: &NodeDegree) -> Self {
        self.with_avg_node_degree(degree.average())
    }

    /// Same config scoring raw effective information.
    pub fn unnormalized(self) -> Self {
        self.with_normalization(NormalizationMethod::None)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(NormalizationMethod::None)
    }
}

// ─── Search ─────────────────────────────────────────────────────────────────

/// All partitions of `entropies`' nodes tied for the minimum score.
///
/// Never empty: with no better candidate the all-in-one partition is the
/// answer.
pub fn mips(entropies: &EntropyTable, config: &SearchConfig) -> Result<Vec<Partition>> {
    let node_count = entropies.node_count();
    let mut scorer = Scorer::new(entropies, config.normalization, config.avg_node_degree)?;
    let mut enumerator = PartitionEnumerator::new(node_count)?;

    let mut best: Vec<Partition> = Vec::new();
    best.push(enumerator.partition().clone());
    let mut min = node_count as f64;

    while enumerator.next_partition() {
        let score = scorer.score(enumerator.partition())?;
        let diff = score - min;
        if libm::fabs(diff) < config.mip_tolerance {
            best.push(enumerator.partition().clone());
        } else if diff < 0.0 {
            best.clear();
            best.push(enumerator.partition().clone());
            min = score;
        }
    }

    debug!(
        node_count,
        normalization = %config.normalization,
        ties = best.len(),
        min,
        "MIP search complete"
    );
    Ok(best)
}

/// MIPs of the sub-network `subset`, in global node indices.
pub fn mips_in_subset(
    subset: &[usize],
    entropies: &EntropyTable,
    config: &SearchConfig,
) -> Result<Vec<Partition>> {
    let reduced = entropies.reduce(subset)?;
    Ok(mips(&reduced, config)?
        .iter()
        .map(|p| p.remap_to_global(subset))
        .collect())
}

/// Score of one partition of the full node set.
pub fn ei(partition: &Partition, entropies: &EntropyTable, config: &SearchConfig) -> Result<f64> {
    partition.validate(full_mask(entropies.node_count()))?;
    Scorer::new(entropies, config.normalization, config.avg_node_degree)?.score(partition)
}

/// Score of a partition of `subset`, given in global masks.
pub fn ei_in_subset(
    subset: &[usize],
    partition: &Partition,
    entropies: &EntropyTable,
    config: &SearchConfig,
) -> Result<f64> {
    let subset_mask = check_subset(subset, entropies.node_count())?;
    partition.validate(subset_mask)?;
    let reduced = entropies.reduce(subset)?;
    ei(&partition.restrict_to_subset(subset), &reduced, config)
}
