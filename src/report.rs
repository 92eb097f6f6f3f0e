//! The full analysis: transitions in, one Phi report out.
//!
//! ```text
//! TransitionTable ─► entropies ─► main_complexes ─► MIPs per complex ─► PhiReport
//! ```
//!
//! Main complexes and their MIPs are found with the configured normalization.
//! Every (complex, MIP) pair is then scored with raw effective information,
//! and the report keeps the highest; on equal scores the first pair found
//! wins.

use alloc::vec::Vec;
use core::fmt;

use crate::complex::main_complexes;
use crate::entropy::{entropies, EntropyTable};
use crate::error::{PhiError, Result};
use crate::mip::{ei_in_subset, mips_in_subset, SearchConfig};
use crate::normalization::NormalizationMethod;
use crate::partition::Partition;
use crate::state::Mask;
use crate::transition::{TransitionSource, TransitionTable};

/// Outcome of [`analyze`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhiReport {
    /// Raw effective information of the chosen complex across its MIP.
    pub phi: f64,
    /// Nodes of the chosen main complex, ascending.
    pub complex: Vec<usize>,
    /// Parts of the chosen MIP as global node masks.
    pub mip: Vec<Mask>,
    /// Every tied main complex, in discovery order.
    pub main_complexes: Vec<Vec<usize>>,
    /// Normalization used to find complexes and MIPs.
    pub normalization: NormalizationMethod,
    /// Width of the analysed network.
    pub node_count: usize,
}

impl PhiReport {
    /// The chosen MIP as a [`Partition`].
    pub fn mip_partition(&self) -> Result<Partition> {
        Partition::from_parts(&self.mip)
    }
}

impl fmt::Display for PhiReport {
    /// `phi \t mip-parts \t complex-nodes`, lists comma-joined, MIP parts
    /// zero-padded to the node count.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t", self.phi)?;
        for i in 0..self.mip.len().max(self.node_count) {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", self.mip.get(i).copied().unwrap_or(0))?;
        }
        f.write_str("\t")?;
        for (i, node) in self.complex.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

/// Run the whole pipeline on a transition table.
pub fn analyze(table: &TransitionTable, config: &SearchConfig) -> Result<PhiReport> {
    analyze_entropies(&entropies(table)?, config)
}

/// Run the whole pipeline on anything that reports transitions.
pub fn analyze_source<S: TransitionSource + ?Sized>(
    source: &S,
    config: &SearchConfig,
) -> Result<PhiReport> {
    analyze(&TransitionTable::from_source(source)?, config)
}

/// Run the pipeline from an already computed entropy table.
pub fn analyze_entropies(h: &EntropyTable, config: &SearchConfig) -> Result<PhiReport> {
    let complexes = main_complexes(h, config)?;
    let raw = config.unnormalized();

    let mut best: Option<(f64, usize, Partition)> = None;
    for (index, subset) in complexes.subsets.iter().enumerate() {
        for mip in mips_in_subset(subset, h, config)? {
            let score = ei_in_subset(subset, &mip, h, &raw)?;
            if best.as_ref().map_or(true, |(top, _, _)| score > *top) {
                best = Some((score, index, mip));
            }
        }
    }

    // `main_complexes` always reports its root and `mips` is never empty.
    let (phi, index, mip) = best.ok_or(PhiError::NoCandidates)?;
    Ok(PhiReport {
        phi,
        complex: complexes.subsets[index].clone(),
        mip: mip.parts().to_vec(),
        main_complexes: complexes.subsets,
        normalization: config.normalization,
        node_count: h.node_count(),
    })
}
