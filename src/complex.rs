//! Main-complex search: the node subsets whose own MIP loses the most
//! information.
//!
//! For a subset `S`, `Phi(S)` is the absolute raw effective information of
//! the first MIP of `S` (found with the configured normalization) on the
//! entropy table reduced to `S`. The search visits subsets depth-first by
//! removing one node at a time, each node at most once per branch and in
//! increasing index order, so every subset reachable from the start is
//! visited exactly once:
//!
//! ```text
//! visit(S, from):
//!     evaluate Phi(S)
//!     for n in from..N where n ∈ S:
//!         if |S − {n}| > 1: visit(S − {n}, n + 1)
//! ```
//!
//! Ties: a subset within `phi_tolerance` of the best joins the result and
//! leaves the best value alone; a strictly larger one replaces the result.

use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::entropy::EntropyTable;
use crate::error::{PhiError, Result};
use crate::mip::{ei, mips, SearchConfig};
use crate::state::check_subset;

/// Best subsets found by [`main_complexes`] and their shared Phi.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MainComplexes {
    /// Tied best subsets in discovery order, each as ascending node indices.
    pub subsets: Vec<Vec<usize>>,
    /// Phi of the first subset found at the best level.
    pub phi: f64,
    /// Number of subsets evaluated.
    pub visited: usize,
}

impl MainComplexes {
    /// First (earliest found) main complex.
    pub fn first(&self) -> Option<&[usize]> {
        self.subsets.first().map(Vec::as_slice)
    }
}

/// Main complexes of the whole network.
pub fn main_complexes(entropies: &EntropyTable, config: &SearchConfig) -> Result<MainComplexes> {
    let all: Vec<usize> = (0..entropies.node_count()).collect();
    main_complexes_from(&all, entropies, config)
}

/// Main complexes among `start` and the subsets reachable from it by node
/// removal.
pub fn main_complexes_from(
    start: &[usize],
    entropies: &EntropyTable,
    config: &SearchConfig,
) -> Result<MainComplexes> {
    check_subset(start, entropies.node_count())?;
    let mut root: Vec<usize> = start.to_vec();
    root.sort_unstable();

    let mut search = Search {
        entropies,
        config,
        best: MainComplexes {
            subsets: Vec::new(),
            phi: -1.0,
            visited: 0,
        },
    };
    search.visit(&root, 0)?;

    debug!(
        visited = search.best.visited,
        phi = search.best.phi,
        complexes = search.best.subsets.len(),
        "main-complex search complete"
    );
    Ok(search.best)
}

struct Search<'a> {
    entropies: &'a EntropyTable,
    config: &'a SearchConfig,
    best: MainComplexes,
}

impl Search<'_> {
    fn visit(&mut self, subset: &[usize], from: usize) -> Result<()> {
        let phi = self.phi(subset)?;
        self.best.visited += 1;

        if libm::fabs(phi - self.best.phi) < self.config.phi_tolerance {
            trace!(?subset, phi, "tied main complex");
            self.best.subsets.push(subset.to_vec());
        } else if phi > self.best.phi {
            trace!(?subset, phi, "new best main complex");
            self.best.subsets.clear();
            self.best.subsets.push(subset.to_vec());
            self.best.phi = phi;
        }

        for n in from..self.entropies.node_count() {
            let Some(pos) = subset.iter().position(|&node| node == n) else {
                continue;
            };
            if subset.len() - 1 > 1 {
                let mut child = subset.to_vec();
                child.remove(pos);
                self.visit(&child, n + 1)?;
            }
        }
        Ok(())
    }

    fn phi(&self, subset: &[usize]) -> Result<f64> {
        let reduced = self.entropies.reduce(subset)?;
        let found = mips(&reduced, self.config)?;
        let mip = found.first().ok_or(PhiError::NoCandidates)?;
        Ok(libm::fabs(ei(mip, &reduced, &self.config.unnormalized())?))
    }
}
