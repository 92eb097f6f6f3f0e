//! Empirical conditional entropies of every node subset.
//!
//! For a mask `M`, each observation `(X0, X1)` is projected onto the
//! sub-network: `μ0 = X0 & M`, `μ1 = X1 & M`. With `JF(μ1, μ0)` the joint count
//! of a projected pair, `F(μ1)` the count of `μ1` alone, and `T` the total
//! number of observations:
//!
//! ```text
//! H(M) = − Σ_(μ1, μ0)  JF/T · log2(JF / F(μ1))
//! ```
//!
//! This is the plug-in estimate from observed frequencies, with no small-sample
//! correction. Every group is non-empty by construction, so `F(μ1) > 0` and
//! the logarithm is always finite.
//!
//! # Preprocessing
//!
//! Before the first query the [`EntropyEngine`] flattens its table into one
//! [`JointCount`] record per distinct `(X0, X1)` pair. Each query then sorts
//! an index array by projected key and sweeps the runs; the records
//! themselves never move.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use tracing::debug;

use crate::error::{PhiError, Result};
use crate::state::{check_subset, full_mask, local_to_global, Mask, State};
use crate::transition::TransitionTable;

/// Occurrence count of one `(X0, X1)` pair, raw or projected onto a mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointCount {
    /// Previous state (or its projection).
    pub x0: State,
    /// Next state (or its projection).
    pub x1: State,
    /// Number of observations.
    pub count: usize,
}

// ─── EntropyEngine ──────────────────────────────────────────────────────────

/// Computes [`entropy`](Self::entropy) values for one [`TransitionTable`].
///
/// Preprocessing happens on the first query and is dropped by
/// [`reset`](Self::reset) when the engine moves to another table.
#[derive(Clone, Debug)]
pub struct EntropyEngine<'t> {
    table: &'t TransitionTable,
    records: Vec<JointCount>,
    order: Vec<usize>,
    total: usize,
}

impl<'t> EntropyEngine<'t> {
    /// Engine over `table`. Fails on a table with no observations.
    pub fn new(table: &'t TransitionTable) -> Result<Self> {
        if table.is_empty() {
            return Err(PhiError::EmptyTransitionTable);
        }
        Ok(Self {
            table,
            records: Vec::new(),
            order: Vec::new(),
            total: 0,
        })
    }

    /// Switch to another table, discarding all preprocessing.
    pub fn reset(&mut self, table: &'t TransitionTable) -> Result<()> {
        if table.is_empty() {
            return Err(PhiError::EmptyTransitionTable);
        }
        self.table = table;
        self.records.clear();
        self.order.clear();
        self.total = 0;
        Ok(())
    }

    /// Width of the underlying table.
    pub fn node_count(&self) -> usize {
        self.table.node_count()
    }

    /// Number of distinct `(X0, X1)` pairs, preprocessing if needed.
    pub fn distinct_pairs(&mut self) -> usize {
        self.preprocess();
        self.records.len()
    }

    /// Total observations, preprocessing if needed.
    pub fn total(&mut self) -> usize {
        self.preprocess();
        self.total
    }

    /// `X0 → X1 → count` over the raw states.
    pub fn joint_frequencies(&mut self) -> BTreeMap<State, BTreeMap<State, usize>> {
        self.preprocess();
        let mut out: BTreeMap<State, BTreeMap<State, usize>> = BTreeMap::new();
        for r in &self.records {
            *out.entry(r.x0).or_default().entry(r.x1).or_default() += r.count;
        }
        out
    }

    /// Observations projected onto `mask` and grouped by `(μ1, μ0)`, in
    /// ascending `(μ1, μ0)` order.
    pub fn masked_frequencies(&mut self, mask: Mask) -> Result<Vec<JointCount>> {
        self.check_mask(mask)?;
        self.sort_by_projection(mask);
        let mut out: Vec<JointCount> = Vec::new();
        for &i in &self.order {
            let r = &self.records[i];
            let (mu0, mu1) = (r.x0 & mask, r.x1 & mask);
            match out.last_mut() {
                Some(last) if last.x0 == mu0 && last.x1 == mu1 => last.count += r.count,
                _ => out.push(JointCount {
                    x0: mu0,
                    x1: mu1,
                    count: r.count,
                }),
            }
        }
        Ok(out)
    }

    /// Conditional entropy of the sub-network selected by `mask`, in bits.
    ///
    /// Mask `0` returns the node count, the sentinel stored at index 0 of an
    /// [`EntropyTable`].
    pub fn entropy(&mut self, mask: Mask) -> Result<f64> {
        if mask == 0 {
            return Ok(self.node_count() as f64);
        }
        self.check_mask(mask)?;
        self.sort_by_projection(mask);

        let total = self.total as f64;
        let mut h = 0.0;
        let order = &self.order;
        let records = &self.records;
        let mut start = 0;
        while start < order.len() {
            // One run of equal μ1.
            let mu1 = records[order[start]].x1 & mask;
            let end = start
                + order[start..]
                    .iter()
                    .take_while(|&&i| records[i].x1 & mask == mu1)
                    .count();
            let marginal: usize = order[start..end].iter().map(|&i| records[i].count).sum();

            // Sub-runs of equal μ0 inside it.
            let mut sub = start;
            while sub < end {
                let mu0 = records[order[sub]].x0 & mask;
                let mut joint = 0usize;
                let mut next = sub;
                while next < end && records[order[next]].x0 & mask == mu0 {
                    joint += records[order[next]].count;
                    next += 1;
                }
                let jf = joint as f64;
                h -= jf / total * libm::log2(jf / marginal as f64);
                sub = next;
            }
            start = end;
        }
        Ok(h)
    }

    /// Entropy of every mask `0..2^N`, index 0 holding `N`.
    pub fn entropies(&mut self) -> Result<EntropyTable> {
        let node_count = self.node_count();
        let full = full_mask(node_count);
        let len = (full as usize)
            .checked_add(1)
            .ok_or(PhiError::InvalidNodeCount(node_count))?;
        let mut values = Vec::with_capacity(len);
        values.push(node_count as f64);
        for mask in 1..=full {
            values.push(self.entropy(mask)?);
        }
        debug!(
            node_count,
            distinct_pairs = self.records.len(),
            transitions = self.total,
            "entropy table complete"
        );
        Ok(EntropyTable { node_count, values })
    }

    fn check_mask(&self, mask: Mask) -> Result<()> {
        let node_count = self.node_count();
        if mask & !full_mask(node_count) != 0 {
            return Err(PhiError::MaskOutOfRange { mask, node_count });
        }
        Ok(())
    }

    fn preprocess(&mut self) {
        if !self.records.is_empty() {
            return;
        }
        let mut scratch: Vec<State> = Vec::new();
        for (x0, next) in self.table.iter() {
            scratch.clear();
            scratch.extend_from_slice(next);
            scratch.sort_unstable();
            for &x1 in &scratch {
                match self.records.last_mut() {
                    Some(last) if last.x0 == x0 && last.x1 == x1 => last.count += 1,
                    _ => self.records.push(JointCount { x0, x1, count: 1 }),
                }
            }
        }
        self.total = self.records.iter().map(|r| r.count).sum();
    }

    fn sort_by_projection(&mut self, mask: Mask) {
        self.preprocess();
        let records = &self.records;
        self.order.clear();
        self.order.extend(0..records.len());
        self.order
            .sort_unstable_by_key(|&i| (records[i].x1 & mask, records[i].x0 & mask));
    }
}

/// Entropy of every subset of `table`'s nodes.
pub fn entropies(table: &TransitionTable) -> Result<EntropyTable> {
    EntropyEngine::new(table)?.entropies()
}

// ─── EntropyTable ───────────────────────────────────────────────────────────

/// `mask → entropy` for every mask of an `N`-node network.
///
/// Index 0 is not an entropy: it stores `N`, so a table carries its own
/// width wherever it goes.
///
/// Deserialising goes through [`EntropyTable::from_values`], so a table read
/// from JSON is checked like one built by hand.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawEntropyTable"))]
pub struct EntropyTable {
    node_count: usize,
    values: Vec<f64>,
}

/// Unchecked wire form of an [`EntropyTable`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawEntropyTable {
    node_count: usize,
    values: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawEntropyTable> for EntropyTable {
    type Error = PhiError;

    fn try_from(raw: RawEntropyTable) -> Result<Self> {
        Self::from_values(raw.node_count, raw.values)
    }
}

impl EntropyTable {
    /// Wrap precomputed values indexed by mask.
    ///
    /// `values` must have exactly `2^node_count` entries. Entry 0 is
    /// overwritten with the node count.
    pub fn from_values(node_count: usize, mut values: Vec<f64>) -> Result<Self> {
        let node_count = crate::state::check_node_count(node_count)?;
        let expected = (full_mask(node_count) as usize).saturating_add(1);
        if values.len() != expected {
            return Err(PhiError::EntropyTableSize {
                node_count,
                expected,
                actual: values.len(),
            });
        }
        values[0] = node_count as f64;
        Ok(Self { node_count, values })
    }

    /// Width of the network.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Entropy of `mask` (or the node count for mask 0).
    pub fn get(&self, mask: Mask) -> Result<f64> {
        self.values
            .get(mask as usize)
            .copied()
            .ok_or(PhiError::MaskOutOfRange {
                mask,
                node_count: self.node_count,
            })
    }

    /// Entropy of the whole network.
    pub fn full(&self) -> f64 {
        self.get(full_mask(self.node_count)).unwrap_or(f64::NAN)
    }

    /// All values indexed by mask.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Table of the sub-network `subset`, re-indexed by local mask.
    ///
    /// Local node `i` is global node `subset[i]`, so local mask `m` reads the
    /// value stored at the global mask formed from the selected entries.
    pub fn reduce(&self, subset: &[usize]) -> Result<Self> {
        check_subset(subset, self.node_count)?;
        let node_count = subset.len();
        let full = full_mask(node_count);
        let mut values = Vec::with_capacity(full as usize + 1);
        values.push(node_count as f64);
        for local in 1..=full {
            values.push(self.get(local_to_global(local, subset))?);
        }
        Ok(Self { node_count, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flip_flop() -> TransitionTable {
        // 00 → 01 twice, 01 → 00 twice.
        TransitionTable::from_pairs(2, [(0b00, 0b01), (0b00, 0b01), (0b01, 0b00), (0b01, 0b00)])
            .unwrap()
    }

    #[test]
    fn test_empty_table_fails_fast() {
        let t = TransitionTable::new(2).unwrap();
        assert_eq!(EntropyEngine::new(&t).err(), Some(PhiError::EmptyTransitionTable));
        assert_eq!(entropies(&t), Err(PhiError::EmptyTransitionTable));
    }

    #[test]
    fn test_preprocessing_merges_duplicates() {
        let t = flip_flop();
        let mut e = EntropyEngine::new(&t).unwrap();
        assert_eq!(e.distinct_pairs(), 2);
        assert_eq!(e.total(), 4);
        let joint = e.joint_frequencies();
        assert_eq!(joint[&0b00][&0b01], 2);
        assert_eq!(joint[&0b01][&0b00], 2);
    }

    #[test]
    fn test_deterministic_table_has_zero_entropy() {
        let t = flip_flop();
        let table = entropies(&t).unwrap();
        assert_eq!(table.node_count(), 2);
        assert_eq!(table.get(0), Ok(2.0));
        for mask in 1..=3 {
            assert!(table.get(mask).unwrap().abs() < 1e-12, "mask {mask}");
        }
    }

    #[test]
    fn test_uniform_independent_states_give_log2_k() {
        // Every (x0, x1) over 2 nodes observed once: independent and uniform.
        let mut t = TransitionTable::new(2).unwrap();
        for x0 in 0..4 {
            for x1 in 0..4 {
                t.push(x0, x1).unwrap();
            }
        }
        let table = entropies(&t).unwrap();
        assert!((table.get(0b11).unwrap() - 2.0).abs() < 1e-12);
        assert!((table.get(0b01).unwrap() - 1.0).abs() < 1e-12);
        assert!((table.get(0b10).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hand_computed_entropy() {
        // 1 node: 0 → 0, 0 → 1, 1 → 1 (one each).
        // Groups (μ1, μ0): (0,0):1, (1,0):1, (1,1):1; F(0) = 1, F(1) = 2.
        // H = −[1/3·log2(1) + 1/3·log2(1/2) + 1/3·log2(1/2)] = 2/3.
        let t = TransitionTable::from_pairs(1, [(0, 0), (0, 1), (1, 1)]).unwrap();
        let mut e = EntropyEngine::new(&t).unwrap();
        assert!((e.entropy(1).unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_masked_frequencies_group_projection() {
        let t = TransitionTable::from_pairs(2, [(0b00, 0b11), (0b10, 0b01), (0b01, 0b10)]).unwrap();
        let mut e = EntropyEngine::new(&t).unwrap();
        let groups = e.masked_frequencies(0b01).unwrap();
        assert_eq!(
            groups,
            [
                JointCount { x0: 1, x1: 0, count: 1 },
                JointCount { x0: 0, x1: 1, count: 2 },
            ]
        );
    }

    #[test]
    fn test_mask_out_of_range() {
        let t = flip_flop();
        let mut e = EntropyEngine::new(&t).unwrap();
        assert_eq!(
            e.entropy(0b100),
            Err(PhiError::MaskOutOfRange { mask: 0b100, node_count: 2 })
        );
    }

    #[test]
    fn test_reset_switches_tables() {
        let a = flip_flop();
        let b = TransitionTable::from_pairs(1, [(0, 0), (0, 1), (1, 1)]).unwrap();
        let mut e = EntropyEngine::new(&a).unwrap();
        assert_eq!(e.total(), 4);
        e.reset(&b).unwrap();
        assert_eq!(e.node_count(), 1);
        assert_eq!(e.total(), 3);
    }

    #[test]
    fn test_reduce_reindexes_masks() {
        let values: Vec<f64> = (0..8).map(|m| m as f64 * 10.0).collect();
        let table = EntropyTable::from_values(3, values).unwrap();
        let reduced = table.reduce(&[2, 0]).unwrap();
        assert_eq!(reduced.node_count(), 2);
        // local 0b01 → global node 2 → mask 4; local 0b10 → node 0 → mask 1.
        assert_eq!(reduced.values(), &[2.0, 40.0, 10.0, 50.0]);
        assert!(table.reduce(&[]).is_err());
        assert!(table.reduce(&[0, 0]).is_err());
    }

    #[test]
    fn test_from_values_checks_length() {
        assert_eq!(
            EntropyTable::from_values(2, vec![0.0; 3]),
            Err(PhiError::EntropyTableSize { node_count: 2, expected: 4, actual: 3 })
        );
    }
}
