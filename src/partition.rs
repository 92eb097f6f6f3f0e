/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Set-partitions of a node set, stored as a short list of disjoint masks.
//!
//! A [`Partition`] of an `N`-node network is a sequence of non-empty, pairwise
//! disjoint masks whose union is the full node mask. It lives inline in a
//! fixed-capacity `heapless::Vec` (at most one part per node), so the search
//! loops copy partitions without touching the allocator.
//!
//! # Part order
//!
//! The enumerator emits parts in order of first appearance: part 0 holds node
//! 0, part 1 holds the lowest node not in part 0, and so on. The canonical
//! form ([`Partition::canonical`]) sorts parts ascending by mask value instead.
//! Two partitions describe the same grouping exactly when their canonical
//! forms are equal ([`Partition::same_parts`]).
//!
//! # Low-level padded form
//!
//! Text reports and older callers use a fixed-length list of masks with
//! trailing zeros. [`Partition::to_padded`] and [`Partition::from_padded`]
//! convert to and from that form; zeros are never part of a `Partition`.
//! The counted form ([`Partition::to_counted`], [`Partition::from_counted`])
//! puts the part count `k` in slot 0 and the masks in slots `1..=k`.

use alloc::vec::Vec;
use core::fmt;

use heapless::Vec as HVec;

use crate::error::{PhiError, Result};
use crate::state::{check_node_count, full_mask, Mask, MAX_NODES};

/// Disjoint, non-empty node masks. See the module docs for ordering rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Partition {
    parts: HVec<Mask, MAX_NODES>,
}

impl Partition {
    /// Partition with no parts. Only useful as a buffer to push into.
    pub fn new() -> Self {
        Self { parts: HVec::new() }
    }

    /// Build from explicit part masks.
    ///
    /// Every mask must be non-zero. Coverage and disjointness are not checked
    /// here; call [`Partition::validate`] against the intended node mask.
    pub fn from_parts(parts: &[Mask]) -> Result<Self> {
        let universe = parts.iter().fold(0, |acc, &p| acc | p);
        if parts.len() > MAX_NODES || parts.iter().any(|&p| p == 0) {
            return Err(PhiError::InvalidPartition { universe });
        }
        let mut out = Self::new();
        for &p in parts {
            out.push_part(p);
        }
        Ok(out)
    }

    /// Build from the padded low-level form: masks up to the first zero.
    pub fn from_padded(padded: &[Mask]) -> Result<Self> {
        let len = padded.iter().take_while(|&&p| p != 0).count();
        Self::from_parts(&padded[..len])
    }

    /// One part holding every node.
    pub fn total(node_count: usize) -> Result<Self> {
        let node_count = check_node_count(node_count)?;
        let mut out = Self::new();
        out.push_part(full_mask(node_count));
        Ok(out)
    }

    /// Every node in its own part.
    pub fn atomic(node_count: usize) -> Result<Self> {
        let node_count = check_node_count(node_count)?;
        let mut out = Self::new();
        for n in 0..node_count {
            out.push_part(1 << n);
        }
        Ok(out)
    }

    /// Part masks in stored order.
    #[inline]
    pub fn parts(&self) -> &[Mask] {
        &self.parts
    }

    /// Number of parts (`k`).
    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// `true` if there are no parts.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Bitwise OR of every part.
    pub fn union(&self) -> Mask {
        self.parts.iter().fold(0, |acc, &p| acc | p)
    }

    /// `true` if the parts are non-empty, pairwise disjoint and cover exactly
    /// `universe`.
    pub fn is_partition_of(&self, universe: Mask) -> bool {
        if self.parts.is_empty() {
            return false;
        }
        let mut seen: Mask = 0;
        for &p in &self.parts {
            if p == 0 || seen & p != 0 {
                return false;
            }
            seen |= p;
        }
        seen == universe
    }

    /// [`Partition::is_partition_of`] as a `Result`.
    pub fn validate(&self, universe: Mask) -> Result<()> {
        if self.is_partition_of(universe) {
            Ok(())
        } else {
            Err(PhiError::InvalidPartition { universe })
        }
    }

    /// Copy with parts sorted ascending by mask value.
    pub fn canonical(&self) -> Self {
        let mut out = self.clone();
        out.parts.sort_unstable();
        out
    }

    /// `true` if parts are already strictly ascending.
    pub fn is_canonical(&self) -> bool {
        self.parts.windows(2).all(|w| w[0] < w[1])
    }

    /// Same grouping of nodes, regardless of part order.
    pub fn same_parts(&self, other: &Self) -> bool {
        self.len() == other.len() && self.canonical() == other.canonical()
    }

    /// Low-level form: part masks followed by zeros up to `len` entries.
    ///
    /// Never truncates; if `len` is shorter than the part count the result
    /// simply has no padding.
    pub fn to_padded(&self, len: usize) -> Vec<Mask> {
        let mut out: Vec<Mask> = self.parts.iter().copied().collect();
        if out.len() < len {
            out.resize(len, 0);
        }
        out
    }

    /// Counted form: `[k, part_1, …, part_k]`, zero-padded to `len + 1`
    /// entries.
    pub fn to_counted(&self, len: usize) -> Vec<Mask> {
        let mut out = Vec::with_capacity(len.max(self.len()) + 1);
        out.push(self.len() as Mask);
        out.extend_from_slice(&self.parts);
        if out.len() < len + 1 {
            out.resize(len + 1, 0);
        }
        out
    }

    /// Read the counted form. Slots after `1..=k` are ignored.
    pub fn from_counted(counted: &[Mask]) -> Result<Self> {
        let k = counted.first().copied().unwrap_or(0) as usize;
        match counted.get(1..=k) {
            Some(parts) if k > 0 => Self::from_parts(parts),
            _ => Err(PhiError::InvalidPartition {
                universe: counted.iter().skip(1).fold(0, |acc, &p| acc | p),
            }),
        }
    }

    /// Rename local node `i` to `subset[i]` in every part.
    ///
    /// Turns a partition found on a reduced entropy table back into global
    /// node indices. Bits beyond `subset.len()` are dropped.
    pub fn remap_to_global(&self, subset: &[usize]) -> Self {
        let mut out = Self::new();
        for &part in &self.parts {
            let mut mapped: Mask = 0;
            for (local, &global) in subset.iter().enumerate().take(MAX_NODES) {
                if part & (1 << local) != 0 && global < MAX_NODES {
                    mapped |= 1 << global;
                }
            }
            if mapped != 0 {
                out.push_part(mapped);
            }
        }
        out
    }

    /// Inverse of [`Partition::remap_to_global`]: rename global node
    /// `subset[i]` to local node `i`.
    ///
    /// Nodes outside `subset` are dropped, and so are parts left empty.
    pub fn restrict_to_subset(&self, subset: &[usize]) -> Self {
        let mut out = Self::new();
        for &part in &self.parts {
            let mut local_part: Mask = 0;
            for (local, &global) in subset.iter().enumerate().take(MAX_NODES) {
                if global < MAX_NODES && part & (1 << global) != 0 {
                    local_part |= 1 << local;
                }
            }
            if local_part != 0 {
                out.push_part(local_part);
            }
        }
        out
    }

    // ── crate-internal mutation used by the enumerator ────────────────────

    /// Append a part. Capacity is one part per node, so a partition of at most
    /// `MAX_NODES` nodes can never overflow it.
    #[inline]
    pub(crate) fn push_part(&mut self, mask: Mask) {
        let _ = self.parts.push(mask);
    }

    #[inline]
    pub(crate) fn add_to_part(&mut self, index: usize, bit: Mask) {
        if let Some(part) = self.parts.get_mut(index) {
            *part |= bit;
        }
    }

    /// Keep the first `len` parts and clear every bit outside `keep`.
    pub(crate) fn retain_prefix(&mut self, len: usize, keep: Mask) {
        self.parts.truncate(len);
        for part in self.parts.iter_mut() {
            *part &= keep;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.parts.clear();
    }
}

impl fmt::Display for Partition {
    /// Comma-joined part masks, e.g. `3,4`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_total_and_atomic() {
        let total = Partition::total(3).unwrap();
        assert_eq!(total.parts(), &[0b111]);
        let atomic = Partition::atomic(3).unwrap();
        assert_eq!(atomic.parts(), &[0b001, 0b010, 0b100]);
        assert!(total.is_partition_of(0b111));
        assert!(atomic.is_partition_of(0b111));
    }

    #[test]
    fn test_zero_mask_rejected() {
        assert!(Partition::from_parts(&[0b01, 0]).is_err());
    }

    #[test]
    fn test_overlap_and_gap_are_invalid() {
        let overlapping = Partition::from_parts(&[0b011, 0b110]).unwrap();
        assert!(!overlapping.is_partition_of(0b111));
        let gap = Partition::from_parts(&[0b001, 0b010]).unwrap();
        assert!(!gap.is_partition_of(0b111));
        assert_eq!(
            gap.validate(0b111),
            Err(PhiError::InvalidPartition { universe: 0b111 })
        );
    }

    #[test]
    fn test_canonical_sorts_by_mask() {
        // {0,2} {1}: first-appearance order puts 0b101 first.
        let p = Partition::from_parts(&[0b101, 0b010]).unwrap();
        assert!(!p.is_canonical());
        let c = p.canonical();
        assert_eq!(c.parts(), &[0b010, 0b101]);
        assert!(c.is_canonical());
        assert!(p.same_parts(&c));
    }

    #[test]
    fn test_padded_round_trip() {
        let p = Partition::from_parts(&[0b0011, 0b1100]).unwrap();
        let padded = p.to_padded(4);
        assert_eq!(padded, [0b0011, 0b1100, 0, 0]);
        assert_eq!(Partition::from_padded(&padded).unwrap(), p);
    }

    #[test]
    fn test_counted_form() {
        let p = Partition::from_parts(&[0b0011, 0b1100]).unwrap();
        let counted = p.to_counted(4);
        assert_eq!(counted, [2, 0b0011, 0b1100, 0, 0]);
        assert_eq!(Partition::from_counted(&counted).unwrap(), p);
        assert!(Partition::from_counted(&[3, 1, 2]).is_err());
        assert!(Partition::from_counted(&[]).is_err());
    }

    #[test]
    fn test_remap_and_restrict_are_inverse() {
        let subset = [1usize, 3, 4];
        // Local {0,2} {1} → global {1,4} {3}
        let local = Partition::from_parts(&[0b101, 0b010]).unwrap();
        let global = local.remap_to_global(&subset);
        assert_eq!(global.parts(), &[0b1_0010, 0b0_1000]);
        assert_eq!(global.restrict_to_subset(&subset), local);
    }

    #[test]
    fn test_display_is_comma_joined() {
        let p = Partition::from_parts(&[3, 4]).unwrap();
        assert_eq!(p.to_string(), "3,4");
    }
}
