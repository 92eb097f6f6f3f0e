/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Exhaustive set-partition enumeration in restricted-growth order.
//!
//! # The encoding
//!
//! A set-partition of nodes `0..N` is written as a *restricted growth string*
//! `a[0..N]`: node `i` is assigned the label of the part it belongs to, where
//! `a[0] = 0` and `a[i] ≤ 1 + max(a[0..i])`. A label equal to the number of
//! parts used so far opens a new part. Every set-partition has exactly one
//! such string, so enumerating strings enumerates partitions.
//!
//! # The order
//!
//! Strings are visited like an odometer whose last digit turns fastest and
//! whose radix at digit `i` is `1 + parts used by nodes 0..i`. For three nodes:
//!
//! ```text
//! 000 → {012}
//! 001 → {01}{2}
//! 010 → {02}{1}
//! 011 → {0}{12}
//! 012 → {0}{1}{2}
//! ```
//!
//! The first partition is always the single all-nodes part and the last is
//! the fully split one. The number of visits is the Bell number `B(N)`.
//!
//! # Incremental updates
//!
//! Advancing changes a suffix of the string. Only the nodes in that suffix are
//! moved; parts opened by the untouched prefix are kept, so each step costs
//! `O(N)` at worst and usually much less.

use alloc::vec::Vec;

use rand::Rng;

use crate::error::{PhiError, Result};
use crate::partition::Partition;
use crate::state::{check_node_count, full_mask, MAX_NODES};

// ─── Bell numbers ───────────────────────────────────────────────────────────

/// The `n`-th Bell number: how many set-partitions an `n`-element set has.
///
/// Built row by row from the Bell triangle, where each row starts with the
/// last entry of the previous row and every further entry adds the entry
/// above-left. `B(0) = 1`.
///
/// Returns [`PhiError::BellOverflow`] instead of wrapping; `B(25)` is the
/// largest Bell number that fits in a `u64`.
pub fn bell(n: usize) -> Result<u64> {
    if n == 0 {
        return Ok(1);
    }
    let mut row: Vec<u64> = Vec::with_capacity(n);
    row.push(1);
    for _ in 1..n {
        let mut next = Vec::with_capacity(row.len() + 1);
        let mut value = row[row.len() - 1];
        next.push(value);
        for &above in &row {
            value = value.checked_add(above).ok_or(PhiError::BellOverflow(n))?;
            next.push(value);
        }
        row = next;
    }
    Ok(row[row.len() - 1])
}

// ─── PartitionEnumerator ────────────────────────────────────────────────────

/// Walks every set-partition of an `N`-node set in a fixed order.
///
/// After construction (or [`resize`](Self::resize)) the enumerator sits on the
/// first partition, a single part holding all nodes.
/// [`next_partition`](Self::next_partition) advances; the enumerator can also
/// jump to any explicit partition with [`reset_partition`](Self::reset_partition)
/// and carry on from there.
#[derive(Clone, Debug)]
pub struct PartitionEnumerator {
    node_count: usize,
    /// Restricted growth string: part label of each node.
    labels: [u8; MAX_NODES],
    /// Number of parts opened by nodes `0..=i`.
    parts_through: [u8; MAX_NODES],
    partition: Partition,
}

impl PartitionEnumerator {
    /// Enumerator over partitions of `node_count` nodes, positioned on the
    /// first partition.
    pub fn new(node_count: usize) -> Result<Self> {
        let node_count = check_node_count(node_count)?;
        let mut enumerator = Self {
            node_count,
            labels: [0; MAX_NODES],
            parts_through: [0; MAX_NODES],
            partition: Partition::new(),
        };
        enumerator.first_partition();
        Ok(enumerator)
    }

    /// Change the node count and return to the first partition.
    pub fn resize(&mut self, node_count: usize) -> Result<()> {
        self.node_count = check_node_count(node_count)?;
        self.first_partition();
        Ok(())
    }

    /// Number of nodes being partitioned.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// The current partition, parts in first-appearance order.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// The restricted growth string of the current partition.
    pub fn labels(&self) -> &[u8] {
        &self.labels[..self.node_count]
    }

    /// Total number of partitions this enumerator visits, `B(node_count)`.
    pub fn partition_count(&self) -> Result<u64> {
        bell(self.node_count)
    }

    /// Jump back to the single all-nodes partition.
    pub fn first_partition(&mut self) {
        self.labels = [0; MAX_NODES];
        self.rebuild_from(0);
    }

    /// Advance to the next partition.
    ///
    /// Returns `false` when the current partition was the last one (every node
    /// alone); the enumerator then wraps around to the first partition, so a
    /// loop of `B(N) − 1` successful calls visits everything exactly once.
    pub fn next_partition(&mut self) -> bool {
        for node in (1..self.node_count).rev() {
            if self.labels[node] < self.parts_through[node - 1] {
                self.labels[node] += 1;
                for label in &mut self.labels[node + 1..self.node_count] {
                    *label = 0;
                }
                self.rebuild_from(node);
                return true;
            }
        }
        self.first_partition();
        false
    }

    /// Draw a partition by picking, for every node after the first, a
    /// uniformly random label among the parts opened so far plus one new part.
    ///
    /// Uniform over restricted growth strings, *not* over partitions: splits
    /// with many small parts come up more often than their share. Does not
    /// move the enumerator.
    pub fn random_partition<R: Rng + ?Sized>(&self, rng: &mut R) -> Partition {
        let mut out = Partition::new();
        out.push_part(1);
        let mut used = 1usize;
        for node in 1..self.node_count {
            let label = rng.gen_range(0..=used);
            if label == used {
                out.push_part(1 << node);
                used += 1;
            } else {
                out.add_to_part(label, 1 << node);
            }
        }
        out
    }

    /// Move the enumerator onto an explicit partition.
    ///
    /// The parts may come in any order; the enumerator stores them in
    /// first-appearance order. A later [`next_partition`](Self::next_partition)
    /// continues from exactly this point of the enumeration.
    ///
    /// Fails with [`PhiError::InvalidPartition`] if the parts are not disjoint
    /// or do not cover all `node_count` nodes.
    pub fn reset_partition(&mut self, partition: &Partition) -> Result<()> {
        let universe = full_mask(self.node_count);
        partition.validate(universe)?;

        let mut label_of_part: [Option<u8>; MAX_NODES] = [None; MAX_NODES];
        let mut next_label = 0u8;
        for node in 0..self.node_count {
            let part = partition
                .parts()
                .iter()
                .position(|&p| p & (1 << node) != 0)
                .ok_or(PhiError::InvalidPartition { universe })?;
            let label = *label_of_part[part].get_or_insert_with(|| {
                next_label += 1;
                next_label - 1
            });
            self.labels[node] = label;
        }
        self.rebuild_from(0);
        Ok(())
    }

    /// Move the enumerator to a point chosen by continuous parameters.
    ///
    /// `fractions[i]` steers node `i + 1`: with `c` choices available (every
    /// part opened so far plus a new one) the node takes choice
    /// `⌊fractions[i] · c⌋`. Node 0 always opens part 0, so exactly
    /// `node_count − 1` values are expected, each finite and in `[0, 1)`.
    pub fn reset_from_fractions(&mut self, fractions: &[f64]) -> Result<()> {
        let expected = self.node_count - 1;
        if fractions.len() != expected {
            return Err(PhiError::FractionCountMismatch {
                expected,
                actual: fractions.len(),
            });
        }
        if let Some((i, &value)) = fractions
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0 || **v >= 1.0)
        {
            return Err(PhiError::InvalidFraction { node: i + 1, value });
        }

        self.labels = [0; MAX_NODES];
        let mut used = 1usize;
        for (node, &fraction) in (1..self.node_count).zip(fractions) {
            let choices = used + 1;
            let label = ((fraction * choices as f64) as usize).min(used);
            self.labels[node] = label as u8;
            if label == used {
                used += 1;
            }
        }
        self.rebuild_from(0);
        Ok(())
    }

    /// Re-derive the parts for nodes `start..` from the label string, keeping
    /// whatever nodes `0..start` already built.
    fn rebuild_from(&mut self, start: usize) {
        if start == 0 {
            self.partition.clear();
        } else {
            let kept = self.parts_through[start - 1] as usize;
            self.partition.retain_prefix(kept, full_mask(start));
        }
        for node in start..self.node_count {
            let used = if node == 0 { 0 } else { self.parts_through[node - 1] };
            let label = self.labels[node];
            if label == used {
                self.partition.push_part(1 << node);
                self.parts_through[node] = used + 1;
            } else {
                self.partition.add_to_part(label as usize, 1 << node);
                self.parts_through[node] = used;
            }
        }
    }
}

// ─── Iterator adapter ───────────────────────────────────────────────────────

/// Iterator over every partition of `node_count` nodes, first to last.
///
/// Yields `B(node_count)` items and then stops.
pub fn partitions(node_count: usize) -> Result<Partitions> {
    Ok(Partitions {
        enumerator: PartitionEnumerator::new(node_count)?,
        done: false,
    })
}

/// Iterator returned by [`partitions`].
#[derive(Clone, Debug)]
pub struct Partitions {
    enumerator: PartitionEnumerator,
    done: bool,
}

impl Iterator for Partitions {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        if self.done {
            return None;
        }
        let current = self.enumerator.partition().clone();
        if !self.enumerator.next_partition() {
            self.done = true;
        }
        Some(current)
    }
}
