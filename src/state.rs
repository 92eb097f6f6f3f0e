//! Network states, node masks and the memoised part-size cache.
//!
//! A network of `N` binary nodes is encoded in a fixed-width [`State`]: bit `i`
//! is the on/off value of node `i` at one timestep. The same integer type is
//! reused as a [`Mask`] selecting a subset of nodes, so projecting a state onto
//! a sub-network is a single `state & mask`.
//!
//! Mask `0` never names a real subset. Entropy tables use it to carry the
//! network's node count.

use hashbrown::HashMap;

use crate::error::{PhiError, Result};

/// One timestep of network activity, one bit per node.
pub type State = u32;

/// A subset of nodes, one bit per node.
pub type Mask = u32;

/// Widest network a [`State`] can describe.
pub const MAX_NODES: usize = State::BITS as usize;

/// Mask with the low `node_count` bits set.
///
/// `full_mask(32)` is `u32::MAX`; the shift is never allowed to overflow.
#[inline]
pub fn full_mask(node_count: usize) -> Mask {
    if node_count >= MAX_NODES {
        Mask::MAX
    } else {
        (1 << node_count) - 1
    }
}

/// Number of nodes selected by `mask`.
#[inline]
pub fn node_count_of(mask: Mask) -> usize {
    mask.count_ones() as usize
}

/// Reject node counts the fixed-width encoding cannot hold.
pub fn check_node_count(node_count: usize) -> Result<usize> {
    if node_count == 0 || node_count > MAX_NODES {
        return Err(PhiError::InvalidNodeCount(node_count));
    }
    Ok(node_count)
}

/// Reject states with bits above `node_count`.
pub fn check_state(state: u64, node_count: usize) -> Result<State> {
    if state > u64::from(full_mask(node_count)) {
        return Err(PhiError::StateOutOfRange { state, node_count });
    }
    Ok(state as State)
}

/// Fold a list of node indices into a mask.
pub fn mask_of(nodes: &[usize]) -> Mask {
    nodes
        .iter()
        .filter(|&&n| n < MAX_NODES)
        .fold(0, |acc, &n| acc | (1 << n))
}

/// Iterate the node indices set in `mask`, lowest first.
pub fn nodes_of(mask: Mask) -> impl Iterator<Item = usize> {
    (0..MAX_NODES).filter(move |&n| mask & (1 << n) != 0)
}

/// Validate a subset of global node indices against an `node_count`-node
/// network and return its global mask.
///
/// The subset must be non-empty, no longer than the network, free of
/// duplicates and within range.
pub fn check_subset(subset: &[usize], node_count: usize) -> Result<Mask> {
    if subset.is_empty() {
        return Err(PhiError::EmptySubset);
    }
    if subset.len() > node_count {
        return Err(PhiError::SubsetTooLarge {
            len: subset.len(),
            node_count,
        });
    }
    let mut mask: Mask = 0;
    for &node in subset {
        if node >= node_count || node >= MAX_NODES {
            return Err(PhiError::NodeOutOfRange { node, node_count });
        }
        if mask & (1 << node) != 0 {
            return Err(PhiError::DuplicateNode(node));
        }
        mask |= 1 << node;
    }
    Ok(mask)
}

/// Translate a mask over local indices `0..subset.len()` into the global
/// mask it stands for: local bit `i` becomes bit `subset[i]`.
#[inline]
pub fn local_to_global(local: Mask, subset: &[usize]) -> Mask {
    subset
        .iter()
        .enumerate()
        .take(MAX_NODES)
        .filter(|&(i, &node)| local & (1 << i) != 0 && node < MAX_NODES)
        .fold(0, |acc, (_, &node)| acc | (1 << node))
}

// ─── PartSizeCache ──────────────────────────────────────────────────────────

/// Widest network [`PartSizeCache::precomputed`] fills up front (`2^20` masks).
pub const MAX_PRECOMPUTED_NODES: usize = 20;

/// Memoised `mask → number of nodes` lookups.
///
/// Scoring asks for the same part sizes over and over while sweeping the
/// partition space. Each search owns one through its
/// [`Scorer`](crate::normalization::Scorer), so concurrent searches never
/// share a cache. Fill it with [`PartSizeCache::precomputed`] before fanning
/// out if one cache must be read from several places.
#[derive(Clone, Debug, Default)]
pub struct PartSizeCache {
    sizes: HashMap<Mask, u32>,
}

impl PartSizeCache {
    /// Empty cache. Entries are filled the first time each mask is asked for.
    pub fn new() -> Self {
        Self { sizes: HashMap::new() }
    }

    /// Cache with every non-empty mask of a `node_count`-node network already
    /// filled in.
    ///
    /// Fails above [`MAX_PRECOMPUTED_NODES`]; wider networks fill lazily.
    pub fn precomputed(node_count: usize) -> Result<Self> {
        let node_count = check_node_count(node_count)?;
        if node_count > MAX_PRECOMPUTED_NODES {
            return Err(PhiError::CacheTooLarge {
                node_count,
                max: MAX_PRECOMPUTED_NODES,
            });
        }
        let full = full_mask(node_count);
        let mut cache = Self {
            sizes: HashMap::with_capacity(full as usize),
        };
        for mask in 1..=full {
            cache.sizes.insert(mask, mask.count_ones());
        }
        Ok(cache)
    }

    /// Number of nodes in `mask`, computing and storing it on first use.
    #[inline]
    pub fn size(&mut self, mask: Mask) -> usize {
        *self.sizes.entry(mask).or_insert_with(|| mask.count_ones()) as usize
    }

    /// Number of masks currently memoised.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// `true` if nothing has been memoised yet.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Drop every memoised entry.
    pub fn clear(&mut self) {
        self.sizes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mask_edges() {
        assert_eq!(full_mask(0), 0);
        assert_eq!(full_mask(1), 0b1);
        assert_eq!(full_mask(4), 0b1111);
        assert_eq!(full_mask(32), u32::MAX);
    }

    #[test]
    fn test_node_count_bounds() {
        assert!(check_node_count(0).is_err());
        assert_eq!(check_node_count(1), Ok(1));
        assert_eq!(check_node_count(32), Ok(32));
        assert_eq!(check_node_count(33), Err(PhiError::InvalidNodeCount(33)));
    }

    #[test]
    fn test_check_state_rejects_wide_states() {
        assert_eq!(check_state(0b11, 2), Ok(0b11));
        assert_eq!(
            check_state(0b100, 2),
            Err(PhiError::StateOutOfRange { state: 0b100, node_count: 2 })
        );
    }

    #[test]
    fn test_mask_and_nodes_round_trip() {
        let mask = mask_of(&[0, 3, 5]);
        assert_eq!(mask, 0b10_1001);
        let nodes: alloc::vec::Vec<usize> = nodes_of(mask).collect();
        assert_eq!(nodes, [0, 3, 5]);
    }

    #[test]
    fn test_check_subset() {
        assert_eq!(check_subset(&[2, 0], 3), Ok(0b101));
        assert_eq!(check_subset(&[], 3), Err(PhiError::EmptySubset));
        assert_eq!(
            check_subset(&[0, 1, 2, 3], 3),
            Err(PhiError::SubsetTooLarge { len: 4, node_count: 3 })
        );
        assert_eq!(
            check_subset(&[3], 3),
            Err(PhiError::NodeOutOfRange { node: 3, node_count: 3 })
        );
        assert_eq!(check_subset(&[1, 1], 3), Err(PhiError::DuplicateNode(1)));
    }

    #[test]
    fn test_local_to_global() {
        let subset = [1usize, 3, 4];
        assert_eq!(local_to_global(0b001, &subset), 0b0_0010);
        assert_eq!(local_to_global(0b110, &subset), 0b1_1000);
        assert_eq!(local_to_global(0b111, &subset), mask_of(&subset));
    }

    #[test]
    fn test_part_size_cache_is_lazy() {
        let mut cache = PartSizeCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.size(0b1011), 3);
        assert_eq!(cache.size(0b1011), 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_part_size_cache_precomputed() {
        let mut cache = PartSizeCache::precomputed(3).unwrap();
        assert_eq!(cache.len(), 7);
        assert_eq!(cache.size(0b111), 3);
        assert_eq!(cache.len(), 7);
    }

    #[test]
    fn test_part_size_cache_precomputed_width_is_bounded() {
        assert_eq!(
            PartSizeCache::precomputed(MAX_NODES).err(),
            Some(PhiError::CacheTooLarge { node_count: MAX_NODES, max: MAX_PRECOMPUTED_NODES })
        );
        assert_eq!(
            PartSizeCache::precomputed(MAX_PRECOMPUTED_NODES + 1).err(),
            Some(PhiError::CacheTooLarge {
                node_count: MAX_PRECOMPUTED_NODES + 1,
                max: MAX_PRECOMPUTED_NODES,
            })
        );
        assert_eq!(PartSizeCache::precomputed(0).err(), Some(PhiError::InvalidNodeCount(0)));
    }
}
