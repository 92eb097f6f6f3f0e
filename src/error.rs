//! Error type shared by every fallible operation in the crate.
//!
//! The core never prints. Precondition violations, unknown normalization
//! names, missing side data and Bell-number overflow all surface here and are
//! terminal for the current analysis call; the caller decides whether to skip,
//! log or abort.

use alloc::string::String;

use crate::state::Mask;

/// Everything that can go wrong while computing entropies, MIPs or complexes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhiError {
    /// Node count is zero or wider than a [`State`](crate::state::State).
    #[error("node count {0} is outside 1..={max}", max = crate::state::MAX_NODES)]
    InvalidNodeCount(usize),

    /// Parts overlap, are empty, or do not cover the expected node mask.
    #[error("not a valid set-partition of mask {universe:#x}")]
    InvalidPartition {
        /// Mask the parts were expected to cover exactly.
        universe: Mask,
    },

    /// An entropy was requested from a table with no observed transitions.
    #[error("transition table is empty")]
    EmptyTransitionTable,

    /// A state has bits set above the network's node count.
    #[error("state {state:#x} does not fit in {node_count} nodes")]
    StateOutOfRange {
        /// Offending state.
        state: u64,
        /// Width of the network.
        node_count: usize,
    },

    /// A mask addresses nodes the table does not have.
    #[error("mask {mask:#x} is out of range for {node_count} nodes")]
    MaskOutOfRange {
        /// Offending mask.
        mask: Mask,
        /// Width of the table.
        node_count: usize,
    },

    /// A subset with no nodes was supplied.
    #[error("subset is empty")]
    EmptySubset,

    /// A subset lists more nodes than the network has.
    #[error("subset of {len} nodes is larger than the {node_count}-node network")]
    SubsetTooLarge {
        /// Number of nodes in the subset.
        len: usize,
        /// Width of the network.
        node_count: usize,
    },

    /// A subset names a node index that does not exist.
    #[error("node {node} is out of range for {node_count} nodes")]
    NodeOutOfRange {
        /// Offending node index.
        node: usize,
        /// Width of the network.
        node_count: usize,
    },

    /// A subset lists the same node twice.
    #[error("node {0} appears more than once in the subset")]
    DuplicateNode(usize),

    /// Wrong number of fractions passed to a fractional reset.
    #[error("expected {expected} fractions, got {actual}")]
    FractionCountMismatch {
        /// Values required (node count − 1).
        expected: usize,
        /// Values supplied.
        actual: usize,
    },

    /// A fraction is not a finite value in `[0, 1)`.
    #[error("fraction {value} for node {node} is outside [0, 1)")]
    InvalidFraction {
        /// Node the fraction steers.
        node: usize,
        /// Offending value.
        value: f64,
    },

    /// The connectivity matrix is empty or not square.
    #[error("connectivity matrix must be square and non-empty")]
    InvalidConnectivity,

    /// A hand-built entropy table has the wrong number of entries.
    #[error("entropy table for {node_count} nodes needs {expected} values, got {actual}")]
    EntropyTableSize {
        /// Width of the table.
        node_count: usize,
        /// `2^node_count`.
        expected: usize,
        /// Values supplied.
        actual: usize,
    },

    /// The transition text stream could not be parsed.
    #[error("malformed transition text at token {token}: {reason}")]
    MalformedText {
        /// Zero-based index of the offending whitespace-separated token.
        token: usize,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A normalization name or code is not one of the five known strategies.
    #[error("unknown normalization method `{0}`")]
    UnknownNormalization(String),

    /// AvgNodeDegree normalization was requested without an average degree.
    #[error("average node degree is required by the avg-node-degree normalization")]
    MissingNodeDegree,

    /// An average node degree is negative, infinite or NaN.
    #[error("average node degree {0} must be finite and non-negative")]
    InvalidNodeDegree(f64),

    /// A precomputed part-size cache was asked for more nodes than it fills.
    #[error("cannot precompute part sizes for {node_count} nodes (at most {max})")]
    CacheTooLarge {
        /// Requested width.
        node_count: usize,
        /// Widest network the cache is filled for up front.
        max: usize,
    },

    /// A search finished without a single candidate to report.
    #[error("search produced no candidates")]
    NoCandidates,

    /// The Bell number of the requested size does not fit in 64 bits.
    #[error("number of partitions of {0} nodes does not fit in 64 bits")]
    BellOverflow(usize),
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, PhiError>;
