//! Scoring a candidate partition: raw effective information and the five
//! normalizations that make partitions of different shapes comparable.
//!
//! For a partition `P = {p_1, …, p_k}` of an `N`-node network with entropy
//! table `H`, the raw effective information is
//!
//! ```text
//! rawEI(P) = −H(full) + Σ_i H(p_i)
//! ```
//!
//! | Method | `k = 1` | `k > 1` |
//! |--------|---------|---------|
//! | `None` | `N − H(full)` | `rawEI` |
//! | `TononiBalduzzi` | `(N − H(full)) / N` | `rawEI / ((k − 1) · min |p_i|)` |
//! | `ProductNormalization` | `N` | `rawEI / Π |p_i|` |
//! | `Koch` | `N` | `rawEI / (−Σ q_i log2 q_i)`, `q_i = |p_i| / N` |
//! | `AvgNodeDegree` | `N` | `rawEI / d` (below) |
//!
//! For `AvgNodeDegree`, with `L` the largest part size and `A` the sum of
//! `|p_i| · avg_degree` over the other parts, `d = k + A − L` when `L > A`
//! and `d = k` otherwise.
//!
//! A zero denominator scores `+∞`, which can never be a minimum.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use tracing::warn;

use crate::entropy::EntropyTable;
use crate::error::{PhiError, Result};
use crate::partition::Partition;
use crate::state::{full_mask, PartSizeCache};

/// Connectivity weights at or below this are treated as "no edge".
pub const EDGE_THRESHOLD: f64 = 1e-9;

// ─── NormalizationMethod ────────────────────────────────────────────────────

/// Which formula turns raw effective information into a comparable score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NormalizationMethod {
    /// Raw effective information.
    #[default]
    None,
    /// Divide by the number of cuts times the smallest part size.
    TononiBalduzzi,
    /// Divide by the product of part sizes.
    ProductNormalization,
    /// Divide by the entropy of the part-size distribution.
    Koch,
    /// Heuristic based on the network's average node degree.
    AvgNodeDegree,
}

impl NormalizationMethod {
    /// Every method, in code order.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::TononiBalduzzi,
        Self::ProductNormalization,
        Self::Koch,
        Self::AvgNodeDegree,
    ];

    /// Canonical text name, as accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TononiBalduzzi => "tononi-balduzzi",
            Self::ProductNormalization => "product",
            Self::Koch => "koch",
            Self::AvgNodeDegree => "avg-node-degree",
        }
    }

    /// Integer code, `0..=4`.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// `true` for the one method that needs an average node degree.
    pub fn needs_node_degree(self) -> bool {
        self == Self::AvgNodeDegree
    }
}

impl fmt::Display for NormalizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NormalizationMethod {
    type Err = PhiError;

    /// Case-insensitive; `_` and `-` are interchangeable.
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .trim()
            .chars()
            .map(|c| if c == '_' { '-' } else { c.to_ascii_lowercase() })
            .collect();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| PhiError::UnknownNormalization(s.to_string()))
    }
}

impl TryFrom<u8> for NormalizationMethod {
    type Error = PhiError;

    fn try_from(code: u8) -> Result<Self> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| PhiError::UnknownNormalization(code.to_string()))
    }
}

// ─── NodeDegree ─────────────────────────────────────────────────────────────

/// Node degrees read off a connectivity matrix.
///
/// Only the upper triangle, diagonal included, is read: entry `(i, j)` with
/// `j ≥ i` and weight above [`EDGE_THRESHOLD`] is one edge, credited to node
/// `i`. The average degree is edges divided by node count.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeDegree {
    degrees: Vec<usize>,
    average: f64,
}

impl NodeDegree {
    /// Count edges in a square, non-empty connectivity matrix.
    pub fn from_connectivity<R: AsRef<[f64]>>(matrix: &[R]) -> Result<Self> {
        let n = matrix.len();
        if n == 0 || matrix.iter().any(|row| row.as_ref().len() != n) {
            return Err(PhiError::InvalidConnectivity);
        }
        let degrees: Vec<usize> = matrix
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.as_ref()[i..]
                    .iter()
                    .filter(|&&w| w > EDGE_THRESHOLD)
                    .count()
            })
            .collect();
        let edges: usize = degrees.iter().sum();
        Ok(Self {
            average: edges as f64 / n as f64,
            degrees,
        })
    }

    /// Edges credited to each node.
    pub fn degrees(&self) -> &[usize] {
        &self.degrees
    }

    /// Average degree.
    pub fn average(&self) -> f64 {
        self.average
    }
}

// ─── Scorer ─────────────────────────────────────────────────────────────────

/// Scores partitions against one entropy table with one method.
///
/// Owns the part-size cache for the search it serves, so each top-level
/// search gets its own and nothing is shared between concurrent searches.
#[derive(Clone, Debug)]
pub struct Scorer<'e> {
    entropies: &'e EntropyTable,
    method: NormalizationMethod,
    avg_node_degree: Option<f64>,
    sizes: PartSizeCache,
}

impl<'e> Scorer<'e> {
    /// Scorer for `method`. `avg_node_degree` is only read by
    /// [`NormalizationMethod::AvgNodeDegree`], which fails without it or with
    /// a degree that is negative or not finite.
    pub fn new(
        entropies: &'e EntropyTable,
        method: NormalizationMethod,
        avg_node_degree: Option<f64>,
    ) -> Result<Self> {
        if method.needs_node_degree() {
            match avg_node_degree {
                None => return Err(PhiError::MissingNodeDegree),
                Some(d) if !d.is_finite() || d < 0.0 => {
                    return Err(PhiError::InvalidNodeDegree(d))
                }
                Some(_) => {}
            }
        }
        Ok(Self {
            entropies,
            method,
            avg_node_degree,
            sizes: PartSizeCache::new(),
        })
    }

    /// Method this scorer applies.
    pub fn method(&self) -> NormalizationMethod {
        self.method
    }

    /// Normalized score of a partition of the table's full node set.
    ///
    /// The partition is assumed valid; [`crate::mip::ei`] checks it first.
    pub fn score(&mut self, partition: &Partition) -> Result<f64> {
        match self.method {
            NormalizationMethod::None => self.unnormalized(partition),
            NormalizationMethod::TononiBalduzzi => self.tononi_balduzzi(partition),
            NormalizationMethod::ProductNormalization => self.product(partition),
            NormalizationMethod::Koch => self.koch(partition),
            NormalizationMethod::AvgNodeDegree => self.avg_node_degree(partition),
        }
    }

    /// `−H(full) + Σ H(part)`.
    pub fn raw_ei(&self, partition: &Partition) -> Result<f64> {
        let mut ei = -self.full_entropy()?;
        for &part in partition.parts() {
            ei += self.entropies.get(part)?;
        }
        Ok(ei)
    }

    fn node_count(&self) -> f64 {
        self.entropies.node_count() as f64
    }

    fn full_entropy(&self) -> Result<f64> {
        self.entropies.get(full_mask(self.entropies.node_count()))
    }

    fn unnormalized(&self, partition: &Partition) -> Result<f64> {
        if partition.len() == 1 {
            return Ok(self.node_count() - self.full_entropy()?);
        }
        self.raw_ei(partition)
    }

    fn tononi_balduzzi(&mut self, partition: &Partition) -> Result<f64> {
        if partition.len() == 1 {
            return Ok((self.node_count() - self.full_entropy()?) / self.node_count());
        }
        let smallest = partition
            .parts()
            .iter()
            .map(|&p| self.sizes.size(p))
            .min()
            .unwrap_or(0);
        let denominator = ((partition.len() - 1) * smallest) as f64;
        Ok(self.divide(self.raw_ei(partition)?, denominator))
    }

    fn product(&mut self, partition: &Partition) -> Result<f64> {
        if partition.len() == 1 {
            return Ok(self.node_count());
        }
        let denominator: f64 = partition
            .parts()
            .iter()
            .map(|&p| self.sizes.size(p) as f64)
            .product();
        Ok(self.divide(self.raw_ei(partition)?, denominator))
    }

    fn koch(&mut self, partition: &Partition) -> Result<f64> {
        if partition.len() == 1 {
            return Ok(self.node_count());
        }
        let n = self.node_count();
        let mut denominator = 0.0;
        for &part in partition.parts() {
            let q = self.sizes.size(part) as f64 / n;
            denominator -= q * libm::log2(q);
        }
        Ok(self.divide(self.raw_ei(partition)?, denominator))
    }

    fn avg_node_degree(&mut self, partition: &Partition) -> Result<f64> {
        let degree = self.avg_node_degree.ok_or(PhiError::MissingNodeDegree)?;
        if partition.len() == 1 {
            return Ok(self.node_count());
        }
        // Single pass: the running largest part is held back, everything
        // else is weighted by the degree.
        let mut largest = 0usize;
        let mut covered = 0.0;
        for &part in partition.parts() {
            let size = self.sizes.size(part);
            if largest < size {
                covered += largest as f64 * degree;
                largest = size;
            } else {
                covered += size as f64 * degree;
            }
        }
        let k = partition.len() as f64;
        let denominator = if largest as f64 > covered {
            k + covered - largest as f64
        } else {
            k
        };
        Ok(self.divide(self.raw_ei(partition)?, denominator))
    }

    fn divide(&self, ei: f64, denominator: f64) -> f64 {
        if denominator == 0.0 {
            warn!(method = %self.method, ei, "normalization denominator is zero; scoring as +inf");
            return f64::INFINITY;
        }
        ei / denominator
    }
}
