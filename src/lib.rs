//! # phi-core
//!
//! Integrated information (Phi) for small discrete networks, computed from
//! nothing but observed state transitions.
//!
//! ---
//!
//! ## What it measures
//!
//! A network of `N` binary nodes is watched over time. Every observed step
//! `X0 → X1` goes into a [`TransitionTable`]. From that table the crate asks
//! one question: how much information is lost if the network is cut into
//! independent pieces?
//!
//! **Entropies**: the conditional entropy of every node subset, estimated
//! from observed frequencies. One number per mask, `2^N` in all.
//!
//! **Minimum Information Partition**: every set-partition of the nodes (there
//! are Bell(N) of them) is scored by how much information the cut destroys,
//! normalized so that cuts of different shapes are comparable. The MIP is the
//! cut that destroys the least: the network's weakest seam.
//!
//! **Main complex**: every node subset gets its own MIP. The subset whose
//! weakest seam still loses the most information is the main complex, and
//! that loss is its Phi.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! TransitionSource → TransitionTable → EntropyTable → MIPs → MainComplexes → PhiReport
//!                                          ↑            ↑           ↑
//!                                   EntropyEngine   Scorer    node-removal search
//!                                                     ↑
//!                                            PartitionEnumerator
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`state`] | [`State`], [`Mask`], [`PartSizeCache`] | Fixed-width states and node masks |
//! | [`partition`] | [`Partition`] | Set-partitions as disjoint masks |
//! | [`enumerator`] | [`PartitionEnumerator`], [`bell`] | Restricted-growth enumeration of all partitions |
//! | [`transition`] | [`TransitionTable`], [`TransitionSource`], [`StateHistory`] | Observed transitions and their text format |
//! | [`entropy`] | [`EntropyEngine`], [`EntropyTable`] | Conditional entropy of every subset |
//! | [`normalization`] | [`NormalizationMethod`], [`Scorer`], [`NodeDegree`] | Effective information and its five normalizations |
//! | [`mip`] | [`SearchConfig`], [`mips`] | Minimum Information Partition search |
//! | [`complex`] | [`MainComplexes`], [`main_complexes`] | Main-complex search over node subsets |
//! | [`report`] | [`PhiReport`], [`analyze`] | End-to-end analysis and its report line |
//! | [`error`] | [`PhiError`] | Everything that can go wrong |
//!
//! ## Quick start
//!
//! ```
//! use phi_core::{analyze, NormalizationMethod, SearchConfig, TransitionTable};
//!
//! let table: TransitionTable = "2  0 1  0 1  1 0  1 0".parse()?;
//! let config = SearchConfig::new(NormalizationMethod::TononiBalduzzi);
//! let report = analyze(&table, &config)?;
//! assert_eq!(report.complex, vec![0, 1]);
//! # Ok::<(), phi_core::PhiError>(())
//! ```
//!
//! ## Cost
//!
//! The main-complex search visits up to `2^N` subsets and runs a Bell-sized
//! MIP search on each. Twelve nodes take seconds; twenty do not finish. Bound
//! `N` before calling [`main_complexes`].
//!
//! ## `no_std`
//!
//! The crate is `#![no_std]` with `alloc` by default. Enable `std` to link the
//! standard library, `serde` for serialisation of configs, tables and
//! reports, and `python-ffi` for the PyO3 bindings.
//!
//! ## Logging
//!
//! Searches emit `tracing` events (`debug!` on completion, `trace!` as the
//! best complex changes, `warn!` on degenerate normalizations). No subscriber
//! is installed; the host decides where events go.
//!
//! ## License
//!
//! Business Source License 1.1. Free for evaluation and non-production use.
//! Change date: 23 February 2032, after which Apache License 2.0 applies.
//! Commercial production use requires a license from Flout Labs (cbyrne@floutlabs.com).

#![cfg_attr(not(any(feature = "std", feature = "python-ffi", test)), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod complex;
pub mod entropy;
pub mod enumerator;
pub mod error;
pub mod mip;
pub mod normalization;
pub mod partition;
pub mod report;
pub mod state;
pub mod transition;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use complex::{main_complexes, main_complexes_from, MainComplexes};
pub use entropy::{entropies, EntropyEngine, EntropyTable, JointCount};
pub use enumerator::{bell, partitions, PartitionEnumerator, Partitions};
pub use error::{PhiError, Result};
pub use mip::{ei, ei_in_subset, mips, mips_in_subset, SearchConfig};
pub use normalization::{NodeDegree, NormalizationMethod, Scorer};
pub use partition::Partition;
pub use report::{analyze, analyze_entropies, analyze_source, PhiReport};
pub use state::{Mask, PartSizeCache, State, MAX_NODES, MAX_PRECOMPUTED_NODES};
pub use transition::{StateHistory, TransitionSource, TransitionTable};
