//! Observed state transitions: the only input the Phi pipeline needs.
//!
//! A [`TransitionTable`] maps each *previous* state `X0` to every *next* state
//! `X1` seen to follow it. Repeated `X1` values are repeated observations and
//! count as frequencies. Tables come from three places:
//!
//! - programmatically, one [`push`](TransitionTable::push) per observation;
//! - from anything implementing [`TransitionSource`], such as a recorded
//!   [`StateHistory`] of a simulated agent;
//! - from the whitespace-separated text format handled by
//!   [`TransitionTable::from_text`].
//!
//! # Text format
//!
//! ```text
//! 2        node count
//! 0 1      X0 X1
//! 0 1
//! 1 0
//! 1 0
//! ```
//!
//! Line breaks carry no meaning; the stream is a node count followed by
//! `X0 X1` integer pairs until the end of input.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;
use core::str::FromStr;

use crate::error::{PhiError, Result};
use crate::state::{check_node_count, check_state, State};

// ─── TransitionSource ───────────────────────────────────────────────────────

/// Anything that can report `(X0, X1)` observations for a fixed-width network.
///
/// This is where a simulation plugs into the analysis: implement it for your
/// own recorder and hand it to [`TransitionTable::from_source`].
pub trait TransitionSource {
    /// Width of every state the source reports.
    fn node_count(&self) -> usize;

    /// Every observed `(previous, next)` pair, in observation order.
    fn transitions(&self) -> impl Iterator<Item = (State, State)> + '_;
}

// ─── TransitionTable ────────────────────────────────────────────────────────

/// `X0 → [X1, …]` observations of an `N`-node network.
///
/// Every key has at least one next state, and every state fits in
/// `node_count` bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionTable {
    node_count: usize,
    transitions: BTreeMap<State, Vec<State>>,
}

impl TransitionTable {
    /// Empty table for a `node_count`-node network.
    pub fn new(node_count: usize) -> Result<Self> {
        Ok(Self {
            node_count: check_node_count(node_count)?,
            transitions: BTreeMap::new(),
        })
    }

    /// Record one observation of `x0` being followed by `x1`.
    pub fn push(&mut self, x0: State, x1: State) -> Result<()> {
        let x0 = check_state(u64::from(x0), self.node_count)?;
        let x1 = check_state(u64::from(x1), self.node_count)?;
        self.transitions.entry(x0).or_default().push(x1);
        Ok(())
    }

    /// Table built from a sequence of `(x0, x1)` observations.
    pub fn from_pairs<I>(node_count: usize, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (State, State)>,
    {
        let mut table = Self::new(node_count)?;
        for (x0, x1) in pairs {
            table.push(x0, x1)?;
        }
        Ok(table)
    }

    /// Table holding every observation a [`TransitionSource`] reports.
    pub fn from_source<S: TransitionSource + ?Sized>(source: &S) -> Result<Self> {
        Self::from_pairs(source.node_count(), source.transitions())
    }

    /// Parse the text format described in the module docs.
    ///
    /// A trailing `X0` without its `X1`, a token that is not an unsigned
    /// integer, and a state wider than the node count are all errors.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace().enumerate();
        let node_count = match tokens.next() {
            Some((index, token)) => parse_token(index, token)?,
            None => {
                return Err(PhiError::MalformedText {
                    token: 0,
                    reason: "missing node count",
                })
            }
        };
        let node_count = usize::try_from(node_count)
            .map_err(|_| PhiError::InvalidNodeCount(usize::MAX))?;
        let mut table = Self::new(node_count)?;

        while let Some((index, token)) = tokens.next() {
            let x0 = check_state(parse_token(index, token)?, node_count)?;
            let x1 = match tokens.next() {
                Some((index, token)) => check_state(parse_token(index, token)?, node_count)?,
                None => {
                    return Err(PhiError::MalformedText {
                        token: index + 1,
                        reason: "previous state has no next state",
                    })
                }
            };
            table.transitions.entry(x0).or_default().push(x1);
        }
        Ok(table)
    }

    /// Write the table back in the text format, one `X0 X1` pair per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", self.node_count);
        for (x0, x1) in self.iter_pairs() {
            let _ = writeln!(out, "{x0} {x1}");
        }
        out
    }

    /// Width of every state in the table.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of distinct previous states.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Total number of observations.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(Vec::len).sum()
    }

    /// `true` if nothing has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Next states observed after `x0`, if any.
    pub fn next_states(&self, x0: State) -> Option<&[State]> {
        self.transitions.get(&x0).map(Vec::as_slice)
    }

    /// `(X0, [X1, …])` entries in ascending `X0` order.
    pub fn iter(&self) -> impl Iterator<Item = (State, &[State])> + '_ {
        self.transitions.iter().map(|(&x0, x1)| (x0, x1.as_slice()))
    }

    /// Every observation as a flat `(x0, x1)` pair.
    pub fn iter_pairs(&self) -> impl Iterator<Item = (State, State)> + '_ {
        self.iter()
            .flat_map(|(x0, next)| next.iter().map(move |&x1| (x0, x1)))
    }
}

impl FromStr for TransitionTable {
    type Err = PhiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}

impl TransitionSource for TransitionTable {
    fn node_count(&self) -> usize {
        self.node_count
    }

    fn transitions(&self) -> impl Iterator<Item = (State, State)> + '_ {
        self.iter_pairs()
    }
}

fn parse_token(index: usize, token: &str) -> Result<u64> {
    token.parse::<u64>().map_err(|_| PhiError::MalformedText {
        token: index,
        reason: "not an unsigned integer",
    })
}

// ─── StateHistory ───────────────────────────────────────────────────────────

/// A recorded run of a network: one `(previous, current)` state pair per
/// update step.
///
/// With a non-zero `delay` the history is read across time: step `i`'s
/// previous state is paired with step `i + delay`'s current state, so the
/// table describes what the network does `delay + 1` updates later.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateHistory {
    node_count: usize,
    steps: Vec<(State, State)>,
    delay: usize,
}

impl StateHistory {
    /// Empty history of a `node_count`-node network with no delay.
    pub fn new(node_count: usize) -> Result<Self> {
        Ok(Self {
            node_count: check_node_count(node_count)?,
            steps: Vec::new(),
            delay: 0,
        })
    }

    /// Same history read with a time-step delay.
    pub fn with_delay(mut self, delay: usize) -> Self {
        self.delay = delay;
        self
    }

    /// Append one update step.
    pub fn record(&mut self, previous: State, current: State) -> Result<()> {
        let previous = check_state(u64::from(previous), self.node_count)?;
        let current = check_state(u64::from(current), self.node_count)?;
        self.steps.push((previous, current));
        Ok(())
    }

    /// Recorded steps in order.
    pub fn steps(&self) -> &[(State, State)] {
        &self.steps
    }

    /// Configured time-step delay.
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// `true` if no steps were recorded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl TransitionSource for StateHistory {
    fn node_count(&self) -> usize {
        self.node_count
    }

    fn transitions(&self) -> impl Iterator<Item = (State, State)> + '_ {
        let usable = self.steps.len().saturating_sub(self.delay);
        self.steps[..usable]
            .iter()
            .zip(&self.steps[self.delay.min(self.steps.len())..])
            .map(|(&(previous, _), &(_, current))| (previous, current))
    }
}
