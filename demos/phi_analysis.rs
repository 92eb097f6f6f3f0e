//! # Phi of a simulated six-node agent
//!
//! Runs a small stochastic network for a few thousand steps, records its
//! state history, and reports the main complex under every normalization.
//!
//! The network has two modules. Nodes 0..3 form a ring where each node takes
//! the XOR of its two neighbours; nodes 3..6 copy themselves with occasional
//! flips and never look at the ring. Compare how each normalization places
//! the main complex relative to the two modules.
//!
//! Run with: `cargo run --example phi_analysis`

use phi_core::{
    analyze_source, bell, NodeDegree, NormalizationMethod, SearchConfig, StateHistory,
    TransitionTable,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const NODES: usize = 6;
const STEPS: usize = 3000;

// ── Network ──────────────────────────────────────────────────────────────────

fn bit(state: u32, node: usize) -> u32 {
    (state >> node) & 1
}

fn step(state: u32, rng: &mut ChaCha8Rng) -> u32 {
    let mut next = 0u32;
    for node in 0..3 {
        let left = bit(state, (node + 2) % 3);
        let right = bit(state, (node + 1) % 3);
        next |= (left ^ right) << node;
    }
    for node in 3..NODES {
        let flip = u32::from(rng.gen_bool(0.1));
        next |= (bit(state, node) ^ flip) << node;
    }
    // A little noise on the ring keeps it from locking into a cycle.
    if rng.gen_bool(0.05) {
        next ^= 1u32 << rng.gen_range(0..3u32);
    }
    next
}

/// Wiring of the network above, for the degree-based normalization.
fn connectivity() -> [[f64; NODES]; NODES] {
    let mut m = [[0.0; NODES]; NODES];
    for node in 0..3 {
        m[node][(node + 1) % 3] = 1.0;
        m[node][(node + 2) % 3] = 1.0;
    }
    for node in 3..NODES {
        m[node][node] = 1.0;
    }
    m
}

fn main() -> Result<(), phi_core::PhiError> {
    println!("=== Phi analysis: {NODES} nodes, {STEPS} steps ===");
    println!("Partitions per MIP search on the full network: {}", bell(NODES)?);
    println!();

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut history = StateHistory::new(NODES)?;
    let mut state: u32 = rng.gen_range(0..1 << NODES);
    for _ in 0..STEPS {
        let next = step(state, &mut rng);
        history.record(state, next)?;
        state = next;
    }

    let table = TransitionTable::from_source(&history)?;
    println!(
        "Observed {} transitions from {} distinct states",
        table.transition_count(),
        table.len()
    );

    let degree = NodeDegree::from_connectivity(&connectivity())?;
    println!("Node degrees {:?}, average {:.3}", degree.degrees(), degree.average());
    println!();

    println!("{:<18} phi\tmip\tcomplex", "normalization");
    for method in NormalizationMethod::ALL {
        let config = SearchConfig::new(method).with_node_degree(&degree);
        let report = analyze_source(&history, &config)?;
        println!("{:<18} {report}", method.name());
        if report.main_complexes.len() > 1 {
            println!("{:<18} ({} tied complexes)", "", report.main_complexes.len());
        }
    }

    println!();
    println!("=== Same run read one extra step apart ===");
    let delayed = history.clone().with_delay(1);
    let report = analyze_source(&delayed, &SearchConfig::new(NormalizationMethod::TononiBalduzzi))?;
    println!("{:<18} {report}", "tononi-balduzzi");
    Ok(())
}
