//! End-to-end tests: transitions → entropies → MIPs → main complexes → report.

use phi_core::{
    analyze, analyze_source, ei, entropies, main_complexes, mips, mips_in_subset, EntropyEngine,
    EntropyTable, NodeDegree, NormalizationMethod, Partition, PhiError, SearchConfig,
    StateHistory, TransitionTable,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ─── helpers ─────────────────────────────────────────────────────────────────

/// 00 → 01 twice, 01 → 00 twice.
fn flip_flop() -> TransitionTable {
    TransitionTable::from_pairs(2, [(0b00, 0b01), (0b00, 0b01), (0b01, 0b00), (0b01, 0b00)])
        .unwrap()
}

/// Four nodes: 0 and 1 swap, 2 and 3 each copy themselves with no coupling.
fn swap_and_copies() -> TransitionTable {
    let mut t = TransitionTable::new(4).unwrap();
    for x0 in 0..16u32 {
        let swapped = ((x0 & 1) << 1) | ((x0 >> 1) & 1);
        t.push(x0, swapped | (x0 & 0b1100)).unwrap();
    }
    t
}

fn all_methods() -> Vec<SearchConfig> {
    NormalizationMethod::ALL
        .iter()
        .map(|&m| SearchConfig::new(m).with_avg_node_degree(1.0))
        .collect()
}

// ─── entropy ─────────────────────────────────────────────────────────────────

#[test]
fn test_flip_flop_entropies_are_zero() {
    let h = entropies(&flip_flop()).unwrap();
    assert_eq!(h.get(0).unwrap(), 2.0);
    for mask in 1..4 {
        assert!(h.get(mask).unwrap().abs() < 1e-12);
    }
}

#[test]
fn test_uniform_noise_approaches_log2_k() {
    // Three independent fair bits each step; no relation between steps.
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut t = TransitionTable::new(3).unwrap();
    for _ in 0..20_000 {
        t.push(rng.gen_range(0..8), rng.gen_range(0..8)).unwrap();
    }
    let h = entropies(&t).unwrap();
    assert!((h.get(0b111).unwrap() - 3.0).abs() < 0.05);
    assert!((h.get(0b011).unwrap() - 2.0).abs() < 0.05);
    assert!((h.get(0b100).unwrap() - 1.0).abs() < 0.05);
}

#[test]
fn test_engine_matches_bulk_table() {
    let t = swap_and_copies();
    let bulk = entropies(&t).unwrap();
    let mut engine = EntropyEngine::new(&t).unwrap();
    for mask in 0..16 {
        assert_eq!(engine.entropy(mask).unwrap(), bulk.get(mask).unwrap());
    }
}

// ─── MIP ─────────────────────────────────────────────────────────────────────

#[test]
fn test_flip_flop_mip_hand_computed() {
    // Every entropy is 0: splitting loses nothing, so the MIP is {0}{1} at 0.
    let h = entropies(&flip_flop()).unwrap();
    let config = SearchConfig::default();
    let found = mips(&h, &config).unwrap();
    assert_eq!(found, vec![Partition::from_parts(&[0b01, 0b10]).unwrap()]);
    assert!(ei(&found[0], &h, &config).unwrap().abs() < 1e-9);
    // The undivided network scores N − H(full) = 2.
    let whole = Partition::total(2).unwrap();
    assert!((ei(&whole, &h, &config).unwrap() - 2.0).abs() < 1e-9);
}

#[test]
fn test_single_part_scores_special_values() {
    let h = entropies(&swap_and_copies()).unwrap();
    let whole = Partition::total(4).unwrap();
    let full = h.full();
    let expected = [4.0 - full, (4.0 - full) / 4.0, 4.0, 4.0, 4.0];
    for (config, want) in all_methods().iter().zip(expected) {
        let got = ei(&whole, &h, config).unwrap();
        assert!((got - want).abs() < 1e-12, "{}: {got} != {want}", config.normalization);
    }
}

#[test]
fn test_every_mip_is_a_valid_partition() {
    let h = entropies(&swap_and_copies()).unwrap();
    for config in all_methods() {
        let found = mips(&h, &config).unwrap();
        assert!(!found.is_empty());
        for p in &found {
            assert!(p.is_partition_of(0b1111));
        }
    }
}

#[test]
fn test_subset_mips_stay_inside_subset() {
    let h = entropies(&swap_and_copies()).unwrap();
    for p in mips_in_subset(&[1, 3], &h, &SearchConfig::default()).unwrap() {
        assert!(p.is_partition_of(0b1010));
    }
    assert_eq!(
        mips_in_subset(&[0, 4], &h, &SearchConfig::default()),
        Err(PhiError::NodeOutOfRange { node: 4, node_count: 4 })
    );
}

#[test]
fn test_avg_node_degree_needs_degree() {
    let h = entropies(&flip_flop()).unwrap();
    let config = SearchConfig::new(NormalizationMethod::AvgNodeDegree);
    assert_eq!(mips(&h, &config), Err(PhiError::MissingNodeDegree));

    let degree = NodeDegree::from_connectivity(&[[0.0, 1.0], [1.0, 0.0]]).unwrap();
    assert!(mips(&h, &config.with_node_degree(&degree)).is_ok());
}

// ─── main complex ────────────────────────────────────────────────────────────

#[test]
fn test_swapping_pair_is_the_main_complex() {
    let h = entropies(&swap_and_copies()).unwrap();
    let found = main_complexes(&h, &SearchConfig::default()).unwrap();
    assert_eq!(found.first(), Some(&[0usize, 1][..]));
    assert_eq!(found.visited, 11);
}

#[test]
fn test_main_complex_search_is_deterministic() {
    let h = entropies(&swap_and_copies()).unwrap();
    for config in all_methods() {
        let a = main_complexes(&h, &config).unwrap();
        let b = main_complexes(&h, &config).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_hand_built_table_picks_highest_phi() {
    // Two nodes, H(full) = 0.2 and each single node 0.6.
    // Whole network: MIP is {0}{1} with rawEI = −0.2 + 1.2 = 1.0.
    let h = EntropyTable::from_values(2, vec![0.0, 0.6, 0.6, 0.2]).unwrap();
    let found = main_complexes(&h, &SearchConfig::default()).unwrap();
    assert_eq!(found.subsets, vec![vec![0, 1]]);
    assert!((found.phi - 1.0).abs() < 1e-12);
}

// ─── report ──────────────────────────────────────────────────────────────────

#[test]
fn test_report_line() {
    let report = analyze(&swap_and_copies(), &SearchConfig::default()).unwrap();
    assert_eq!(report.complex, vec![0, 1]);
    assert_eq!(report.node_count, 4);
    let line = report.to_string();
    let fields: Vec<&str> = line.split('\t').collect();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[1].split(',').count(), 4);
    assert_eq!(fields[2], "0,1");
}

#[test]
fn test_report_from_history() {
    let mut history = StateHistory::new(2).unwrap();
    let mut state = 0u32;
    for _ in 0..8 {
        let next = state ^ 0b01;
        history.record(state, next).unwrap();
        state = next;
    }
    let from_history = analyze_source(&history, &SearchConfig::default()).unwrap();
    let from_table = analyze(
        &TransitionTable::from_source(&history).unwrap(),
        &SearchConfig::default(),
    )
    .unwrap();
    assert_eq!(from_history, from_table);
}

#[test]
fn test_text_table_feeds_pipeline() {
    let t: TransitionTable = "2\n0 1\n0 1\n1 0\n1 0\n".parse().unwrap();
    assert_eq!(t, flip_flop());
    let report = analyze(&t, &SearchConfig::new(NormalizationMethod::Koch)).unwrap();
    assert_eq!(report.normalization, NormalizationMethod::Koch);
    assert_eq!(report.mip, vec![0b01, 0b10]);
}
