//! Integration tests for set-partition enumeration.
//!
//! Every partition of up to eight nodes is generated, checked and compared
//! against the Bell numbers; resets are exercised from random and explicit
//! starting points.

use std::collections::HashSet;

use phi_core::enumerator::{bell, partitions, PartitionEnumerator};
use phi_core::partition::Partition;
use phi_core::state::full_mask;
use phi_core::PhiError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const BELL: [u64; 9] = [1, 1, 2, 5, 15, 52, 203, 877, 4140];

// ─── helpers ─────────────────────────────────────────────────────────────────

fn all(n: usize) -> Vec<Partition> {
    partitions(n).unwrap().collect()
}

// ─── counting ────────────────────────────────────────────────────────────────

#[test]
fn test_bell_sequence() {
    for (n, &expected) in BELL.iter().enumerate() {
        assert_eq!(bell(n).unwrap(), expected);
    }
}

#[test]
fn test_partition_count_matches_enumerator() {
    for n in 1..=8 {
        let e = PartitionEnumerator::new(n).unwrap();
        assert_eq!(e.partition_count().unwrap(), BELL[n]);
    }
}

#[test]
fn test_bell_overflow_is_an_error_not_a_wrap() {
    assert!(bell(25).is_ok());
    assert_eq!(bell(40), Err(PhiError::BellOverflow(40)));
}

// ─── exhaustive walk ─────────────────────────────────────────────────────────

#[test]
fn test_walk_visits_each_partition_once() {
    for n in 1..=8 {
        let mut e = PartitionEnumerator::new(n).unwrap();
        let universe = full_mask(n);
        let mut seen = HashSet::new();
        seen.insert(e.partition().canonical());
        let mut advances = 0u64;
        while e.next_partition() {
            advances += 1;
            let p = e.partition();
            assert!(p.is_partition_of(universe), "n={n}: {p:?}");
            assert!(seen.insert(p.canonical()), "n={n}: repeated {p:?}");
        }
        assert_eq!(advances, BELL[n] - 1, "n={n}");
        assert_eq!(seen.len() as u64, BELL[n]);
    }
}

#[test]
fn test_first_and_last_partitions() {
    for n in 1..=6 {
        let list = all(n);
        assert_eq!(list.first(), Some(&Partition::total(n).unwrap()));
        assert_eq!(list.last(), Some(&Partition::atomic(n).unwrap()));
    }
}

#[test]
fn test_parts_appear_in_first_appearance_order() {
    for p in all(6) {
        let lowest: Vec<u32> = p.parts().iter().map(|m| m.trailing_zeros()).collect();
        assert!(lowest.windows(2).all(|w| w[0] < w[1]), "{p:?}");
    }
}

// ─── resets ──────────────────────────────────────────────────────────────────

#[test]
fn test_reset_round_trip_for_every_partition() {
    let mut e = PartitionEnumerator::new(6).unwrap();
    for p in all(6) {
        e.reset_partition(&p.canonical()).unwrap();
        assert!(e.partition().same_parts(&p));
        assert_eq!(e.partition(), &p);
    }
}

#[test]
fn test_reset_to_random_partition_then_finish_walk() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let list = all(7);
    let mut e = PartitionEnumerator::new(7).unwrap();
    for _ in 0..20 {
        let start = e.random_partition(&mut rng);
        e.reset_partition(&start).unwrap();
        let index = list.iter().position(|p| p == e.partition()).unwrap();
        let mut remaining = 0;
        while e.next_partition() {
            remaining += 1;
            assert_eq!(e.partition(), &list[index + remaining]);
        }
        assert_eq!(index + remaining, list.len() - 1);
    }
}

#[test]
fn test_reset_rejects_partitions_of_other_sizes() {
    let mut e = PartitionEnumerator::new(4).unwrap();
    let three = Partition::atomic(3).unwrap();
    assert_eq!(
        e.reset_partition(&three),
        Err(PhiError::InvalidPartition { universe: 0b1111 })
    );
}

#[test]
fn test_fraction_extremes_reach_first_and_last() {
    let mut e = PartitionEnumerator::new(5).unwrap();
    e.reset_from_fractions(&[0.0; 4]).unwrap();
    assert_eq!(e.partition(), &Partition::total(5).unwrap());
    e.reset_from_fractions(&[0.999; 4]).unwrap();
    assert_eq!(e.partition(), &Partition::atomic(5).unwrap());
    assert!(!e.next_partition());
}
