//! JSON round-trips for the serialisable analysis types.
//!
//! Run with: `cargo test --features serde`

#![cfg(feature = "serde")]

use phi_core::{
    analyze, entropies, main_complexes, EntropyTable, MainComplexes, NormalizationMethod,
    PhiError, PhiReport, SearchConfig, TransitionTable,
};

fn table() -> TransitionTable {
    let mut t = TransitionTable::new(3).unwrap();
    for x0 in 0..8u32 {
        let swapped = ((x0 & 1) << 1) | ((x0 >> 1) & 1);
        for noise in 0..2u32 {
            t.push(x0, swapped | (noise << 2)).unwrap();
        }
    }
    t
}

#[test]
fn test_report_round_trip() {
    let config = SearchConfig::new(NormalizationMethod::TononiBalduzzi);
    let report = analyze(&table(), &config).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    let back: PhiReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
    assert_eq!(back.to_string(), report.to_string());
}

#[test]
fn test_entropy_table_round_trip() {
    let h = entropies(&table()).unwrap();
    let json = serde_json::to_string(&h).unwrap();
    let back: EntropyTable = serde_json::from_str(&json).unwrap();
    assert_eq!(back, h);
}

#[test]
fn test_entropy_table_json_is_validated() {
    for json in [
        r#"{"node_count":2,"values":[]}"#,
        r#"{"node_count":0,"values":[0.0]}"#,
        r#"{"node_count":2,"values":[2.0,0.5,0.5]}"#,
    ] {
        assert!(serde_json::from_str::<EntropyTable>(json).is_err(), "{json}");
    }
    let back: EntropyTable =
        serde_json::from_str(r#"{"node_count":1,"values":[7.0,0.25]}"#).unwrap();
    assert_eq!(back, EntropyTable::from_values(1, vec![1.0, 0.25]).unwrap());
    assert_eq!(back.full(), 0.25);
    assert_eq!(
        EntropyTable::from_values(2, Vec::new()),
        Err(PhiError::EntropyTableSize { node_count: 2, expected: 4, actual: 0 })
    );
}

#[test]
fn test_config_json_shape() {
    let config = SearchConfig::new(NormalizationMethod::AvgNodeDegree).with_avg_node_degree(1.5);
    let value = serde_json::to_value(config).unwrap();
    assert_eq!(value["normalization"], "AvgNodeDegree");
    assert_eq!(value["avg_node_degree"], 1.5);
    let back: SearchConfig = serde_json::from_value(value).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_main_complexes_round_trip() {
    let h = entropies(&table()).unwrap();
    let found = main_complexes(&h, &SearchConfig::default()).unwrap();
    let json = serde_json::to_string(&found).unwrap();
    let back: MainComplexes = serde_json::from_str(&json).unwrap();
    assert_eq!(back, found);
}
