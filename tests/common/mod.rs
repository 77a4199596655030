#![allow(dead_code)]

use seedmix::{
    ConnectedComponents, RecommenderConfig, RecommenderModel, Result, SimilarityRecord,
    TrackCatalog,
};

/// Route crate logs through the test harness; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn record(source: &str, similars: &[(&str, f64)]) -> Result<SimilarityRecord> {
    Ok(SimilarityRecord {
        source: source.to_string(),
        similars: similars.iter().map(|(id, w)| (id.to_string(), *w)).collect(),
    })
}

/// Two tight clusters joined by a single weak bridge (T3 -- T4)
pub fn two_cluster_model(config: RecommenderConfig) -> RecommenderModel {
    let catalog = TrackCatalog::from_entries([
        ("T0", "Rock - Alpha"),
        ("T1", "Rock - Beta"),
        ("T2", "Rock - Gamma"),
        ("T3", "Rock - Delta"),
        ("T4", "Jazz - Alpha"),
        ("T5", "Jazz - Beta"),
        ("T6", "Jazz - Gamma"),
    ]);
    let records = [
        record("T0", &[("T1", 0.9), ("T2", 0.8), ("T3", 0.7)]),
        record("T1", &[("T2", 0.9), ("T3", 0.6)]),
        record("T2", &[("T3", 0.8)]),
        record("T4", &[("T5", 0.9), ("T6", 0.9), ("T3", 0.05)]),
        record("T5", &[("T6", 0.8)]),
    ];

    RecommenderModel::from_records(records, &ConnectedComponents, catalog, config)
        .expect("fixture model builds")
}
