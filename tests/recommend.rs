mod common;

use common::{init_tracing, record, two_cluster_model};
use seedmix::parsing::{parse_edge_list, parse_partition, write_edge_list};
use seedmix::{
    AdjacencyGraph, CommunityPartition, ConnectedComponents, GraphBuilder, PlaylistRequest,
    RecommendError, RecommenderConfig, RecommenderModel, SongIndex, TrackCatalog,
};
use std::io::{BufReader, Write};
use std::sync::Arc;
use std::thread;
use tempfile::NamedTempFile;

#[test]
fn test_single_edge_seed_first() {
    init_tracing();
    let catalog = TrackCatalog::from_entries([("A", "Song A"), ("B", "Song B")]);
    let model = RecommenderModel::from_records(
        [record("A", &[("B", 1.0)])],
        &ConnectedComponents,
        catalog,
        RecommenderConfig::default(),
    )
    .unwrap();

    let response = model
        .recommend(&PlaylistRequest::new(["Song A"], 0.0, 2))
        .unwrap();
    assert_eq!(response.playlist, vec!["Song A", "Song B"]);
}

#[test]
fn test_unknown_seeds_fail() {
    init_tracing();
    let model = two_cluster_model(RecommenderConfig::default());
    let result = model.recommend(&PlaylistRequest::new(["Nobody", "Nothing"], 0.5, 3));
    assert!(matches!(result, Err(RecommendError::NoSeeds)));
}

#[test]
fn test_low_discover_rate_stays_in_cluster() {
    init_tracing();
    let mut config = RecommenderConfig::default();
    config.graph.min_similarity = 0.1;
    // the weak bridge is dropped, leaving two communities
    let model = two_cluster_model(config);
    assert_eq!(model.partition().community_count(), 2);

    let response = model
        .recommend(&PlaylistRequest::new(["Rock - Alpha"], 0.0, 4))
        .unwrap();
    assert_eq!(response.playlist.len(), 4);
    assert!(response.playlist.iter().all(|name| name.starts_with("Rock")));

    let wide = model
        .recommend(&PlaylistRequest::new(["Rock - Alpha"], 1.0, 7))
        .unwrap();
    assert!(wide.playlist.iter().any(|name| name.starts_with("Jazz")));
}

#[test]
fn test_repeated_requests_identical() {
    init_tracing();
    let model = two_cluster_model(RecommenderConfig::default());
    let request = PlaylistRequest::new(["Jazz - Beta", "Rock - Gamma"], 0.4, 5);

    let first = model.recommend(&request).unwrap();
    for _ in 0..5 {
        assert_eq!(model.recommend(&request).unwrap(), first);
    }
}

#[test]
fn test_parallel_product_same_playlist() {
    init_tracing();
    let sequential = two_cluster_model(RecommenderConfig::default());
    let parallel = two_cluster_model(RecommenderConfig {
        parallel_threshold: 1,
        ..RecommenderConfig::default()
    });
    let request = PlaylistRequest::new(["Rock - Beta"], 0.7, 6);

    assert_eq!(
        sequential.recommend(&request).unwrap(),
        parallel.recommend(&request).unwrap()
    );
}

#[test]
fn test_concurrent_requests_share_model() {
    init_tracing();
    let model = Arc::new(two_cluster_model(RecommenderConfig::default()));
    let expected = model
        .recommend(&PlaylistRequest::new(["Rock - Alpha"], 0.3, 4))
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = Arc::clone(&model);
            thread::spawn(move || {
                model
                    .recommend(&PlaylistRequest::new(["Rock - Alpha"], 0.3, 4))
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_file_pipeline() {
    init_tracing();
    let mut builder = GraphBuilder::default();
    builder.add_raw_row("S0", "S1,0.9,S2,0.4");
    builder.add_raw_row("S1", "S2,0.8");
    builder.add_raw_row("S3", "S4,0.7");
    builder.add_raw_row("S5", "S6,not-a-weight");
    let (index, graph, stats) = builder.build();
    assert_eq!(stats.skipped_records, 1);
    assert_eq!(index.len(), 5);

    let mut edge_file = NamedTempFile::new().unwrap();
    write_edge_list(&graph, &mut edge_file).unwrap();
    writeln!(edge_file, "0,99,0.5").unwrap();

    let mut partition_file = NamedTempFile::new().unwrap();
    writeln!(partition_file, "0, 0\n1, 0\n2, 0\n3, 1\n4, 1\ngarbage").unwrap();

    let mut config_file = NamedTempFile::new().unwrap();
    write!(
        config_file,
        r#"{{"pagerank": {{"damping": 0.9, "max_iterations": 300}}, "restart": {{"background_scale": 0.05}}}}"#
    )
    .unwrap();

    let edges = parse_edge_list(
        BufReader::new(edge_file.reopen().unwrap()),
        index.len(),
    )
    .unwrap();
    let reloaded = AdjacencyGraph::from_edges(index.len(), edges).unwrap();
    assert_eq!(reloaded, graph);

    let assignments =
        parse_partition(BufReader::new(partition_file.reopen().unwrap())).unwrap();
    let partition = CommunityPartition::from_assignments(index.len(), assignments).unwrap();
    assert_eq!(partition.community_count(), 2);

    let config = RecommenderConfig::from_path(config_file.path()).unwrap();
    assert_eq!(config.pagerank.damping, 0.9);
    assert_eq!(config.pagerank.max_iterations, 300);
    assert_eq!(config.pagerank.tolerance, 1e-6);

    let ids: Vec<String> = index.iter().map(|(_, id)| id.to_string()).collect();
    let catalog = TrackCatalog::from_entries(
        ids.iter().map(|id| (id.clone(), format!("Artist - {id}"))),
    );
    let index = SongIndex::from_ids(ids).unwrap();
    let model = RecommenderModel::new(index, &reloaded, partition, catalog, config).unwrap();

    let response = model
        .recommend(&PlaylistRequest::new(["artist - s0", "Artist - S9"], 0.0, 3))
        .unwrap();
    let mut playlist = response.playlist.clone();
    playlist.sort();
    // S3 and S4 sit outside the seed's community
    assert_eq!(playlist, vec!["Artist - S0", "Artist - S1", "Artist - S2"]);
    assert_eq!(response.unresolved_seeds, vec!["Artist - S9"]);
}

#[test]
fn test_partition_must_cover_graph() {
    let index = SongIndex::from_ids(["A", "B", "C"]).unwrap();
    let assignments = vec![(0, 0), (1, 0)];
    assert!(matches!(
        CommunityPartition::from_assignments(index.len(), assignments),
        Err(RecommendError::PartitionMismatch(_))
    ));
}
