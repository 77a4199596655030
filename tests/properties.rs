use proptest::prelude::*;
use seedmix::{
    AdjacencyGraph, CommunityDetector, ConnectedComponents, PersonalizedPageRank, RestartWeights,
    SimilarityEdge, TransitionMatrix, build_restart_vector,
};

fn arb_graph() -> impl Strategy<Value = AdjacencyGraph> {
    (2usize..40).prop_flat_map(|n| {
        prop::collection::vec((0..n as u32, 0..n as u32, 0.01f64..1.0), 0..120).prop_map(
            move |edges| {
                AdjacencyGraph::from_edges(
                    n,
                    edges
                        .into_iter()
                        .map(|(a, b, w)| SimilarityEdge::new(a, b, w)),
                )
                .unwrap()
            },
        )
    })
}

proptest! {
    #[test]
    fn prop_rows_are_stochastic_or_sinks(graph in arb_graph()) {
        let matrix = TransitionMatrix::from_graph(&graph);
        prop_assert_eq!(matrix.num_nodes(), graph.node_count());
        for node in 0..graph.node_count() as u32 {
            if graph.degree(node) == 0 {
                prop_assert!(matrix.is_sink(node));
                prop_assert_eq!(matrix.row_sum(node), 0.0);
            } else {
                prop_assert!(!matrix.is_sink(node));
                prop_assert!((matrix.row_sum(node) - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn prop_scores_form_distribution(
        graph in arb_graph(),
        seed_pick in any::<prop::sample::Index>(),
        discover_rate in 0.0f64..=1.0,
    ) {
        let matrix = TransitionMatrix::from_graph(&graph);
        let partition = ConnectedComponents.detect(&graph);
        let seed = seed_pick.index(graph.node_count()) as u32;

        let restart = build_restart_vector(&[seed], discover_rate, &partition, &RestartWeights::default()).unwrap();
        let restart_sum: f64 = restart.as_slice().iter().sum();
        prop_assert!((restart_sum - 1.0).abs() < 1e-9);

        let mut worst_drift = 0.0f64;
        let mut all_non_negative = true;
        let result = PersonalizedPageRank::default()
            .run_with_observer(&matrix, &restart, |_, scores| {
                all_non_negative &= scores.iter().all(|s| s.is_finite() && *s >= 0.0);
                let total: f64 = scores.iter().sum();
                worst_drift = worst_drift.max((total - 1.0).abs());
            })
            .unwrap();
        prop_assert!(all_non_negative);
        prop_assert!(worst_drift < 1e-6, "drift={}", worst_drift);
        prop_assert!(result.iterations <= 100);
    }

    #[test]
    fn prop_partition_covers_every_node(graph in arb_graph()) {
        let partition = ConnectedComponents.detect(&graph);
        prop_assert_eq!(partition.node_count(), graph.node_count());
        let member_total: usize = (0..partition.community_count())
            .map(|c| partition.community_size(c))
            .sum();
        prop_assert_eq!(member_total, graph.node_count());
        for edge in graph.edges() {
            prop_assert_eq!(
                partition.community_of(edge.source),
                partition.community_of(edge.target)
            );
        }
    }
}
