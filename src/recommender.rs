//! Request-scoped playlist generation over an immutable model.
//!
//! `RecommenderModel` holds everything that is built once (index, matrix,
//! partition, catalog, config). It is never mutated after construction, so one
//! instance can serve concurrent requests behind an `Arc`; each request
//! allocates its own restart and score vectors.

use crate::catalog::TrackCatalog;
use crate::community::{CommunityDetector, CommunityPartition};
use crate::config::RecommenderConfig;
use crate::error::{RecommendError, Result};
use crate::graph::{AdjacencyGraph, GraphBuilder, SimilarityRecord, SongIndex};
use crate::matrix::TransitionMatrix;
use crate::pagerank::PersonalizedPageRank;
use crate::playlist::select_playlist;
use crate::restart::build_restart_vector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRequest {
    /// Seed songs by display name
    pub seeds: Vec<String>,
    /// How far to stray from the seeds' communities (0.0-1.0)
    pub discover_rate: f64,
    /// Maximum playlist length
    pub length: usize,
}

impl PlaylistRequest {
    pub fn new<S: Into<String>>(seeds: impl IntoIterator<Item = S>, discover_rate: f64, length: usize) -> Self {
        Self {
            seeds: seeds.into_iter().map(Into::into).collect(),
            discover_rate,
            length,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.length == 0 {
            return Err(RecommendError::InvalidParameter(
                "playlist length must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.discover_rate) {
            return Err(RecommendError::InvalidParameter(format!(
                "discover rate {} outside [0,1]",
                self.discover_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub playlist: Vec<String>,
    pub unresolved_seeds: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RecommenderModel {
    index: SongIndex,
    matrix: TransitionMatrix,
    partition: CommunityPartition,
    catalog: TrackCatalog,
    config: RecommenderConfig,
}

impl RecommenderModel {
    /// Assemble a model from prebuilt parts; all of them must cover the same nodes
    pub fn new(
        index: SongIndex,
        graph: &AdjacencyGraph,
        partition: CommunityPartition,
        catalog: TrackCatalog,
        config: RecommenderConfig,
    ) -> Result<Self> {
        config.validate()?;
        if graph.node_count() != index.len() {
            return Err(RecommendError::InvalidParameter(format!(
                "graph has {} nodes but index has {} songs",
                graph.node_count(),
                index.len()
            )));
        }
        if partition.node_count() != index.len() {
            return Err(RecommendError::PartitionMismatch(format!(
                "partition covers {} nodes but index has {} songs",
                partition.node_count(),
                index.len()
            )));
        }

        let matrix = TransitionMatrix::from_graph(graph);
        info!(
            songs = index.len(),
            edges = graph.edge_count(),
            sinks = matrix.sinks().len(),
            communities = partition.community_count(),
            "recommender model ready"
        );

        Ok(Self {
            index,
            matrix,
            partition,
            catalog,
            config,
        })
    }

    /// Build the graph from similarity records and partition it with `detector`
    pub fn from_records<I, D>(
        records: I,
        detector: &D,
        catalog: TrackCatalog,
        config: RecommenderConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Result<SimilarityRecord>>,
        D: CommunityDetector + ?Sized,
    {
        config.validate()?;
        let mut builder = GraphBuilder::new(config.graph);
        builder.extend(records);
        let (index, graph, stats) = builder.build();
        debug!(?stats, "graph build statistics");

        let partition = detector.detect(&graph);
        Self::new(index, &graph, partition, catalog, config)
    }

    pub fn index(&self) -> &SongIndex {
        &self.index
    }

    pub fn matrix(&self) -> &TransitionMatrix {
        &self.matrix
    }

    pub fn partition(&self) -> &CommunityPartition {
        &self.partition
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    #[tracing::instrument(skip(self, request), fields(seeds = request.seeds.len(), length = request.length))]
    pub fn recommend(&self, request: &PlaylistRequest) -> Result<PlaylistResponse> {
        request.validate()?;

        let resolved = self.catalog.resolve_seeds(&request.seeds, &self.index);
        if resolved.nodes.is_empty() {
            return Err(RecommendError::NoSeeds);
        }

        let restart = build_restart_vector(
            &resolved.nodes,
            request.discover_rate,
            &self.partition,
            &self.config.restart,
        )?;

        let solver = PersonalizedPageRank::new(self.config.pagerank)
            .with_parallel_threshold(self.config.parallel_threshold);
        let scores = solver.run(&self.matrix, &restart)?;

        let playlist = select_playlist(&scores, &self.index, &self.catalog, request.length)?;
        debug!(
            tracks = playlist.len(),
            iterations = scores.iterations,
            unresolved = resolved.unresolved.len(),
            "playlist generated"
        );

        Ok(PlaylistResponse {
            playlist,
            unresolved_seeds: resolved.unresolved,
        })
    }
}
