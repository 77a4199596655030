//! Seed-driven playlist recommendation over a song similarity graph.
//!
//! Songs are nodes, pairwise similarity scores are weighted undirected edges.
//! A request names seed songs and a discover rate; the crate biases a restart
//! distribution toward the seeds' communities, runs Personalized PageRank and
//! returns the top distinct display names.

pub mod catalog;
pub mod community;
pub mod config;
pub mod error;
pub mod graph;
pub mod matrix;
pub mod pagerank;
pub mod parsing;
pub mod playlist;
pub mod recommender;
pub mod restart;
pub mod string_normalization;

// Re-export commonly used items
pub use catalog::{ResolvedSeeds, TrackCatalog};
pub use community::{CommunityDetector, CommunityPartition, ConnectedComponents};
pub use config::{GraphConfig, PageRankConfig, RecommenderConfig, RestartWeights};
pub use error::{RecommendError, Result};
pub use graph::{AdjacencyGraph, GraphBuilder, NodeId, SimilarityEdge, SimilarityRecord, SongIndex};
pub use matrix::TransitionMatrix;
pub use pagerank::{PersonalizedPageRank, ScoreVector};
pub use playlist::select_playlist;
pub use recommender::{PlaylistRequest, PlaylistResponse, RecommenderModel};
pub use restart::{RestartVector, build_restart_vector};
pub use string_normalization::normalize_track_name;
