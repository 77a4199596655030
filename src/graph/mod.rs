pub mod builder;
pub mod index;

pub use builder::{AdjacencyGraph, BuildStats, GraphBuilder, SimilarityEdge, SimilarityRecord};
pub use index::{NodeId, SongIndex};
