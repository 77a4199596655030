//! Similarity graph construction
//!
//! `GraphBuilder` takes raw similarity records, assigns dense node ids and
//! accumulates an undirected weighted adjacency in per-node hash maps. `build`
//! freezes it into an `AdjacencyGraph` with neighbor lists sorted by node id.

use super::index::{NodeId, SongIndex};
use crate::config::GraphConfig;
use crate::error::{RecommendError, Result};
use crate::parsing::parse_similarity_row;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// One source song and its similar songs, as stored by the similarity source
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityRecord {
    pub source: String,
    pub similars: Vec<(String, f64)>,
}

/// An undirected weighted edge between two indexed songs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

impl SimilarityEdge {
    pub fn new(source: NodeId, target: NodeId, weight: f64) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }
}

/// Counters reported by `GraphBuilder::build`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub records: usize,
    pub skipped_records: usize,
    pub edges_below_threshold: usize,
    /// Weights that were not finite or fell outside [0,1]
    pub invalid_weights: usize,
    pub self_loops: usize,
}

/// Undirected weighted adjacency with sorted neighbor lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacencyGraph {
    neighbors: Vec<Vec<(NodeId, f64)>>,
}

impl AdjacencyGraph {
    /// Build directly from edges over `node_count` nodes.
    ///
    /// Duplicate pairs keep the larger weight and self-loops are dropped, the
    /// same rules `GraphBuilder` applies.
    pub fn from_edges<I>(node_count: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = SimilarityEdge>,
    {
        let mut accumulator = EdgeAccumulator::new(node_count);
        for edge in edges {
            if edge.source as usize >= node_count || edge.target as usize >= node_count {
                return Err(RecommendError::InvalidParameter(format!(
                    "edge {}-{} references a node outside 0..{}",
                    edge.source, edge.target, node_count
                )));
            }
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(RecommendError::InvalidParameter(format!(
                    "edge {}-{} has invalid weight {}",
                    edge.source, edge.target, edge.weight
                )));
            }
            accumulator.merge(edge.source, edge.target, edge.weight);
        }
        Ok(accumulator.finish())
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, f64)] {
        self.neighbors
            .get(node as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// Each undirected edge once as `(low, high, weight)`, ascending
    pub fn edges(&self) -> impl Iterator<Item = SimilarityEdge> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(source, list)| {
                list.iter()
                    .filter(move |(target, _)| source < *target as usize)
                    .map(move |&(target, weight)| SimilarityEdge::new(source as NodeId, target, weight))
            })
    }
}

fn check_record(record: &SimilarityRecord) -> Result<()> {
    let malformed = |reason: String| RecommendError::MalformedSimilarityRecord {
        source_id: record.source.clone(),
        reason,
    };

    if record.source.trim().is_empty() {
        return Err(malformed("missing source id".to_string()));
    }
    for (similar_id, weight) in &record.similars {
        if similar_id.trim().is_empty() {
            return Err(malformed("empty similar song id".to_string()));
        }
        if !(0.0..=1.0).contains(weight) {
            return Err(malformed(format!(
                "weight {weight} for '{similar_id}' outside [0,1]"
            )));
        }
    }
    Ok(())
}

struct EdgeAccumulator {
    edges: Vec<FxHashMap<NodeId, f64>>,
}

impl EdgeAccumulator {
    fn new(node_count: usize) -> Self {
        Self {
            edges: vec![FxHashMap::default(); node_count],
        }
    }

    fn ensure_node(&mut self, node: NodeId) {
        if self.edges.len() <= node as usize {
            self.edges.resize_with(node as usize + 1, FxHashMap::default);
        }
    }

    /// Returns false for a self-loop
    fn merge(&mut self, a: NodeId, b: NodeId, weight: f64) -> bool {
        if a == b {
            return false;
        }
        self.ensure_node(a.max(b));

        for (from, to) in [(a, b), (b, a)] {
            let slot = self.edges[from as usize].entry(to).or_insert(weight);
            if weight > *slot {
                *slot = weight;
            }
        }
        true
    }

    fn finish(self) -> AdjacencyGraph {
        let neighbors = self
            .edges
            .into_iter()
            .map(|edges| {
                let mut list: Vec<_> = edges.into_iter().collect();
                list.sort_by_key(|(target, _)| *target);
                list
            })
            .collect();
        AdjacencyGraph { neighbors }
    }
}

/// Incremental builder for the song graph and its index
pub struct GraphBuilder {
    config: GraphConfig,
    index: SongIndex,
    accumulator: EdgeAccumulator,
    stats: BuildStats,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl GraphBuilder {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            index: SongIndex::new(),
            accumulator: EdgeAccumulator::new(0),
            stats: BuildStats::default(),
        }
    }

    /// Get or create a node for the given external id
    pub fn get_or_create_node(&mut self, song_id: &str) -> NodeId {
        let node = self.index.get_or_insert(song_id);
        self.accumulator.ensure_node(node);
        node
    }

    /// Add an undirected similarity edge between two existing nodes.
    ///
    /// Weights outside [0,1], edges below `min_similarity` and self-loops are
    /// counted and dropped.
    pub fn add_similarity(&mut self, a: NodeId, b: NodeId, weight: f64) {
        if !(0.0..=1.0).contains(&weight) {
            warn!(a, b, weight, "dropping similarity with invalid weight");
            self.stats.invalid_weights += 1;
            return;
        }
        if weight < self.config.min_similarity {
            self.stats.edges_below_threshold += 1;
            return;
        }
        if !self.accumulator.merge(a, b, weight) {
            self.stats.self_loops += 1;
        }
    }

    /// Index a record and add its edges.
    ///
    /// A record with an empty source id or any weight that is not finite and
    /// within [0,1] is skipped in full, like a malformed raw row.
    pub fn add_record(&mut self, record: &SimilarityRecord) {
        if let Err(e) = check_record(record) {
            self.skip_record(&e);
            return;
        }
        self.stats.records += 1;
        let source = self.get_or_create_node(&record.source);
        for (similar_id, weight) in &record.similars {
            let target = self.get_or_create_node(similar_id);
            self.add_similarity(source, target, *weight);
        }
    }

    /// Parse and add a raw `(source, "id,w,id,w,...")` row.
    ///
    /// Malformed rows are logged and skipped; no node is assigned for them.
    pub fn add_raw_row(&mut self, source: &str, similars: &str) {
        match parse_similarity_row(source, similars) {
            Ok(record) => self.add_record(&record),
            Err(e) => self.skip_record(&e),
        }
    }

    /// Add every record, skipping the malformed ones
    pub fn extend<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Result<SimilarityRecord>>,
    {
        for record in records {
            match record {
                Ok(record) => self.add_record(&record),
                Err(e) => self.skip_record(&e),
            }
        }
    }

    fn skip_record(&mut self, error: &RecommendError) {
        warn!(%error, "skipping similarity record");
        self.stats.skipped_records += 1;
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn build(self) -> (SongIndex, AdjacencyGraph, BuildStats) {
        let graph = self.accumulator.finish();
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            records = self.stats.records,
            skipped = self.stats.skipped_records,
            below_threshold = self.stats.edges_below_threshold,
            invalid_weights = self.stats.invalid_weights,
            "similarity graph built"
        );
        (self.index, graph, self.stats)
    }
}
