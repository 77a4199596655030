//! Text exchange formats
//!
//! - similarity rows: `source` plus `"id1,w1,id2,w2,..."`, or one row per line
//!   as `source<TAB>id1,w1,...` in a dump
//! - edge list: `srcIndex,dstIndex,weight` per line
//! - partition: `nodeIndex, communityId` per line, read and written
//!
//! Malformed lines are logged and skipped. Only I/O failures abort a load.

use crate::community::CommunityPartition;
use crate::error::{RecommendError, Result};
use crate::graph::{AdjacencyGraph, NodeId, SimilarityEdge, SimilarityRecord};
use std::io::{BufRead, Write};
use tracing::warn;

pub fn parse_similarity_row(source: &str, similars: &str) -> Result<SimilarityRecord> {
    let source_id = source.trim();
    let malformed = |reason: String| RecommendError::MalformedSimilarityRecord {
        source_id: source_id.to_string(),
        reason,
    };

    if source_id.is_empty() {
        return Err(malformed("missing source id".to_string()));
    }

    let similars = similars.trim();
    if similars.is_empty() {
        return Ok(SimilarityRecord {
            source: source_id.to_string(),
            similars: Vec::new(),
        });
    }

    let fields: Vec<&str> = similars.split(',').map(str::trim).collect();
    if fields.len() % 2 != 0 {
        return Err(malformed(format!(
            "expected id/weight pairs, found {} fields",
            fields.len()
        )));
    }

    let mut pairs = Vec::with_capacity(fields.len() / 2);
    for pair in fields.chunks_exact(2) {
        let (similar_id, raw_weight) = (pair[0], pair[1]);
        if similar_id.is_empty() {
            return Err(malformed("empty similar song id".to_string()));
        }
        let weight = parse_weight(raw_weight).map_err(malformed)?;
        pairs.push((similar_id.to_string(), weight));
    }

    Ok(SimilarityRecord {
        source: source_id.to_string(),
        similars: pairs,
    })
}

/// Parse a `source<TAB>similars` dump, one record per non-blank line.
///
/// Each line yields its own result so callers can skip malformed rows.
pub fn parse_similarity_dump<R: BufRead>(reader: R) -> Result<Vec<Result<SimilarityRecord>>> {
    let mut records = Vec::new();
    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = match line.split_once('\t') {
            Some((source, similars)) => parse_similarity_row(source, similars),
            None => Err(RecommendError::MalformedSimilarityRecord {
                source_id: line.trim().to_string(),
                reason: format!("line {}: missing tab separator", line_index + 1),
            }),
        };
        records.push(record);
    }
    Ok(records)
}

fn parse_weight(raw: &str) -> std::result::Result<f64, String> {
    let weight: f64 = raw
        .parse()
        .map_err(|_| format!("unparsable weight '{raw}'"))?;
    if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
        return Err(format!("weight {weight} outside [0,1]"));
    }
    Ok(weight)
}

pub fn parse_edge_line(line: &str, line_number: usize, node_count: usize) -> Result<SimilarityEdge> {
    let malformed = |reason: String| RecommendError::MalformedEdgeRecord {
        line: line_number,
        reason,
    };

    let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(malformed(format!("expected 3 fields, found {}", fields.len())));
    }

    let source = parse_node(fields[0], node_count).map_err(malformed)?;
    let target = parse_node(fields[1], node_count).map_err(malformed)?;
    let weight = parse_weight(fields[2]).map_err(malformed)?;

    Ok(SimilarityEdge::new(source, target, weight))
}

fn parse_node(raw: &str, node_count: usize) -> std::result::Result<NodeId, String> {
    let node: NodeId = raw
        .parse()
        .map_err(|_| format!("unparsable node index '{raw}'"))?;
    if node as usize >= node_count {
        return Err(format!("node index {node} outside 0..{node_count}"));
    }
    Ok(node)
}

/// Read an edge list over `node_count` indexed songs, skipping malformed lines
pub fn parse_edge_list<R: BufRead>(reader: R, node_count: usize) -> Result<Vec<SimilarityEdge>> {
    let mut edges = Vec::new();
    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_edge_line(&line, line_index + 1, node_count) {
            Ok(edge) => edges.push(edge),
            Err(error) => warn!(%error, "skipping edge record"),
        }
    }
    Ok(edges)
}

/// Write each undirected edge once as `low,high,weight`
pub fn write_edge_list<W: Write>(graph: &AdjacencyGraph, mut writer: W) -> Result<()> {
    for edge in graph.edges() {
        writeln!(writer, "{},{},{}", edge.source, edge.target, edge.weight)?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse one `nodeIndex, communityId` line
pub fn parse_partition_line(line: &str) -> Option<(NodeId, usize)> {
    let (node, community) = line.trim().split_once(',')?;
    let node = node.trim().parse().ok()?;
    let community = community.trim().parse().ok()?;
    Some((node, community))
}

/// Write one `nodeIndex, communityId` line per node, ascending
pub fn write_partition<W: Write>(partition: &CommunityPartition, mut writer: W) -> Result<()> {
    for (node, community) in partition.labels().iter().enumerate() {
        writeln!(writer, "{node}, {community}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a partition file into `(node, community)` assignments
pub fn parse_partition<R: BufRead>(reader: R) -> Result<Vec<(NodeId, usize)>> {
    let mut assignments = Vec::new();
    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_partition_line(&line) {
            Some(assignment) => assignments.push(assignment),
            None => warn!(line = line_index + 1, content = %line, "skipping partition record"),
        }
    }
    Ok(assignments)
}
