//! Community partition of the song graph.
//!
//! The partition is produced by an external detector (modularity optimization
//! or anything else implementing `CommunityDetector`) and consumed read-only.
//!
//! Invariants:
//! - every node in `0..n` has exactly one community
//! - community ids are contiguous in `0..k`, renumbered in first-seen node order
//! - member lists are ascending and non-empty

use crate::error::{RecommendError, Result};
use crate::graph::{AdjacencyGraph, NodeId};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunityPartition {
    labels: Vec<usize>,
    members: Vec<Vec<NodeId>>,
}

impl CommunityPartition {
    /// Build from a dense label vector (`labels[node] = community`)
    pub fn from_labels(labels: Vec<usize>) -> Self {
        let mut renumbered = labels;
        let community_count = renumber(&mut renumbered);

        let mut members = vec![Vec::new(); community_count];
        for (node, &community) in renumbered.iter().enumerate() {
            members[community].push(node as NodeId);
        }

        Self {
            labels: renumbered,
            members,
        }
    }

    /// Build from `(node, community)` pairs covering every node in `0..node_count`.
    ///
    /// Repeating an identical pair is tolerated; assigning one node to two
    /// communities is not.
    pub fn from_assignments<I>(node_count: usize, assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, usize)>,
    {
        let mut labels: Vec<Option<usize>> = vec![None; node_count];
        for (node, community) in assignments {
            let slot = labels.get_mut(node as usize).ok_or_else(|| {
                RecommendError::PartitionMismatch(format!(
                    "node {node} outside 0..{node_count}"
                ))
            })?;
            match *slot {
                Some(existing) if existing != community => {
                    return Err(RecommendError::PartitionMismatch(format!(
                        "node {node} assigned to communities {existing} and {community}"
                    )));
                }
                _ => *slot = Some(community),
            }
        }

        let labels = collect_complete(labels)?;
        Ok(Self::from_labels(labels))
    }

    /// Build from an explicit community -> members map.
    ///
    /// An empty member list is an `EmptyCommunity` fault.
    pub fn from_members(node_count: usize, members: &FxHashMap<usize, Vec<NodeId>>) -> Result<Self> {
        let mut communities: Vec<_> = members.iter().collect();
        communities.sort_by_key(|(community, _)| **community);

        let mut assignments = Vec::new();
        for (&community, nodes) in communities {
            if nodes.is_empty() {
                return Err(RecommendError::EmptyCommunity { community });
            }
            assignments.extend(nodes.iter().map(|&node| (node, community)));
        }

        Self::from_assignments(node_count, assignments)
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn community_count(&self) -> usize {
        self.members.len()
    }

    pub fn community_of(&self, node: NodeId) -> Option<usize> {
        self.labels.get(node as usize).copied()
    }

    /// Members of a community, ascending
    pub fn members(&self, community: usize) -> Option<&[NodeId]> {
        self.members.get(community).map(Vec::as_slice)
    }

    pub fn community_size(&self, community: usize) -> usize {
        self.members(community).map_or(0, <[NodeId]>::len)
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
}

fn collect_complete(labels: Vec<Option<usize>>) -> Result<Vec<usize>> {
    labels
        .into_iter()
        .enumerate()
        .map(|(node, label)| {
            label.ok_or_else(|| {
                RecommendError::PartitionMismatch(format!("node {node} has no community"))
            })
        })
        .collect()
}

/// Renumber arbitrary labels to `0..k` in first-seen order.
fn renumber(labels: &mut [usize]) -> usize {
    let mut map: FxHashMap<usize, usize> = FxHashMap::default();
    let mut next = 0usize;
    for label in labels.iter_mut() {
        let id = *map.entry(*label).or_insert_with(|| {
            let current = next;
            next += 1;
            current
        });
        *label = id;
    }
    next
}

/// Source of community partitions for a similarity graph
pub trait CommunityDetector {
    fn detect(&self, graph: &AdjacencyGraph) -> CommunityPartition;
}

/// Connected components as communities, found by BFS in node order.
///
/// Deterministic and parameter-free; useful when no modularity-based
/// detector is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponents;

impl CommunityDetector for ConnectedComponents {
    fn detect(&self, graph: &AdjacencyGraph) -> CommunityPartition {
        let n = graph.node_count();
        let mut labels = vec![usize::MAX; n];
        let mut queue = VecDeque::new();

        let mut component = 0usize;
        for start in 0..n {
            if labels[start] != usize::MAX {
                continue;
            }
            labels[start] = component;
            queue.push_back(start as NodeId);
            while let Some(node) = queue.pop_front() {
                for &(neighbor, _) in graph.neighbors(node) {
                    if labels[neighbor as usize] == usize::MAX {
                        labels[neighbor as usize] = component;
                        queue.push_back(neighbor);
                    }
                }
            }
            component += 1;
        }

        CommunityPartition::from_labels(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SimilarityEdge;

    #[test]
    fn test_from_labels_renumbers() {
        let partition = CommunityPartition::from_labels(vec![7, 3, 7, 9]);
        assert_eq!(partition.labels(), &[0, 1, 0, 2]);
        assert_eq!(partition.community_count(), 3);
        assert_eq!(partition.members(0), Some(&[0, 2][..]));
        assert_eq!(partition.community_size(1), 1);
        assert_eq!(partition.community_size(5), 0);
    }

    #[test]
    fn test_from_assignments() {
        let partition =
            CommunityPartition::from_assignments(3, [(2, 5), (0, 1), (1, 5), (2, 5)]).unwrap();
        assert_eq!(partition.community_of(0), Some(0));
        assert_eq!(partition.community_of(1), Some(1));
        assert_eq!(partition.community_of(2), Some(1));
        assert_eq!(partition.members(1), Some(&[1, 2][..]));
    }

    #[test]
    fn test_from_assignments_missing_node() {
        let result = CommunityPartition::from_assignments(3, [(0, 0), (2, 0)]);
        assert!(matches!(result, Err(RecommendError::PartitionMismatch(_))));
    }

    #[test]
    fn test_from_assignments_conflict() {
        let result = CommunityPartition::from_assignments(2, [(0, 0), (1, 0), (0, 1)]);
        assert!(matches!(result, Err(RecommendError::PartitionMismatch(_))));
    }

    #[test]
    fn test_from_assignments_out_of_range() {
        let result = CommunityPartition::from_assignments(2, [(0, 0), (1, 0), (4, 0)]);
        assert!(matches!(result, Err(RecommendError::PartitionMismatch(_))));
    }

    #[test]
    fn test_from_members_rejects_empty_community() {
        let mut members = FxHashMap::default();
        members.insert(0, vec![0, 1]);
        members.insert(1, vec![]);
        let result = CommunityPartition::from_members(2, &members);
        assert!(matches!(result, Err(RecommendError::EmptyCommunity { community: 1 })));
    }

    #[test]
    fn test_connected_components() {
        // 0-1-2 and 3-4, 5 isolated
        let graph = AdjacencyGraph::from_edges(
            6,
            [
                SimilarityEdge::new(0, 1, 1.0),
                SimilarityEdge::new(1, 2, 1.0),
                SimilarityEdge::new(3, 4, 1.0),
            ],
        )
        .unwrap();
        let partition = ConnectedComponents.detect(&graph);

        assert_eq!(partition.labels(), &[0, 0, 0, 1, 1, 2]);
        assert_eq!(partition.members(2), Some(&[5][..]));
    }
}
