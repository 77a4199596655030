//! Dense song indexing
//!
//! Every external song identifier gets a dense `NodeId` in `0..n`, assigned in
//! first-seen order. Matrix rows, restart entries and scores are all addressed
//! by this id.

use crate::error::{RecommendError, Result};
use rustc_hash::FxHashMap;

pub type NodeId = u32;

/// Bidirectional mapping between external song ids and dense node ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongIndex {
    id_to_node: FxHashMap<String, NodeId>,
    node_to_id: Vec<String>,
}

impl SongIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_node: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            node_to_id: Vec::with_capacity(capacity),
        }
    }

    /// Build an index whose node ids are the positions in `ids`.
    ///
    /// Used when node ids were assigned elsewhere (e.g. an edge list file).
    pub fn from_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::new();
        for id in ids {
            let id = id.into();
            if index.id_to_node.contains_key(&id) {
                return Err(RecommendError::InvalidParameter(format!(
                    "duplicate song id '{id}'"
                )));
            }
            index.get_or_insert(&id);
        }
        Ok(index)
    }

    /// Return the node for `id`, assigning the next free node id if unseen
    pub(crate) fn get_or_insert(&mut self, id: &str) -> NodeId {
        if let Some(&node) = self.id_to_node.get(id) {
            return node;
        }

        let node = self.node_to_id.len() as NodeId;
        self.id_to_node.insert(id.to_string(), node);
        self.node_to_id.push(id.to_string());
        node
    }

    pub fn node_of(&self, id: &str) -> Option<NodeId> {
        self.id_to_node.get(id).copied()
    }

    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.node_to_id.get(node as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.node_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_to_id.is_empty()
    }

    /// Iterate `(node, external id)` in node order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.node_to_id
            .iter()
            .enumerate()
            .map(|(i, id)| (i as NodeId, id.as_str()))
    }
}
