//! Row-stochastic transition matrix in Compressed Sparse Row form
//!
//! Built in two passes over the adjacency: accumulate each row's outgoing
//! weight, then rewrite every entry as `w / row_sum`. Rows with no outgoing
//! weight are recorded as sinks and left empty; the solver hands their mass
//! back through the restart vector.
//!
//! The transposed layout is kept alongside so that `x * M` can be evaluated
//! one output entry at a time with a fixed summation order, which makes the
//! parallel product bit-identical to the sequential one.

use crate::graph::{AdjacencyGraph, NodeId};
use rayon::prelude::*;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionMatrix {
    num_nodes: usize,
    /// Row pointers: row i's entries are at row_ptr[i]..row_ptr[i+1]
    row_ptr: Vec<usize>,
    col_idx: Vec<NodeId>,
    values: Vec<f64>,
    /// Column pointers of the transposed layout
    in_ptr: Vec<usize>,
    in_src: Vec<NodeId>,
    in_values: Vec<f64>,
    sinks: Vec<NodeId>,
}

impl TransitionMatrix {
    pub fn from_graph(graph: &AdjacencyGraph) -> Self {
        let rows = (0..graph.node_count() as NodeId).map(|node| graph.neighbors(node).to_vec());
        Self::from_weighted_rows(graph.node_count(), rows)
    }

    /// Normalize arbitrary weighted rows.
    ///
    /// Entries with a column outside `0..num_nodes` or a weight that is not
    /// finite and positive are discarded before row sums are taken. Rows with
    /// nothing left, and rows beyond those yielded by `rows`, are empty sinks.
    pub fn from_weighted_rows<I>(num_nodes: usize, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<(NodeId, f64)>>,
    {
        let mut raw_rows: Vec<Vec<(NodeId, f64)>> = rows
            .into_iter()
            .take(num_nodes)
            .map(|row| {
                row.into_iter()
                    .filter(|&(target, weight)| {
                        (target as usize) < num_nodes && weight.is_finite() && weight > 0.0
                    })
                    .collect()
            })
            .collect();
        raw_rows.resize_with(num_nodes, Vec::new);

        // Pass 1: outgoing weight per row, over the entries that survive
        let row_sums: Vec<f64> = raw_rows
            .iter()
            .map(|row| row.iter().map(|(_, w)| *w).sum())
            .collect();

        // Pass 2: rewrite weights, collect sinks
        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        let mut sinks = Vec::new();
        row_ptr.push(0);

        for (node, (row, &row_sum)) in raw_rows.iter().zip(row_sums.iter()).enumerate() {
            if row_sum > 0.0 {
                for &(target, weight) in row {
                    col_idx.push(target);
                    values.push(weight / row_sum);
                }
            } else {
                sinks.push(node as NodeId);
            }
            row_ptr.push(col_idx.len());
        }

        let (in_ptr, in_src, in_values) = transpose(num_nodes, &row_ptr, &col_idx, &values);

        Self {
            num_nodes,
            row_ptr,
            col_idx,
            values,
            in_ptr,
            in_src,
            in_values,
            sinks,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of stored (non-zero) entries
    pub fn num_entries(&self) -> usize {
        self.col_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Iterate `(column, probability)` of a row
    pub fn row(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let start = self.row_ptr[node as usize];
        let end = self.row_ptr[node as usize + 1];
        (start..end).map(move |i| (self.col_idx[i], self.values[i]))
    }

    pub fn row_sum(&self, node: NodeId) -> f64 {
        self.row(node).map(|(_, p)| p).sum()
    }

    /// Nodes with no outgoing weight, ascending
    pub fn sinks(&self) -> &[NodeId] {
        &self.sinks
    }

    pub fn is_sink(&self, node: NodeId) -> bool {
        self.sinks.binary_search(&node).is_ok()
    }

    /// `out = x * M`
    pub fn left_multiply(&self, x: &[f64], out: &mut [f64], parallel: bool) {
        debug_assert_eq!(x.len(), self.num_nodes);
        debug_assert_eq!(out.len(), self.num_nodes);

        if parallel {
            out.par_iter_mut()
                .enumerate()
                .for_each(|(column, slot)| *slot = self.column_dot(column, x));
        } else {
            for (column, slot) in out.iter_mut().enumerate() {
                *slot = self.column_dot(column, x);
            }
        }
    }

    fn column_dot(&self, column: usize, x: &[f64]) -> f64 {
        let start = self.in_ptr[column];
        let end = self.in_ptr[column + 1];
        (start..end)
            .map(|i| x[self.in_src[i] as usize] * self.in_values[i])
            .sum()
    }
}

/// Counting-sort transpose; entries of each column stay in ascending row order
fn transpose(
    num_nodes: usize,
    row_ptr: &[usize],
    col_idx: &[NodeId],
    values: &[f64],
) -> (Vec<usize>, Vec<NodeId>, Vec<f64>) {
    let mut in_ptr = vec![0usize; num_nodes + 1];
    for &column in col_idx {
        in_ptr[column as usize + 1] += 1;
    }
    for i in 0..num_nodes {
        in_ptr[i + 1] += in_ptr[i];
    }

    let mut cursor = in_ptr.clone();
    let mut in_src = vec![0 as NodeId; col_idx.len()];
    let mut in_values = vec![0.0; col_idx.len()];
    for row in 0..num_nodes {
        for i in row_ptr[row]..row_ptr[row + 1] {
            let column = col_idx[i] as usize;
            let slot = cursor[column];
            in_src[slot] = row as NodeId;
            in_values[slot] = values[i];
            cursor[column] += 1;
        }
    }

    (in_ptr, in_src, in_values)
}
