//! Graph construction and representation
//!
//! This module provides a mutable builder, an immutable CSR store, and the
//! [`GraphSource`] trait through which the PageRank engine reads adjacency.

pub mod builder;
pub mod csr;

use serde::{Deserialize, Serialize};

/// Whether arcs are one-way or symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    #[default]
    Directed,
    /// Every edge is stored as a pair of opposite arcs.
    Undirected,
}

/// Read-only adjacency view consumed by
/// [`TransitionMatrix::from_graph`](crate::pagerank::transition::TransitionMatrix::from_graph).
///
/// Nodes are the dense ids `0..node_count()`. Arc weights are the raw
/// adjacency values; for an unweighted graph they are ignored and every arc
/// counts as 1.
pub trait GraphSource {
    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Outgoing arcs of `node` as `(target, weight)` pairs.
    fn out_arcs(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_;

    /// Incoming arcs of `node` as `(source, weight)` pairs.
    fn in_arcs(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_;

    /// Weight of the arc `from -> to`, if present.
    fn arc_weight(&self, from: u32, to: u32) -> Option<f64> {
        self.out_arcs(from)
            .find(|&(target, _)| target == to)
            .map(|(_, weight)| weight)
    }

    /// Whether arc weights carry meaning.
    fn is_weighted(&self) -> bool;
}
