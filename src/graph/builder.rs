//! Graph builder with efficient edge handling
//!
//! This module provides a mutable graph builder that uses FxHashMap
//! for O(1) arc lookups during construction.

use rustc_hash::FxHashMap;

use super::csr::CsrGraph;
use super::GraphKind;

/// A node in the graph builder
#[derive(Debug, Clone, Default)]
pub struct BuilderNode {
    /// Optional label for this node
    pub label: Option<String>,
    /// Adjacency list: target node ID -> arc weight
    pub edges: FxHashMap<u32, f64>,
}

impl BuilderNode {
    /// Create a new unlabeled node
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new labeled node
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            edges: FxHashMap::default(),
        }
    }
}

/// A mutable graph builder optimized for incremental construction
///
/// Arcs that name a node id the builder has not allocated are ignored.
#[derive(Debug)]
pub struct GraphBuilder {
    kind: GraphKind,
    /// Set once any explicitly weighted arc is added
    weighted: bool,
    /// Maps label -> node ID
    label_to_id: FxHashMap<String, u32>,
    /// Node storage
    nodes: Vec<BuilderNode>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(GraphKind::Directed)
    }
}

impl GraphBuilder {
    /// Create a new empty graph builder
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            weighted: false,
            label_to_id: FxHashMap::default(),
            nodes: Vec::new(),
        }
    }

    /// Create an empty directed builder
    pub fn directed() -> Self {
        Self::new(GraphKind::Directed)
    }

    /// Create an empty undirected builder
    pub fn undirected() -> Self {
        Self::new(GraphKind::Undirected)
    }

    /// Create a graph builder with pre-allocated capacity
    pub fn with_capacity(kind: GraphKind, node_capacity: usize) -> Self {
        Self {
            kind,
            weighted: false,
            label_to_id: FxHashMap::with_capacity_and_hasher(node_capacity, Default::default()),
            nodes: Vec::with_capacity(node_capacity),
        }
    }

    /// Create a builder holding `num_nodes` unlabeled nodes `0..num_nodes`
    pub fn with_nodes(kind: GraphKind, num_nodes: usize) -> Self {
        let mut builder = Self::with_capacity(kind, num_nodes);
        builder.nodes.resize_with(num_nodes, BuilderNode::new);
        builder
    }

    /// Build an unweighted graph from an arc list
    pub fn from_edges(kind: GraphKind, num_nodes: usize, edges: &[(u32, u32)]) -> Self {
        let mut builder = Self::with_nodes(kind, num_nodes);
        for &(from, to) in edges {
            builder.add_edge(from, to);
        }
        builder
    }

    /// Build a weighted graph from an arc list
    pub fn from_weighted_edges(kind: GraphKind, num_nodes: usize, edges: &[(u32, u32, f64)]) -> Self {
        let mut builder = Self::with_nodes(kind, num_nodes);
        builder.weighted = true;
        for &(from, to, weight) in edges {
            builder.increment_edge(from, to, weight);
        }
        builder
    }

    /// Append an unlabeled node, returning its ID
    pub fn add_node(&mut self) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(BuilderNode::new());
        id
    }

    /// Get or create a node for the given label, returning its ID
    pub fn get_or_create_node(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.label_to_id.get(label) {
            return id;
        }

        let id = self.nodes.len() as u32;
        self.label_to_id.insert(label.to_string(), id);
        self.nodes.push(BuilderNode::labeled(label));
        id
    }

    /// Add an unweighted arc (an edge, for undirected builders)
    ///
    /// Repeating an arc does not change the graph: the adjacency stays 0/1.
    pub fn add_edge(&mut self, from: u32, to: u32) {
        if !self.contains(from) || !self.contains(to) {
            return;
        }

        self.nodes[from as usize].edges.entry(to).or_insert(1.0);
        if self.kind == GraphKind::Undirected && from != to {
            self.nodes[to as usize].edges.entry(from).or_insert(1.0);
        }
    }

    /// Increment the arc weight between two nodes and mark the graph weighted
    ///
    /// If the arc doesn't exist, it's created with the given weight.
    /// Self-loops are kept. Weights are not checked here; negative totals are
    /// rejected when the transition model is built.
    pub fn increment_edge(&mut self, from: u32, to: u32, weight: f64) {
        if !self.contains(from) || !self.contains(to) {
            return;
        }
        self.weighted = true;

        *self.nodes[from as usize].edges.entry(to).or_insert(0.0) += weight;
        if self.kind == GraphKind::Undirected && from != to {
            *self.nodes[to as usize].edges.entry(from).or_insert(0.0) += weight;
        }
    }

    fn contains(&self, id: u32) -> bool {
        (id as usize) < self.nodes.len()
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of arcs, or of edges for an undirected builder
    pub fn edge_count(&self) -> usize {
        let arcs: usize = self.nodes.iter().map(|n| n.edges.len()).sum();
        match self.kind {
            GraphKind::Directed => arcs,
            GraphKind::Undirected => {
                let loops = self
                    .nodes()
                    .filter(|(id, n)| n.edges.contains_key(id))
                    .count();
                (arcs + loops) / 2
            }
        }
    }

    /// Get a node by ID
    pub fn get_node(&self, id: u32) -> Option<&BuilderNode> {
        self.nodes.get(id as usize)
    }

    /// Get a node ID by label
    pub fn get_node_id(&self, label: &str) -> Option<u32> {
        self.label_to_id.get(label).copied()
    }

    /// Get the label for a node ID
    pub fn get_label(&self, id: u32) -> Option<&str> {
        self.nodes.get(id as usize).and_then(|n| n.label.as_deref())
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &BuilderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as u32, n))
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Freeze into CSR form
    pub fn build(&self) -> CsrGraph {
        CsrGraph::from_builder(self)
    }
}
