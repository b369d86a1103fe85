//! Compressed Sparse Row (CSR) graph representation
//!
//! CSR is optimized for iteration over neighbors, which is exactly what
//! building a transition model needs. Both directions are stored: the
//! forward rows give out-arcs and a transposed copy gives in-arcs.

use super::builder::GraphBuilder;
use super::{GraphKind, GraphSource};

/// A graph in Compressed Sparse Row format
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// Number of nodes
    pub num_nodes: usize,
    /// Row pointers: node i's out-arcs are at indices row_ptr[i]..row_ptr[i+1]
    pub row_ptr: Vec<usize>,
    /// Column indices (target nodes) for each arc
    pub col_idx: Vec<u32>,
    /// Arc weights
    pub weights: Vec<f64>,
    /// In-arc pointers into `in_idx` / `in_weights`
    pub in_ptr: Vec<usize>,
    /// Source node of each in-arc
    pub in_idx: Vec<u32>,
    /// Weight of each in-arc
    pub in_weights: Vec<f64>,
    /// Labels for each node
    pub labels: Vec<Option<String>>,
    pub kind: GraphKind,
    pub weighted: bool,
}

impl CsrGraph {
    /// Convert a GraphBuilder into CSR format
    pub fn from_builder(builder: &GraphBuilder) -> Self {
        let num_nodes = builder.node_count();
        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::new();
        let mut weights = Vec::new();
        let mut labels = Vec::with_capacity(num_nodes);

        row_ptr.push(0);

        for (_, node) in builder.nodes() {
            labels.push(node.label.clone());

            // Collect and sort arcs for deterministic iteration
            let mut edges: Vec<_> = node.edges.iter().map(|(&k, &v)| (k, v)).collect();
            edges.sort_by_key(|(k, _)| *k);

            for (target, weight) in edges {
                col_idx.push(target);
                weights.push(weight);
            }

            row_ptr.push(col_idx.len());
        }

        let (in_ptr, in_idx, in_weights) = transpose(num_nodes, &row_ptr, &col_idx, &weights);

        Self {
            num_nodes,
            row_ptr,
            col_idx,
            weights,
            in_ptr,
            in_idx,
            in_weights,
            labels,
            kind: builder.kind(),
            weighted: builder.is_weighted(),
        }
    }

    /// Iterate over out-neighbors of a node
    pub fn neighbors(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        let start = self.row_ptr[node as usize];
        let end = self.row_ptr[node as usize + 1];
        (start..end).map(move |i| (self.col_idx[i], self.weights[i]))
    }

    /// Iterate over in-neighbors of a node
    pub fn predecessors(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        let start = self.in_ptr[node as usize];
        let end = self.in_ptr[node as usize + 1];
        (start..end).map(move |i| (self.in_idx[i], self.in_weights[i]))
    }

    /// Weight of the arc `from -> to`
    pub fn edge_weight(&self, from: u32, to: u32) -> Option<f64> {
        let start = self.row_ptr[from as usize];
        let end = self.row_ptr[from as usize + 1];
        self.col_idx[start..end]
            .binary_search(&to)
            .ok()
            .map(|offset| self.weights[start + offset])
    }

    /// Weight of the self-loop on `node`, or 0
    pub fn self_loop_weight(&self, node: u32) -> f64 {
        self.edge_weight(node, node).unwrap_or(0.0)
    }

    /// Get the label for a node
    pub fn label(&self, node: u32) -> Option<&str> {
        self.labels.get(node as usize).and_then(|l| l.as_deref())
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Get the total number of arcs (counting each undirected edge twice)
    pub fn num_edges(&self) -> usize {
        self.col_idx.len()
    }

    /// Get node ID by label (linear search - use sparingly)
    pub fn get_node_by_label(&self, label: &str) -> Option<u32> {
        self.labels
            .iter()
            .position(|l| l.as_deref() == Some(label))
            .map(|i| i as u32)
    }
}

/// Build the in-arc CSR from the out-arc CSR by counting sort.
///
/// Sources within each row come out in ascending order because the forward
/// rows are visited in node order.
fn transpose(
    num_nodes: usize,
    row_ptr: &[usize],
    col_idx: &[u32],
    weights: &[f64],
) -> (Vec<usize>, Vec<u32>, Vec<f64>) {
    let mut in_ptr = vec![0usize; num_nodes + 1];
    for &target in col_idx {
        in_ptr[target as usize + 1] += 1;
    }
    for i in 0..num_nodes {
        in_ptr[i + 1] += in_ptr[i];
    }

    let mut cursor = in_ptr.clone();
    let mut in_idx = vec![0u32; col_idx.len()];
    let mut in_weights = vec![0.0; col_idx.len()];
    for source in 0..num_nodes {
        for i in row_ptr[source]..row_ptr[source + 1] {
            let target = col_idx[i] as usize;
            let slot = cursor[target];
            in_idx[slot] = source as u32;
            in_weights[slot] = weights[i];
            cursor[target] += 1;
        }
    }

    (in_ptr, in_idx, in_weights)
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            row_ptr: vec![0],
            col_idx: Vec::new(),
            weights: Vec::new(),
            in_ptr: vec![0],
            in_idx: Vec::new(),
            in_weights: Vec::new(),
            labels: Vec::new(),
            kind: GraphKind::Directed,
            weighted: false,
        }
    }
}

impl GraphSource for CsrGraph {
    fn node_count(&self) -> usize {
        self.num_nodes
    }

    fn out_arcs(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.neighbors(node)
    }

    fn in_arcs(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.predecessors(node)
    }

    fn arc_weight(&self, from: u32, to: u32) -> Option<f64> {
        self.edge_weight(from, to)
    }

    fn is_weighted(&self) -> bool {
        self.weighted
    }
}
