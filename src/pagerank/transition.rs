//! Damped random-walk transition model
//!
//! [`TransitionMatrix`] holds `P`, where `P[i, j]` is the probability of
//! stepping from node `j` to node `i`, so `P · x` advances a rank vector by
//! one step. Every column sums to 1.
//!
//! Columns of ordinary nodes are stored in CSR over the rows of `P` (one row
//! per target node, entries ordered by source). Sink columns are uniform and
//! stored implicitly:
//!
//! - a sink without a self-loop spreads `1 / (N − 1)` to every other node;
//! - a sink with a self-loop spreads `1 / N` to every node, itself included.
//!
//! A lone node without a self-loop is treated as the second kind.

use rayon::prelude::*;

use crate::errors::{PageRankError, Result};
use crate::graph::GraphSource;

/// Node count from which `P · x` is computed with rayon.
pub const PARALLEL_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Sparse,
    /// Uniform over every other node.
    SpreadSink,
    /// Uniform over every node.
    LoopedSink,
}

/// Column-stochastic transition matrix of a graph
#[derive(Debug, Clone)]
pub struct TransitionMatrix {
    num_nodes: usize,
    /// Row pointers: row i's entries are at row_ptr[i]..row_ptr[i+1]
    row_ptr: Vec<usize>,
    /// Source node (column) of each entry
    col_idx: Vec<u32>,
    /// Probability of each entry
    values: Vec<f64>,
    columns: Vec<Column>,
    spread_sinks: Vec<u32>,
    looped_sinks: Vec<u32>,
}

impl TransitionMatrix {
    /// Build the transition model of `graph`.
    ///
    /// Fails with [`PageRankError::EmptyGraph`] for a graph without nodes and
    /// with [`PageRankError::InvalidWeight`] as soon as a negative or
    /// non-finite adjacency entry is found.
    pub fn from_graph(graph: &impl GraphSource) -> Result<Self> {
        let n = graph.node_count();
        if n == 0 {
            return Err(PageRankError::EmptyGraph);
        }
        let weighted = graph.is_weighted();

        let mut columns = Vec::with_capacity(n);
        let mut spread_sinks = Vec::new();
        let mut looped_sinks = Vec::new();
        // (target, source, probability), generated source by source
        let mut triplets: Vec<(u32, u32, f64)> = Vec::new();
        let mut row = Vec::new();

        for source in 0..n as u32 {
            adjacency_row(graph, source, weighted, &mut row)?;

            let total: f64 = row.iter().map(|&(_, w)| w).sum();
            let self_loop = row
                .iter()
                .find(|&&(target, _)| target == source)
                .map_or(0.0, |&(_, w)| w);

            if total - self_loop == 0.0 {
                if self_loop == 0.0 && n > 1 {
                    columns.push(Column::SpreadSink);
                    spread_sinks.push(source);
                } else {
                    columns.push(Column::LoopedSink);
                    looped_sinks.push(source);
                }
                continue;
            }

            columns.push(Column::Sparse);
            triplets.extend(
                row.iter()
                    .filter(|&&(_, w)| w > 0.0)
                    .map(|&(target, w)| (target, source, w / total)),
            );
        }

        let (row_ptr, col_idx, values) = compress_rows(n, &triplets);

        Ok(Self {
            num_nodes: n,
            row_ptr,
            col_idx,
            values,
            columns,
            spread_sinks,
            looped_sinks,
        })
    }

    /// Number of nodes (the matrix is `N × N`)
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of explicitly stored entries (sink columns are implicit)
    pub fn num_entries(&self) -> usize {
        self.values.len()
    }

    /// Whether `node` had no outgoing mass apart from a self-loop
    ///
    /// # Panics
    ///
    /// Panics if `node` is not below [`num_nodes`](Self::num_nodes).
    pub fn is_sink(&self, node: u32) -> bool {
        self.columns[node as usize] != Column::Sparse
    }

    /// All sink nodes in ascending order
    pub fn sinks(&self) -> Vec<u32> {
        (0..self.num_nodes as u32).filter(|&n| self.is_sink(n)).collect()
    }

    /// Effective probability of stepping from `source` to `target`
    ///
    /// # Panics
    ///
    /// Panics if either id is not below [`num_nodes`](Self::num_nodes).
    pub fn entry(&self, target: u32, source: u32) -> f64 {
        match self.columns[source as usize] {
            Column::SpreadSink if target == source => 0.0,
            Column::SpreadSink => 1.0 / (self.num_nodes - 1) as f64,
            Column::LoopedSink => 1.0 / self.num_nodes as f64,
            Column::Sparse => {
                let start = self.row_ptr[target as usize];
                let end = self.row_ptr[target as usize + 1];
                self.col_idx[start..end]
                    .binary_search(&source)
                    .map_or(0.0, |offset| self.values[start + offset])
            }
        }
    }

    /// Dense successor distribution of `source` (column `source` of `P`)
    ///
    /// # Panics
    ///
    /// Panics if `source` is not below [`num_nodes`](Self::num_nodes).
    pub fn column(&self, source: u32) -> Vec<f64> {
        (0..self.num_nodes as u32)
            .map(|target| self.entry(target, source))
            .collect()
    }

    /// Compute `out = P · x`.
    ///
    /// Each output entry is summed by one thread in source order, so the
    /// result does not depend on whether rayon is used.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `out` is shorter than [`num_nodes`](Self::num_nodes).
    pub fn multiply_into(&self, x: &[f64], out: &mut [f64]) {
        self.multiply_with(x, out, self.num_nodes >= PARALLEL_THRESHOLD);
    }

    pub(crate) fn multiply_with(&self, x: &[f64], out: &mut [f64], parallel: bool) {
        debug_assert_eq!(x.len(), self.num_nodes);
        debug_assert_eq!(out.len(), self.num_nodes);

        let n = self.num_nodes;
        let spread_mass: f64 = self.spread_sinks.iter().map(|&s| x[s as usize]).sum();
        let looped_mass: f64 = self.looped_sinks.iter().map(|&s| x[s as usize]).sum();
        let spread_share = if n > 1 { 1.0 / (n - 1) as f64 } else { 0.0 };
        let base = spread_mass * spread_share + looped_mass / n as f64;

        let row = |(i, out_i): (usize, &mut f64)| {
            let start = self.row_ptr[i];
            let end = self.row_ptr[i + 1];
            let mut acc = 0.0;
            for k in start..end {
                acc += self.values[k] * x[self.col_idx[k] as usize];
            }
            let own = if self.columns[i] == Column::SpreadSink {
                x[i] * spread_share
            } else {
                0.0
            };
            *out_i = acc + base - own;
        };

        if parallel {
            out.par_iter_mut().enumerate().for_each(row);
        } else {
            out.iter_mut().enumerate().for_each(row);
        }
    }
}

/// Collect the adjacency row of `source` with parallel arcs merged and
/// every arc checked.
fn adjacency_row(
    graph: &impl GraphSource,
    source: u32,
    weighted: bool,
    row: &mut Vec<(u32, f64)>,
) -> Result<()> {
    let nodes = graph.node_count();
    row.clear();
    for (target, weight) in graph.out_arcs(source) {
        if target as usize >= nodes {
            return Err(PageRankError::InvalidArc {
                from: source,
                to: target,
                nodes,
            });
        }
        let weight = if weighted { weight } else { 1.0 };
        if !weight.is_finite() || weight < 0.0 {
            return Err(PageRankError::InvalidWeight {
                from: source,
                to: target,
                weight,
            });
        }
        row.push((target, weight));
    }

    row.sort_by_key(|&(target, _)| target);
    row.dedup_by(|next, kept| {
        if next.0 != kept.0 {
            return false;
        }
        if weighted {
            kept.1 += next.1;
        }
        true
    });
    Ok(())
}

/// Counting sort of `(row, col, value)` triplets into CSR. Triplets arrive
/// in ascending column order, which is preserved within each row.
fn compress_rows(n: usize, triplets: &[(u32, u32, f64)]) -> (Vec<usize>, Vec<u32>, Vec<f64>) {
    let mut row_ptr = vec![0usize; n + 1];
    for &(row, _, _) in triplets {
        row_ptr[row as usize + 1] += 1;
    }
    for i in 0..n {
        row_ptr[i + 1] += row_ptr[i];
    }

    let mut cursor = row_ptr.clone();
    let mut col_idx = vec![0u32; triplets.len()];
    let mut values = vec![0.0; triplets.len()];
    for &(row, col, value) in triplets {
        let slot = cursor[row as usize];
        col_idx[slot] = col;
        values[slot] = value;
        cursor[row as usize] += 1;
    }

    (row_ptr, col_idx, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use crate::graph::GraphKind;

    fn column_sums(matrix: &TransitionMatrix) -> Vec<f64> {
        (0..matrix.num_nodes() as u32)
            .map(|j| matrix.column(j).iter().sum())
            .collect()
    }

    #[test]
    fn test_path_with_sink() {
        // 0 -> 1 -> 2, node 2 is a sink
        let graph = GraphBuilder::from_edges(GraphKind::Directed, 3, &[(0, 1), (1, 2)]).build();
        let p = TransitionMatrix::from_graph(&graph).unwrap();

        assert_eq!(p.column(0), vec![0.0, 1.0, 0.0]);
        assert_eq!(p.column(1), vec![0.0, 0.0, 1.0]);
        // Sink spreads uniformly over every other node, no self-loop added
        assert_eq!(p.column(2), vec![0.5, 0.5, 0.0]);
        assert_eq!(p.sinks(), vec![2]);
        assert_eq!(p.num_entries(), 2);
    }

    #[test]
    fn test_sink_with_self_loop_spreads_to_all() {
        let graph =
            GraphBuilder::from_edges(GraphKind::Directed, 3, &[(0, 1), (1, 2), (2, 2)]).build();
        let p = TransitionMatrix::from_graph(&graph).unwrap();

        let third = 1.0 / 3.0;
        assert_eq!(p.column(2), vec![third, third, third]);
        assert!(p.is_sink(2));
    }

    #[test]
    fn test_weighted_columns_are_normalized() {
        let graph = GraphBuilder::from_weighted_edges(
            GraphKind::Directed,
            3,
            &[(0, 1, 3.0), (0, 2, 1.0), (1, 0, 2.0), (2, 0, 5.0), (2, 2, 5.0)],
        )
        .build();
        let p = TransitionMatrix::from_graph(&graph).unwrap();

        assert_eq!(p.column(0), vec![0.0, 0.75, 0.25]);
        assert_eq!(p.column(2), vec![0.5, 0.0, 0.5]);
        for sum in column_sums(&p) {
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unweighted_graph_ignores_stored_weights() {
        let mut builder = GraphBuilder::with_nodes(GraphKind::Directed, 3);
        builder.add_edge(0, 1);
        builder.add_edge(0, 2);
        let p = TransitionMatrix::from_graph(&builder.build()).unwrap();
        assert_eq!(p.column(0), vec![0.0, 0.5, 0.5]);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let graph = GraphBuilder::from_weighted_edges(
            GraphKind::Directed,
            3,
            &[(0, 1, 1.0), (1, 2, -0.5)],
        )
        .build();
        let err = TransitionMatrix::from_graph(&graph).unwrap_err();
        assert!(matches!(
            err,
            PageRankError::InvalidWeight {
                from: 1,
                to: 2,
                weight
            } if weight == -0.5
        ));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let graph =
            GraphBuilder::from_weighted_edges(GraphKind::Directed, 2, &[(0, 1, f64::NAN)]).build();
        let err = TransitionMatrix::from_graph(&graph).unwrap_err();
        assert_eq!(err.code(), "invalid_weight");
    }

    #[test]
    fn test_zero_weight_arcs_make_a_sink() {
        let graph =
            GraphBuilder::from_weighted_edges(GraphKind::Directed, 3, &[(0, 1, 0.0)]).build();
        let p = TransitionMatrix::from_graph(&graph).unwrap();
        assert_eq!(p.sinks(), vec![0, 1, 2]);
        assert_eq!(p.column(0), vec![0.0, 0.5, 0.5]);
    }

    #[test]
    fn test_empty_graph_rejected() {
        let graph = GraphBuilder::directed().build();
        let err = TransitionMatrix::from_graph(&graph).unwrap_err();
        assert!(matches!(err, PageRankError::EmptyGraph));
    }

    #[test]
    fn test_single_node_keeps_its_mass() {
        let graph = GraphBuilder::with_nodes(GraphKind::Directed, 1).build();
        let p = TransitionMatrix::from_graph(&graph).unwrap();
        assert_eq!(p.column(0), vec![1.0]);

        let mut out = vec![0.0];
        p.multiply_into(&[1.0], &mut out);
        assert_eq!(out, vec![1.0]);
    }

    #[test]
    fn test_multiply_matches_dense_product() {
        let graph = GraphBuilder::from_weighted_edges(
            GraphKind::Directed,
            4,
            &[(0, 1, 1.0), (0, 2, 2.0), (1, 1, 4.0), (2, 0, 1.0)],
        )
        .build();
        let p = TransitionMatrix::from_graph(&graph).unwrap();
        let x = [0.1, 0.2, 0.3, 0.4];

        let mut out = vec![0.0; 4];
        p.multiply_into(&x, &mut out);

        for i in 0..4u32 {
            let dense: f64 = (0..4u32).map(|j| p.entry(i, j) * x[j as usize]).sum();
            assert!((out[i as usize] - dense).abs() < 1e-12, "row {i}");
        }
        // P is column-stochastic, so mass is conserved
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_undirected_star_is_symmetric_walk() {
        let graph = GraphBuilder::from_edges(
            GraphKind::Undirected,
            5,
            &[(0, 1), (0, 2), (0, 3), (0, 4)],
        )
        .build();
        let p = TransitionMatrix::from_graph(&graph).unwrap();

        assert_eq!(p.column(0), vec![0.0, 0.25, 0.25, 0.25, 0.25]);
        assert_eq!(p.column(3), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(p.sinks().is_empty());
    }

    /// Reports three nodes but points every arc past the last one.
    struct OutOfRange;

    impl GraphSource for OutOfRange {
        fn node_count(&self) -> usize {
            3
        }

        fn out_arcs(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
            std::iter::once(((node + 1) * 2, 1.0))
        }

        fn in_arcs(&self, _node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
            std::iter::empty()
        }

        fn is_weighted(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_out_of_range_arc_rejected() {
        // Node 0 yields 0 -> 2, which is fine; node 1 yields 1 -> 4
        let err = TransitionMatrix::from_graph(&OutOfRange).unwrap_err();
        assert!(matches!(
            err,
            PageRankError::InvalidArc {
                from: 1,
                to: 4,
                nodes: 3
            }
        ));
        assert_eq!(err.code(), "invalid_arc");
    }

    /// Weighted graph above the parallel threshold with both kinds of sink:
    /// every tenth node has no arcs, every tenth offset by 5 only a self-loop.
    fn large_graph_with_sinks(n: u32) -> TransitionMatrix {
        let mut arcs = Vec::new();
        for i in 0..n {
            match i % 10 {
                0 => {}
                5 => arcs.push((i, i, 1.0)),
                _ => {
                    arcs.push((i, (i + 1) % n, 1.0));
                    arcs.push((i, (i * 7 + 3) % n, 1.0 + (i % 5) as f64));
                }
            }
        }
        let graph = GraphBuilder::from_weighted_edges(GraphKind::Directed, n as usize, &arcs).build();
        TransitionMatrix::from_graph(&graph).unwrap()
    }

    #[test]
    fn test_parallel_product_is_bit_identical_to_serial() {
        let n = PARALLEL_THRESHOLD as u32 + 904;
        let p = large_graph_with_sinks(n);
        assert!(p.is_sink(10) && p.is_sink(15));
        assert_eq!(p.column(10)[10], 0.0);
        assert!(p.column(15)[15] > 0.0);

        let weights: Vec<f64> = (0..n).map(|i| (i % 13 + 1) as f64).collect();
        let total: f64 = weights.iter().sum();
        let x: Vec<f64> = weights.iter().map(|w| w / total).collect();

        let mut parallel = vec![0.0; n as usize];
        let mut serial = vec![0.0; n as usize];
        p.multiply_into(&x, &mut parallel);
        p.multiply_with(&x, &mut serial, false);
        assert_eq!(parallel, serial);

        // Spot-check rows of every kind against the dense definition
        for i in [0u32, 1, 5, 10, 15, 17, n - 1] {
            let dense: f64 = (0..n).map(|j| p.entry(i, j) * x[j as usize]).sum();
            assert!((parallel[i as usize] - dense).abs() < 1e-12, "row {i}");
        }
        assert!((parallel.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
