//! # rapid-pagerank
//!
//! Node importance over directed, optionally weighted graphs using a damped
//! random walk. A graph is turned into a column-stochastic
//! [`TransitionMatrix`] (sinks reconnected uniformly, weights validated) and
//! one of three power-iteration schedules drives a uniform start vector to
//! the dominant eigenvector:
//!
//! - [`Method::Classical`]: constant damping `d`;
//! - [`Method::Iterative`]: damping raised toward 1 on a fixed schedule;
//! - [`Method::Adaptive`]: damping and tolerance tightened in rounds.
//!
//! ```
//! use rapid_pagerank::graph::builder::GraphBuilder;
//! use rapid_pagerank::graph::GraphKind;
//! use rapid_pagerank::{compute_pagerank, PageRankConfig};
//!
//! let graph = GraphBuilder::from_edges(
//!     GraphKind::Undirected,
//!     5,
//!     &[(0, 1), (0, 2), (0, 3), (0, 4)],
//! )
//! .build();
//!
//! let config = PageRankConfig::new().with_tolerance(1e-10).with_max_iterations(1000);
//! let result = compute_pagerank(&config, &graph).unwrap();
//! assert!((result.scores[0] - 0.4757).abs() < 1e-3);
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): one span per solve plus `warn` events for every
//!   [`RankWarning`].

pub mod errors;
pub mod graph;
pub mod observer;
pub mod pagerank;
pub mod types;

pub use errors::{PageRankError, RankWarning, Result};
pub use graph::GraphSource;
pub use observer::{HistoryObserver, NoopObserver, RankObserver};
pub use pagerank::{PageRankResult, RankSolver, Solver, TransitionMatrix};
pub use types::{Method, PageRankConfig};

/// Rank every node of `graph`.
///
/// Validation failures (config out of range, empty graph, negative weights)
/// abort before any iteration. Running out of iterations does not: the last
/// vector is returned with [`PageRankResult::converged`] unset and a
/// [`RankWarning::MaxIterationsExceeded`] attached.
pub fn compute_pagerank(config: &PageRankConfig, graph: &impl GraphSource) -> Result<PageRankResult> {
    compute_pagerank_with_observer(config, graph, &mut NoopObserver)
}

/// [`compute_pagerank`] with per-iteration callbacks.
pub fn compute_pagerank_with_observer(
    config: &PageRankConfig,
    graph: &impl GraphSource,
    observer: &mut dyn RankObserver,
) -> Result<PageRankResult> {
    config.validate()?;
    let matrix = TransitionMatrix::from_graph(graph)?;
    Ok(Solver::from_config(config).rank(&matrix, observer))
}

/// [`compute_pagerank`] with the config given as JSON.
///
/// See [`PageRankConfig::from_json`] for the accepted shape.
pub fn compute_pagerank_from_json(json: &str, graph: &impl GraphSource) -> Result<PageRankResult> {
    let config = PageRankConfig::from_json(json)?;
    compute_pagerank(&config, graph)
}
