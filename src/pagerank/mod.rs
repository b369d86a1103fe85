//! PageRank algorithms
//!
//! This module provides the transition model, the shared power-iteration
//! step, and three solver strategies that differ only in how the damping
//! coefficient and the convergence threshold evolve:
//!
//! | Strategy | damping `αₖ` | threshold `εₖ` |
//! |----------|--------------|----------------|
//! | [`ClassicalPageRank`] | `d` | `tol` |
//! | [`IterativeRegularization`] | `1 − (k+2)^−p`, `p = log2(1/(1−d))` | `tol` |
//! | [`AdaptiveRegularization`] | `1 − t`, `t` halved per round from `1 − d` | `t` |

// ---------------------------------------------------------------------------
// Conditional tracing support
// ---------------------------------------------------------------------------

/// Enter a tracing span for one solve (when the `tracing` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_solve {
    ($method:expr, $nodes:expr) => {
        #[cfg(feature = "tracing")]
        let _span =
            tracing::info_span!("pagerank_solve", method = %$method, nodes = $nodes).entered();
    };
}

macro_rules! trace_debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)+);
    };
}

pub mod adaptive;
pub mod classical;
pub mod iterative;
pub mod power;
pub mod transition;

pub use adaptive::AdaptiveRegularization;
pub use classical::ClassicalPageRank;
pub use iterative::IterativeRegularization;
pub use transition::TransitionMatrix;

use serde::Serialize;

use crate::errors::{PageRankError, RankWarning, Result};
use crate::observer::RankObserver;
use crate::types::{Method, PageRankConfig};

/// Result of a PageRank computation
#[derive(Debug, Clone, Serialize)]
pub struct PageRankResult {
    /// Scores for each node (indexed by node ID)
    pub scores: Vec<f64>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Final convergence delta
    pub delta: f64,
    /// Whether the algorithm converged
    pub converged: bool,
    /// Strategy that produced the scores
    pub method: Method,
    /// Non-fatal conditions raised while solving
    pub warnings: Vec<RankWarning>,
}

impl PageRankResult {
    /// Create a new PageRank result
    pub fn new(
        scores: Vec<f64>,
        iterations: usize,
        delta: f64,
        converged: bool,
        method: Method,
    ) -> Self {
        Self {
            scores,
            iterations,
            delta,
            converged,
            method,
            warnings: Vec::new(),
        }
    }

    /// Get top N nodes by score
    ///
    /// Ties are broken by ascending node ID.
    pub fn top_n(&self, n: usize) -> Vec<(u32, f64)> {
        let mut indexed: Vec<_> = self
            .scores
            .iter()
            .enumerate()
            .map(|(i, &s)| (i as u32, s))
            .collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        indexed.truncate(n);
        indexed
    }

    /// Get the score for a specific node
    pub fn score(&self, node: u32) -> f64 {
        self.scores.get(node as usize).copied().unwrap_or(0.0)
    }

    /// Node with the highest score
    pub fn argmax(&self) -> Option<u32> {
        self.top_n(1).first().map(|&(node, _)| node)
    }

    /// Sum of all scores
    pub fn total(&self) -> f64 {
        self.scores.iter().sum()
    }

    /// Whether the budget ran out before convergence
    pub fn max_iterations_exceeded(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, RankWarning::MaxIterationsExceeded { .. }))
    }

    /// Turn an exhausted budget into [`PageRankError::NotConverged`].
    pub fn require_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(PageRankError::NotConverged {
                method: self.method,
                iterations: self.iterations,
                delta: self.delta,
            })
        }
    }

    /// Record a warning, log it and forward it to the observer.
    pub(crate) fn warn(&mut self, warning: RankWarning, observer: &mut dyn RankObserver) {
        #[cfg(feature = "tracing")]
        tracing::warn!(code = warning.code(), method = %self.method, "{}", warning);
        observer.on_warning(&warning);
        self.warnings.push(warning);
    }
}

/// A strategy that turns a transition model into a rank vector.
pub trait RankSolver {
    /// Which [`Method`] this solver implements.
    fn method(&self) -> Method;

    /// Run to convergence or until the iteration budget is spent.
    ///
    /// Never fails: non-convergence is reported through
    /// [`PageRankResult::warnings`].
    fn rank(&self, matrix: &TransitionMatrix, observer: &mut dyn RankObserver) -> PageRankResult;
}

/// The three strategies as one tagged value, selected from a config.
#[derive(Debug, Clone)]
pub enum Solver {
    Classical(ClassicalPageRank),
    Iterative(IterativeRegularization),
    Adaptive(AdaptiveRegularization),
}

impl Solver {
    pub fn from_config(config: &PageRankConfig) -> Self {
        match config.method {
            Method::Classical => Self::Classical(ClassicalPageRank::from_config(config)),
            Method::Iterative => Self::Iterative(IterativeRegularization::from_config(config)),
            Method::Adaptive => Self::Adaptive(AdaptiveRegularization::from_config(config)),
        }
    }
}

impl RankSolver for Solver {
    fn method(&self) -> Method {
        match self {
            Self::Classical(s) => s.method(),
            Self::Iterative(s) => s.method(),
            Self::Adaptive(s) => s.method(),
        }
    }

    fn rank(&self, matrix: &TransitionMatrix, observer: &mut dyn RankObserver) -> PageRankResult {
        match self {
            Self::Classical(s) => s.rank(matrix, observer),
            Self::Iterative(s) => s.rank(matrix, observer),
            Self::Adaptive(s) => s.rank(matrix, observer),
        }
    }
}
