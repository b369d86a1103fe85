//! Error and warning types.
//!
//! Fatal conditions are [`PageRankError`] values propagated with `?`.
//! Non-convergence is not fatal: solvers attach a [`RankWarning`] to the
//! [`PageRankResult`](crate::pagerank::PageRankResult) and keep going.

use serde::Serialize;
use thiserror::Error;

use crate::types::Method;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, PageRankError>;

/// Fatal errors. Any of these aborts the computation before (or instead of)
/// iterating.
#[derive(Debug, Error)]
pub enum PageRankError {
    /// An adjacency entry is negative or not finite.
    #[error("invalid weight {weight} on arc {from} -> {to}: weights must be finite and non-negative")]
    InvalidWeight { from: u32, to: u32, weight: f64 },

    /// An arc points at a node id outside `0..nodes`.
    #[error("arc {from} -> {to} leaves the graph: node ids must be below {nodes}")]
    InvalidArc { from: u32, to: u32, nodes: usize },

    /// The graph has no nodes.
    #[error("cannot rank an empty graph")]
    EmptyGraph,

    /// The method name is not one of the recognized strategies.
    #[error("unknown method '{0}' (expected one of: classical, iterative, adaptive)")]
    UnknownMethod(String),

    /// A configuration value is out of range.
    #[error("invalid config field '{field}': {message}")]
    InvalidConfig { field: &'static str, message: String },

    /// The JSON configuration could not be parsed.
    #[error("malformed config: {0}")]
    Config(#[from] serde_json::Error),

    /// Raised by [`PageRankResult::require_converged`](crate::pagerank::PageRankResult::require_converged)
    /// for callers that treat an exhausted budget as fatal.
    #[error("{method} did not converge after {iterations} iterations (delta {delta:e})")]
    NotConverged {
        method: Method,
        iterations: usize,
        delta: f64,
    },
}

impl PageRankError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidWeight { .. } => "invalid_weight",
            Self::InvalidArc { .. } => "invalid_arc",
            Self::EmptyGraph => "empty_graph",
            Self::UnknownMethod(_) => "unknown_method",
            Self::InvalidConfig { .. } => "invalid_config",
            Self::Config(_) => "malformed_config",
            Self::NotConverged { .. } => "not_converged",
        }
    }

    pub(crate) fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}

/// Non-fatal conditions observed while solving.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RankWarning {
    /// The iteration budget ran out before the convergence test passed.
    /// The returned vector is the last iterate.
    #[error("max iterations exceeded: stopped after {iterations} iterations with delta {delta:e}")]
    MaxIterationsExceeded { iterations: usize, delta: f64 },

    /// The iterative-regularization schedule was asked for a damping factor
    /// outside `(0, 0.5)`, where its decay exponent is at least 1 and
    /// periodic components of the walk are no longer guaranteed to vanish.
    #[error("damping {damping} is outside (0, 0.5); the regularization schedule may not converge")]
    UnguaranteedSchedule { damping: f64 },
}

impl RankWarning {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MaxIterationsExceeded { .. } => "max_iterations_exceeded",
            Self::UnguaranteedSchedule { .. } => "unguaranteed_schedule",
        }
    }
}
