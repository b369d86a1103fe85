//! Classical PageRank
//!
//! Power iteration with a constant damping factor and a constant L1
//! threshold, followed by a final re-normalization.

use super::power::PowerIteration;
use super::transition::TransitionMatrix;
use super::{PageRankResult, RankSolver};
use crate::errors::RankWarning;
use crate::observer::{IterationReport, RankObserver};
use crate::types::{Method, PageRankConfig};

/// Classical PageRank implementation
#[derive(Debug, Clone)]
pub struct ClassicalPageRank {
    /// Damping factor (typically 0.85)
    pub damping: f64,
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Convergence threshold
    pub tolerance: f64,
}

impl Default for ClassicalPageRank {
    fn default() -> Self {
        Self::from_config(&PageRankConfig::default())
    }
}

impl ClassicalPageRank {
    /// Create a new ClassicalPageRank with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PageRankConfig) -> Self {
        Self {
            damping: config.damping,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
        }
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the maximum iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence threshold
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl RankSolver for ClassicalPageRank {
    fn method(&self) -> Method {
        Method::Classical
    }

    /// Run PageRank on a transition model
    ///
    /// Returns the result even if convergence wasn't achieved, with
    /// `converged=false` and a [`RankWarning::MaxIterationsExceeded`].
    fn rank(&self, matrix: &TransitionMatrix, observer: &mut dyn RankObserver) -> PageRankResult {
        trace_solve!(Method::Classical, matrix.num_nodes());
        observer.on_start(Method::Classical, matrix.num_nodes());

        let mut power = PowerIteration::new(matrix);
        let mut iterations = 0;
        let mut delta = f64::MAX;

        while iterations < self.max_iterations && delta >= self.tolerance {
            iterations += 1;
            delta = power.step(self.damping);
            observer.on_iteration(&IterationReport {
                iteration: iterations,
                alpha: self.damping,
                epsilon: self.tolerance,
                delta,
            });
        }

        // Normalize scores (they should already sum to ~1, but ensure numerical stability)
        power.normalize();

        let converged = delta < self.tolerance;
        let mut result = PageRankResult::new(
            power.into_scores(),
            iterations,
            delta,
            converged,
            Method::Classical,
        );
        if !converged {
            result.warn(
                RankWarning::MaxIterationsExceeded { iterations, delta },
                observer,
            );
        }
        observer.on_finish(&result);
        result
    }
}
