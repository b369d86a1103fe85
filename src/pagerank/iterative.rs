//! Iterative regularization (Polyak & Timonina, 2011)
//!
//! Starts with weak damping, where the walk mixes fast and the answer is
//! coarse, and raises it on the schedule
//!
//! ```text
//! αₖ = 1 − 1 / (k + 2)^p,    p = log2(1 / (1 − d)),    k = 1, 2, …
//! ```
//!
//! The convergence threshold stays at `tol` throughout. For `d < 0.5` the
//! exponent `p` is below 1, `∏ αₖ` tends to 0 and the walk's periodic
//! components die out. For larger `d` the schedule still runs, but a
//! periodic graph (a bipartite star, say) can keep oscillating until the
//! budget is spent; the result then carries
//! [`RankWarning::UnguaranteedSchedule`].

use super::power::PowerIteration;
use super::transition::TransitionMatrix;
use super::{PageRankResult, RankSolver};
use crate::errors::RankWarning;
use crate::observer::{IterationReport, RankObserver};
use crate::types::{Method, PageRankConfig};

/// Upper end (exclusive) of the damping range with a convergence guarantee.
pub const GUARANTEED_DAMPING_LIMIT: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct IterativeRegularization {
    /// Damping factor that fixes the schedule exponent
    pub damping: f64,
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Convergence threshold
    pub tolerance: f64,
}

impl Default for IterativeRegularization {
    fn default() -> Self {
        Self::from_config(&PageRankConfig::default())
    }
}

impl IterativeRegularization {
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

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Schedule exponent `p = log2(1 / (1 − d))`
    pub fn exponent(&self) -> f64 {
        (1.0 / (1.0 - self.damping)).log2()
    }

    /// Damping used at 1-based iteration `k`
    pub fn alpha(&self, k: usize) -> f64 {
        alpha_at(k, self.exponent())
    }

    /// Whether `d` lies in `(0, 0.5)`
    pub fn is_guaranteed(&self) -> bool {
        self.damping > 0.0 && self.damping < GUARANTEED_DAMPING_LIMIT
    }
}

fn alpha_at(k: usize, exponent: f64) -> f64 {
    1.0 - 1.0 / ((k + 2) as f64).powf(exponent)
}

impl RankSolver for IterativeRegularization {
    fn method(&self) -> Method {
        Method::Iterative
    }

    fn rank(&self, matrix: &TransitionMatrix, observer: &mut dyn RankObserver) -> PageRankResult {
        trace_solve!(Method::Iterative, matrix.num_nodes());
        observer.on_start(Method::Iterative, matrix.num_nodes());

        let exponent = self.exponent();
        let mut power = PowerIteration::new(matrix);
        let mut iterations = 0;
        let mut delta = f64::MAX;
        let mut converged = false;

        for k in 1..=self.max_iterations {
            let alpha = alpha_at(k, exponent);
            delta = power.step(alpha);
            iterations = k;
            observer.on_iteration(&IterationReport {
                iteration: k,
                alpha,
                epsilon: self.tolerance,
                delta,
            });
            if delta < self.tolerance {
                converged = true;
                break;
            }
        }

        let mut result = PageRankResult::new(
            power.into_scores(),
            iterations,
            delta,
            converged,
            Method::Iterative,
        );
        if !self.is_guaranteed() {
            result.warn(
                RankWarning::UnguaranteedSchedule {
                    damping: self.damping,
                },
                observer,
            );
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use crate::graph::GraphKind;
    use crate::observer::{HistoryObserver, NoopObserver};

    fn star() -> TransitionMatrix {
        let graph = GraphBuilder::from_edges(
            GraphKind::Undirected,
            5,
            &[(0, 1), (0, 2), (0, 3), (0, 4)],
        )
        .build();
        TransitionMatrix::from_graph(&graph).unwrap()
    }

    fn triangle_with_chord() -> TransitionMatrix {
        let graph = GraphBuilder::from_edges(
            GraphKind::Directed,
            3,
            &[(0, 1), (1, 2), (2, 0), (0, 2)],
        )
        .build();
        TransitionMatrix::from_graph(&graph).unwrap()
    }

    #[test]
    fn test_schedule_increases_toward_one() {
        let solver = IterativeRegularization::new().with_damping(0.3);
        let alphas: Vec<f64> = (1..50).map(|k| solver.alpha(k)).collect();

        assert!(alphas.windows(2).all(|w| w[0] < w[1]));
        assert!(alphas.iter().all(|&a| a > 0.0 && a < 1.0));
    }

    #[test]
    fn test_exponent() {
        // d = 0.5 gives p = 1; d = 0.75 gives p = 2
        assert!((IterativeRegularization::new().with_damping(0.5).exponent() - 1.0).abs() < 1e-12);
        assert!((IterativeRegularization::new().with_damping(0.75).exponent() - 2.0).abs() < 1e-12);
        let solver = IterativeRegularization::new().with_damping(0.75);
        assert!((solver.alpha(2) - (1.0 - 1.0 / 16.0)).abs() < 1e-12);
    }

    #[test]
    fn test_star_approaches_undamped_distribution() {
        let solver = IterativeRegularization::new()
            .with_damping(0.3)
            .with_tolerance(1e-6)
            .with_max_iterations(100_000);
        let result = solver.rank(&star(), &mut NoopObserver);

        assert!(result.converged, "stopped at delta {}", result.delta);
        assert!(result.warnings.is_empty());
        assert!((result.scores[0] - 0.5).abs() < 0.01);
        assert!((result.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_damping_warns_but_runs() {
        let mut history = HistoryObserver::new();
        let solver = IterativeRegularization::new()
            .with_damping(0.85)
            .with_tolerance(1e-6)
            .with_max_iterations(1000);
        let result = solver.rank(&triangle_with_chord(), &mut history);

        // Aperiodic graph: still converges to the stationary distribution
        assert!(result.converged);
        assert_eq!(
            result.warnings,
            vec![RankWarning::UnguaranteedSchedule { damping: 0.85 }]
        );
        assert_eq!(history.warnings, result.warnings);
        assert!((result.scores[0] - 0.4).abs() < 1e-3);
        assert!((result.scores[1] - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_bipartite_star_with_high_damping_does_not_settle() {
        let solver = IterativeRegularization::new()
            .with_damping(0.85)
            .with_tolerance(1e-10)
            .with_max_iterations(1000);
        let result = solver.rank(&star(), &mut NoopObserver);

        assert!(!result.converged);
        assert_eq!(result.iterations, 1000);
        assert!(result.max_iterations_exceeded());
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_observer_sees_schedule() {
        let mut history = HistoryObserver::new();
        let solver = IterativeRegularization::new()
            .with_damping(0.3)
            .with_max_iterations(5)
            .with_tolerance(1e-12);
        solver.rank(&star(), &mut history);

        let expected: Vec<f64> = (1..=5).map(|k| solver.alpha(k)).collect();
        assert_eq!(history.alphas(), expected);
        assert_eq!(history.iterations[4].iteration, 5);
    }
}
