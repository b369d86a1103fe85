//! Adaptive regularization
//!
//! Instead of a fixed damping schedule, the solver keeps a current level `t`
//! (initially `1 − d`) and iterates at damping `α = 1 − t` until successive
//! vectors are closer than `t`. It then halves `t`, tightening damping and
//! precision together, until `t` reaches the requested tolerance and one more
//! round converges at that level.
//!
//! Every step of every round counts against one shared iteration budget. When
//! the budget runs out mid-round the current vector is returned as-is.

use super::power::PowerIteration;
use super::transition::TransitionMatrix;
use super::{PageRankResult, RankSolver};
use crate::errors::RankWarning;
use crate::observer::{IterationReport, RankObserver};
use crate::types::{Method, PageRankConfig};

#[derive(Debug, Clone)]
pub struct AdaptiveRegularization {
    /// Damping of the first round is this value
    pub damping: f64,
    /// Shared budget across all rounds
    pub max_iterations: usize,
    /// Final tolerance, and the floor of the schedule
    pub tolerance: f64,
}

impl Default for AdaptiveRegularization {
    fn default() -> Self {
        Self::from_config(&PageRankConfig::default())
    }
}

impl AdaptiveRegularization {
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

    /// Tolerance of the first round
    pub fn initial_level(&self) -> f64 {
        (1.0 - self.damping).max(self.tolerance)
    }

    /// The sequence of levels the schedule walks through, ending at the
    /// requested tolerance.
    pub fn levels(&self) -> Vec<f64> {
        let mut levels = vec![self.initial_level()];
        let mut level = levels[0];
        while level > self.tolerance {
            level = self.tighten(level);
            levels.push(level);
        }
        levels
    }

    fn tighten(&self, level: f64) -> f64 {
        (level / 2.0).max(self.tolerance)
    }
}

impl RankSolver for AdaptiveRegularization {
    fn method(&self) -> Method {
        Method::Adaptive
    }

    fn rank(&self, matrix: &TransitionMatrix, observer: &mut dyn RankObserver) -> PageRankResult {
        trace_solve!(Method::Adaptive, matrix.num_nodes());
        observer.on_start(Method::Adaptive, matrix.num_nodes());

        let mut power = PowerIteration::new(matrix);
        let mut level = self.initial_level();
        let mut iterations = 0;
        let mut delta = f64::MAX;
        let mut converged = false;

        'rounds: loop {
            let alpha = 1.0 - level;

            // Relaxed round at the current level
            loop {
                if iterations >= self.max_iterations {
                    break 'rounds;
                }
                iterations += 1;
                delta = power.step(alpha);
                observer.on_iteration(&IterationReport {
                    iteration: iterations,
                    alpha,
                    epsilon: level,
                    delta,
                });
                if delta < level {
                    break;
                }
            }

            if level <= self.tolerance && delta <= self.tolerance {
                converged = true;
                break;
            }

            let next = self.tighten(level);
            trace_debug!(from = level, to = next, iteration = iterations, "tightening tolerance");
            observer.on_tighten(level, next, iterations);
            level = next;
        }

        let mut result = PageRankResult::new(
            power.into_scores(),
            iterations,
            delta,
            converged,
            Method::Adaptive,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use crate::graph::GraphKind;
    use crate::observer::{HistoryObserver, NoopObserver};

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
    fn test_levels_halve_down_to_tolerance() {
        let solver = AdaptiveRegularization::new()
            .with_damping(0.75)
            .with_tolerance(0.05);
        assert_eq!(solver.levels(), vec![0.25, 0.125, 0.0625, 0.05]);
    }

    #[test]
    fn test_initial_level_clamped_to_tolerance() {
        let solver = AdaptiveRegularization::new()
            .with_damping(0.99)
            .with_tolerance(0.1);
        assert_eq!(solver.initial_level(), 0.1);
        assert_eq!(solver.levels(), vec![0.1]);
    }

    #[test]
    fn test_converges_to_stationary_distribution() {
        let solver = AdaptiveRegularization::new()
            .with_damping(0.85)
            .with_tolerance(1e-10)
            .with_max_iterations(1000);
        let result = solver.rank(&triangle_with_chord(), &mut NoopObserver);

        assert!(result.converged);
        assert!(result.warnings.is_empty());
        assert!((result.scores[0] - 0.4).abs() < 1e-8);
        assert!((result.scores[1] - 0.2).abs() < 1e-8);
        assert!((result.scores[2] - 0.4).abs() < 1e-8);
    }

    #[test]
    fn test_observer_sees_tightening_rounds() {
        let mut history = HistoryObserver::new();
        let solver = AdaptiveRegularization::new()
            .with_damping(0.85)
            .with_tolerance(1e-6)
            .with_max_iterations(1000);
        let result = solver.rank(&triangle_with_chord(), &mut history);

        assert!(result.converged);
        let levels = solver.levels();
        assert_eq!(history.tightenings.len(), levels.len() - 1);
        for (t, pair) in history.tightenings.iter().zip(levels.windows(2)) {
            assert_eq!(t.from, pair[0]);
            assert_eq!(t.to, pair[1]);
        }
        // Damping only ever increases
        assert!(history.alphas().windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(history.iterations.len(), result.iterations);
    }

    #[test]
    fn test_budget_exhausted_mid_round_returns_partial() {
        let mut history = HistoryObserver::new();
        let solver = AdaptiveRegularization::new()
            .with_damping(0.85)
            .with_tolerance(1e-10)
            .with_max_iterations(3);
        let result = solver.rank(&triangle_with_chord(), &mut history);

        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
        assert!(result.max_iterations_exceeded());
        assert_eq!(history.warnings.len(), 1);
        assert_eq!(result.scores.len(), 3);
        assert!((result.total() - 1.0).abs() < 1e-12);
    }
}
