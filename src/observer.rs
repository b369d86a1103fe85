//! Solver observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at iteration boundaries without coupling
//! to solver logic. Use cases include plotting convergence curves, asserting
//! on schedules in tests, and emitting structured telemetry. Pass
//! [`NoopObserver`] for zero-overhead execution.

use serde::Serialize;

use crate::errors::RankWarning;
use crate::pagerank::PageRankResult;
use crate::types::Method;

/// State after one power-iteration step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationReport {
    /// 1-based global iteration count.
    pub iteration: usize,
    /// Damping used for this step.
    pub alpha: f64,
    /// Threshold the step was tested against.
    pub epsilon: f64,
    /// L1 distance between the previous and the new vector.
    pub delta: f64,
}

/// Callbacks invoked by every solver. All methods default to no-ops.
pub trait RankObserver {
    /// Called once before the first iteration.
    fn on_start(&mut self, _method: Method, _num_nodes: usize) {}

    /// Called after every matrix-vector step.
    fn on_iteration(&mut self, _report: &IterationReport) {}

    /// Called when the adaptive schedule moves to a tighter tolerance.
    fn on_tighten(&mut self, _from: f64, _to: f64, _iteration: usize) {}

    /// Called for every non-fatal condition attached to the result.
    fn on_warning(&mut self, _warning: &RankWarning) {}

    /// Called once with the final result.
    fn on_finish(&mut self, _result: &PageRankResult) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RankObserver for NoopObserver {}

/// Adaptive-schedule transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tightening {
    pub from: f64,
    pub to: f64,
    /// Global iteration count when the transition happened.
    pub iteration: usize,
}

/// Observer that keeps a full diagnostics record of a solve.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryObserver {
    pub method: Option<Method>,
    pub iterations: Vec<IterationReport>,
    pub tightenings: Vec<Tightening>,
    pub warnings: Vec<RankWarning>,
    pub finished: bool,
}

impl HistoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Damping values in the order they were applied.
    pub fn alphas(&self) -> Vec<f64> {
        self.iterations.iter().map(|r| r.alpha).collect()
    }

    /// Deltas in the order they were measured.
    pub fn deltas(&self) -> Vec<f64> {
        self.iterations.iter().map(|r| r.delta).collect()
    }
}

impl RankObserver for HistoryObserver {
    fn on_start(&mut self, method: Method, _num_nodes: usize) {
        self.method = Some(method);
    }

    fn on_iteration(&mut self, report: &IterationReport) {
        self.iterations.push(*report);
    }

    fn on_tighten(&mut self, from: f64, to: f64, iteration: usize) {
        self.tightenings.push(Tightening {
            from,
            to,
            iteration,
        });
    }

    fn on_warning(&mut self, warning: &RankWarning) {
        self.warnings.push(*warning);
    }

    fn on_finish(&mut self, _result: &PageRankResult) {
        self.finished = true;
    }
}
