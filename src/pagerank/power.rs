//! Shared power-iteration step.
//!
//! Every strategy repeats `x ← α · P · x + (1 − α) / N` and measures the L1
//! distance between successive vectors; only the choice of `α` and of the
//! threshold differs.

use super::transition::TransitionMatrix;

/// Rank vector plus scratch buffer, advanced one step at a time.
#[derive(Debug)]
pub struct PowerIteration<'a> {
    matrix: &'a TransitionMatrix,
    scores: Vec<f64>,
    next: Vec<f64>,
}

impl<'a> PowerIteration<'a> {
    /// Start from the uniform vector `1/N`.
    pub fn new(matrix: &'a TransitionMatrix) -> Self {
        let n = matrix.num_nodes();
        Self {
            matrix,
            scores: vec![1.0 / n as f64; n],
            next: vec![0.0; n],
        }
    }

    /// Apply one damped step and return `‖x_new − x_old‖₁`.
    pub fn step(&mut self, alpha: f64) -> f64 {
        self.matrix.multiply_into(&self.scores, &mut self.next);

        let teleport = (1.0 - alpha) / self.scores.len() as f64;
        for value in &mut self.next {
            *value = alpha * *value + teleport;
        }

        let delta = l1_distance(&self.scores, &self.next);
        std::mem::swap(&mut self.scores, &mut self.next);
        delta
    }

    /// Current vector
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Rescale so the entries sum to exactly 1 (up to rounding).
    pub fn normalize(&mut self) {
        let sum: f64 = self.scores.iter().sum();
        if sum > 0.0 {
            for score in &mut self.scores {
                *score /= sum;
            }
        }
    }

    pub fn into_scores(self) -> Vec<f64> {
        self.scores
    }
}

/// Sum of absolute differences.
pub fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}
