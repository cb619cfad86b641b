//! Multinomial (softmax) logistic regression.
//!
//! The objective is the mean cross-entropy plus `l2_penalty / (2n) * ||W||²`
//! (bias terms are not penalized). It is minimized with limited-memory BFGS
//! over the full batch and an Armijo backtracking line search; the fit has
//! converged when the largest absolute gradient component drops below
//! `tolerance`.
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::{ClassifierError, Result};
use crate::math::Array2;
use crate::models::classifier_trait::ClassifierModel;

/// Sufficient-decrease constant of the line search.
const ARMIJO_C: f64 = 1e-4;
/// Smallest step tried before the line search gives up.
const MIN_STEP: f64 = 1e-12;
/// Curvature pairs kept by the quasi-Newton update.
const HISTORY_SIZE: usize = 10;

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Converged,
    /// `max_iterations` accepted steps without meeting the tolerance.
    IterationCap,
    /// No step along steepest descent satisfied the sufficient-decrease test.
    LineSearchStalled,
}

/// Outcome of a solver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub iterations: usize,
    pub converged: bool,
    pub stop_reason: StopReason,
    pub final_loss: f64,
    pub final_gradient_norm: f64,
    /// Objective value after each accepted step, starting with the initial value.
    pub loss_history: Vec<f64>,
}

/// Fitted softmax classifier: one weight row and one bias per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Array2<f64>,
    bias: Vec<f64>,
}

impl LogisticRegression {
    /// Fit on `x` (rows are samples) and class codes `y` in `0..n_classes`.
    pub fn fit(
        x: &Array2<f64>,
        y: &[usize],
        n_classes: usize,
        config: &ModelConfig,
    ) -> Result<(Self, FitSummary)> {
        config.validate()?;
        let (n_samples, n_features) = x.shape();
        if n_samples == 0 {
            return Err(ClassifierError::EmptyDataset);
        }
        if y.len() != n_samples {
            return Err(ClassifierError::ShapeMismatch(format!(
                "{} rows but {} labels",
                n_samples,
                y.len()
            )));
        }
        if n_classes < 2 {
            return Err(ClassifierError::SingleClass { found: n_classes });
        }
        if let Some(&code) = y.iter().find(|&&code| code >= n_classes) {
            return Err(ClassifierError::ShapeMismatch(format!(
                "label code {} outside 0..{}",
                code, n_classes
            )));
        }

        let problem = Problem {
            x,
            y,
            n_classes,
            l2_penalty: config.l2_penalty,
        };

        let mut params = vec![0.0f64; n_classes * (n_features + 1)];
        let (mut loss, mut grad) = problem.objective(&params);
        let mut grad_norm = max_abs(&grad);
        let mut loss_history = vec![loss];
        let mut memory = CurvatureMemory::new(HISTORY_SIZE);
        let mut iterations = 0;
        let mut converged = grad_norm < config.tolerance;
        let mut stalled = false;

        log::debug!(
            "Fitting softmax regression: {} samples, {} features, {} classes",
            n_samples,
            n_features,
            n_classes
        );

        while !converged && iterations < config.max_iterations {
            let mut direction = memory.direction(&grad);
            let mut slope = dot(&grad, &direction);
            if slope >= 0.0 {
                memory.clear();
                direction = grad.iter().map(|g| -g).collect();
                slope = -dot(&grad, &grad);
            }

            let mut step = if memory.is_empty() {
                config.initial_step
            } else {
                1.0
            };
            let mut accepted = None;
            while step >= MIN_STEP {
                let candidate: Vec<f64> = params
                    .iter()
                    .zip(&direction)
                    .map(|(p, d)| p + step * d)
                    .collect();
                let (candidate_loss, candidate_grad) = problem.objective(&candidate);
                if candidate_loss.is_finite() && candidate_loss <= loss + ARMIJO_C * step * slope {
                    accepted = Some((candidate, candidate_loss, candidate_grad));
                    break;
                }
                step *= 0.5;
            }

            let Some((candidate, candidate_loss, candidate_grad)) = accepted else {
                if !memory.is_empty() {
                    log::debug!("Line search failed along the quasi-Newton direction; restarting");
                    memory.clear();
                    continue;
                }
                stalled = true;
                break;
            };

            memory.push(&params, &candidate, &grad, &candidate_grad);
            params = candidate;
            loss = candidate_loss;
            grad = candidate_grad;
            grad_norm = max_abs(&grad);
            loss_history.push(loss);
            iterations += 1;
            converged = grad_norm < config.tolerance;

            log::trace!(
                "iter {:>4}: loss {:.6}, |grad|max {:.3e}, step {:.3e}",
                iterations,
                loss,
                grad_norm,
                step
            );
        }

        let stop_reason = if converged {
            StopReason::Converged
        } else if stalled {
            StopReason::LineSearchStalled
        } else {
            StopReason::IterationCap
        };
        match stop_reason {
            StopReason::Converged => log::info!(
                "Softmax regression converged after {} iterations (loss {:.4})",
                iterations,
                loss
            ),
            StopReason::IterationCap => log::warn!(
                "Softmax regression did not converge within {} iterations \
                 (gradient norm {:.3e} > tolerance {:.1e}); consider raising max_iterations",
                config.max_iterations,
                grad_norm,
                config.tolerance
            ),
            StopReason::LineSearchStalled => log::warn!(
                "Softmax regression stopped after {} iterations: the line search found no \
                 decreasing step (gradient norm {:.3e} > tolerance {:.1e})",
                iterations,
                grad_norm,
                config.tolerance
            ),
        }

        let model = LogisticRegression::from_flat(&params, n_classes, n_features)?;
        let summary = FitSummary {
            iterations,
            converged,
            stop_reason,
            final_loss: loss,
            final_gradient_norm: grad_norm,
            loss_history,
        };
        Ok((model, summary))
    }

    fn from_flat(params: &[f64], n_classes: usize, n_features: usize) -> Result<Self> {
        let stride = n_features + 1;
        let mut weights = Vec::with_capacity(n_classes * n_features);
        let mut bias = Vec::with_capacity(n_classes);
        for k in 0..n_classes {
            let block = &params[k * stride..(k + 1) * stride];
            weights.extend_from_slice(&block[..n_features]);
            bias.push(block[n_features]);
        }
        Ok(LogisticRegression {
            weights: Array2::from_shape_vec((n_classes, n_features), weights)?,
            bias,
        })
    }

    /// `n_classes × n_features` weight matrix.
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    /// Raw linear scores `x · Wᵀ + b`, one row per sample.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(ClassifierError::ShapeMismatch(format!(
                "model expects {} features, got {}",
                self.n_features(),
                x.ncols()
            )));
        }
        let n_classes = self.n_classes();
        let mut scores = Array2::zeros(x.nrows(), n_classes);
        for (i, row) in x.rows().enumerate() {
            for k in 0..n_classes {
                scores[(i, k)] = linear_score(self.weights.row_slice(k), self.bias[k], row);
            }
        }
        Ok(scores)
    }
}

impl ClassifierModel for LogisticRegression {
    fn n_classes(&self) -> usize {
        self.bias.len()
    }

    fn n_features(&self) -> usize {
        self.weights.ncols()
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut scores = self.decision_function(x)?;
        for i in 0..scores.nrows() {
            softmax_in_place(scores.row_slice_mut(i));
        }
        Ok(scores)
    }

    fn name(&self) -> &str {
        "softmax_regression"
    }
}

/// Training data bound to the objective.
struct Problem<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    n_classes: usize,
    l2_penalty: f64,
}

impl Problem<'_> {
    /// Objective value and gradient at `params`, laid out per class as
    /// `[w_0 .. w_{d-1}, b]`.
    fn objective(&self, params: &[f64]) -> (f64, Vec<f64>) {
        let n_features = self.x.ncols();
        let stride = n_features + 1;
        let n = self.x.nrows() as f64;

        let mut loss = 0.0;
        let mut grad = vec![0.0f64; params.len()];
        let mut scores = vec![0.0f64; self.n_classes];

        for (row, &label) in self.x.rows().zip(self.y) {
            for (k, score) in scores.iter_mut().enumerate() {
                let block = &params[k * stride..(k + 1) * stride];
                *score = linear_score(&block[..n_features], block[n_features], row);
            }
            let lse = log_sum_exp(&scores);
            loss += lse - scores[label];

            for (k, &score) in scores.iter().enumerate() {
                let p = (score - lse).exp();
                let residual = if k == label { p - 1.0 } else { p };
                let block = &mut grad[k * stride..(k + 1) * stride];
                for (g, v) in block[..n_features].iter_mut().zip(row) {
                    *g += residual * v;
                }
                block[n_features] += residual;
            }
        }

        let mut penalty = 0.0;
        for k in 0..self.n_classes {
            for j in 0..n_features {
                let w = params[k * stride + j];
                penalty += w * w;
                grad[k * stride + j] += self.l2_penalty * w;
            }
        }

        loss = (loss + 0.5 * self.l2_penalty * penalty) / n;
        for g in grad.iter_mut() {
            *g /= n;
        }
        (loss, grad)
    }
}

fn linear_score(weights: &[f64], bias: f64, row: &[f64]) -> f64 {
    weights.iter().zip(row).map(|(w, v)| w * v).sum::<f64>() + bias
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

fn softmax_in_place(values: &mut [f64]) {
    let lse = log_sum_exp(values);
    for v in values.iter_mut() {
        *v = (*v - lse).exp();
    }
}

/// Recent `(s, y)` pairs of an L-BFGS run, newest last.
struct CurvatureMemory {
    pairs: VecDeque<(Vec<f64>, Vec<f64>, f64)>,
    capacity: usize,
}

impl CurvatureMemory {
    fn new(capacity: usize) -> Self {
        Self {
            pairs: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Record a step; pairs without positive curvature are skipped.
    fn push(&mut self, old: &[f64], new: &[f64], old_grad: &[f64], new_grad: &[f64]) {
        let s: Vec<f64> = new.iter().zip(old).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = new_grad.iter().zip(old_grad).map(|(a, b)| a - b).collect();
        let sy = dot(&s, &y);
        if sy <= 1e-12 {
            return;
        }
        if self.pairs.len() == self.capacity {
            self.pairs.pop_front();
        }
        self.pairs.push_back((s, y, 1.0 / sy));
    }

    /// Two-loop recursion: approximate `-H⁻¹ · grad`.
    fn direction(&self, grad: &[f64]) -> Vec<f64> {
        let mut q = grad.to_vec();
        let mut alphas = Vec::with_capacity(self.pairs.len());
        for (s, y, rho) in self.pairs.iter().rev() {
            let alpha = rho * dot(s, &q);
            for (qi, yi) in q.iter_mut().zip(y) {
                *qi -= alpha * yi;
            }
            alphas.push(alpha);
        }

        let gamma = match self.pairs.back() {
            Some((s, y, _)) => dot(s, y) / dot(y, y),
            None => 1.0,
        };
        for qi in q.iter_mut() {
            *qi *= gamma;
        }

        for ((s, y, rho), alpha) in self.pairs.iter().zip(alphas.iter().rev()) {
            let beta = rho * dot(y, &q);
            for (qi, si) in q.iter_mut().zip(s) {
                *qi += (alpha - beta) * si;
            }
        }

        q.iter().map(|v| -v).collect()
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()))
}
