use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ClassifierError, Result};

/// Solver and preprocessing settings for the standardize + softmax pipeline.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Iteration cap for the gradient solver.
    pub max_iterations: usize,
    /// Convergence threshold on the largest absolute gradient component.
    pub tolerance: f64,
    /// Strength of the L2 penalty on the weights (bias is not penalized).
    pub l2_penalty: f64,
    /// Step length tried first by the line search.
    pub initial_step: f64,
    pub zero_variance: ZeroVariancePolicy,
}

/// What the scaler does with a feature column that never varies.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZeroVariancePolicy {
    /// Fail the fit with `ClassifierError::ZeroVariance`.
    #[default]
    Error,
    /// Keep the column centered but unscaled (scale = 1.0).
    UnitScale,
}

impl FromStr for ZeroVariancePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "error" => Ok(ZeroVariancePolicy::Error),
            "unit_scale" => Ok(ZeroVariancePolicy::UnitScale),
            _ => Err(format!(
                "Unknown zero-variance policy: {}. Expected `error` or `unit_scale`",
                s
            )),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-4,
            l2_penalty: 1.0,
            initial_step: 1.0,
            zero_variance: ZeroVariancePolicy::Error,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(ClassifierError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ClassifierError::InvalidConfig(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if !(self.l2_penalty.is_finite() && self.l2_penalty >= 0.0) {
            return Err(ClassifierError::InvalidConfig(format!(
                "l2_penalty must be non-negative, got {}",
                self.l2_penalty
            )));
        }
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(ClassifierError::InvalidConfig(format!(
                "initial_step must be a positive number, got {}",
                self.initial_step
            )));
        }
        Ok(())
    }
}

/// Train/test partitioning settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub stratify: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            stratify: true,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ClassifierError::InvalidConfig(format!(
                "test_fraction must lie strictly between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}
