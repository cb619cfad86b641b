//! Two-stage standardize-then-classify unit.
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::Result;
use crate::math::Array2;
use crate::models::{ClassifierModel, FitSummary, LogisticRegression};
use crate::preprocessing::StandardScaler;

/// Fitted scaler followed by a fitted softmax classifier.
///
/// Both stages are learned once in [`Pipeline::fit`] and reused verbatim for
/// every prediction; raw feature rows go in, class codes come out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    scaler: StandardScaler,
    classifier: LogisticRegression,
}

impl Pipeline {
    /// Learn the scaler on `x`, then the classifier on the scaled rows.
    pub fn fit(
        x: &Array2<f64>,
        y: &[usize],
        n_classes: usize,
        feature_names: &[String],
        config: &ModelConfig,
    ) -> Result<(Self, FitSummary)> {
        let scaler = StandardScaler::fit(x, feature_names, config.zero_variance)?;
        let scaled = scaler.transform(x)?;
        let (classifier, summary) = LogisticRegression::fit(&scaled, y, n_classes, config)?;
        Ok((Pipeline { scaler, classifier }, summary))
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }
}

impl ClassifierModel for Pipeline {
    fn n_classes(&self) -> usize {
        self.classifier.n_classes()
    }

    fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let scaled = self.scaler.transform(x)?;
        self.classifier.predict_proba(&scaled)
    }

    fn name(&self) -> &str {
        "standard_scaler+softmax_regression"
    }
}
