use crate::error::Result;
use crate::math::vector::argmax;
use crate::math::Array2;

/// Prediction contract shared by fitted models.
///
/// Implementations are fitted through their own constructors and are
/// immutable afterwards, so this trait only covers inference.
pub trait ClassifierModel {
    /// Number of classes the model scores.
    fn n_classes(&self) -> usize;

    /// Number of input columns expected by `predict_proba`.
    fn n_features(&self) -> usize;

    /// Per-class probabilities, one row per sample (`n × n_classes`).
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Most probable class code per row; ties resolve to the lowest code.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .map(|row| argmax(row).unwrap_or(0))
            .collect())
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
