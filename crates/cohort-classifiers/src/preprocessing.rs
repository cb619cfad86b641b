//! Per-column standardization learned from training rows.
//!
//! `StandardScaler` stores the mean and population standard deviation of each
//! feature column. It is only constructible through [`StandardScaler::fit`]
//! (or by deserializing a saved artifact), so the learned parameters cannot be
//! refit on prediction-time data.

use serde::{Deserialize, Serialize};

use crate::config::ZeroVariancePolicy;
use crate::error::{ClassifierError, Result};
use crate::math::Array2;

/// Standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Columns with a standard deviation below this are treated as constant.
    pub const MIN_STD: f64 = 1e-12;

    /// Fit from `x` where rows are samples and columns are features.
    ///
    /// `feature_names` is only used to name the column in a zero-variance
    /// error and may be shorter than the column count.
    pub fn fit(
        x: &Array2<f64>,
        feature_names: &[String],
        policy: ZeroVariancePolicy,
    ) -> Result<Self> {
        let (nrows, ncols) = x.shape();
        if nrows == 0 || ncols == 0 {
            return Err(ClassifierError::EmptyDataset);
        }

        let mut mean = vec![0.0f64; ncols];
        for row in x.rows() {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        let nrows_f = nrows as f64;
        for m in mean.iter_mut() {
            *m /= nrows_f;
        }

        let mut var = vec![0.0f64; ncols];
        for row in x.rows() {
            for c in 0..ncols {
                let d = row[c] - mean[c];
                var[c] += d * d;
            }
        }

        let mut scale = Vec::with_capacity(ncols);
        for (c, v) in var.into_iter().enumerate() {
            let std = (v / nrows_f).sqrt();
            if std < Self::MIN_STD {
                let column = feature_names
                    .get(c)
                    .cloned()
                    .unwrap_or_else(|| format!("column {}", c));
                match policy {
                    ZeroVariancePolicy::Error => {
                        return Err(ClassifierError::ZeroVariance { column })
                    }
                    ZeroVariancePolicy::UnitScale => {
                        log::warn!(
                            "Feature '{}' is constant in the training data; leaving it unscaled",
                            column
                        );
                        scale.push(1.0);
                    }
                }
            } else {
                scale.push(std);
            }
        }

        Ok(StandardScaler { mean, scale })
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Divisor applied to each centered column (the standard deviation, or
    /// 1.0 for a constant column kept under `UnitScale`).
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// `(x - mean) / scale` for every row.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_columns(x)?;
        let (nrows, ncols) = x.shape();
        let mut out = Vec::with_capacity(nrows * ncols);
        for row in x.rows() {
            for c in 0..ncols {
                out.push((row[c] - self.mean[c]) / self.scale[c]);
            }
        }
        Ok(Array2::from_shape_vec((nrows, ncols), out)?)
    }

    /// Undo [`transform`](Self::transform): `z * scale + mean`.
    pub fn inverse_transform(&self, z: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_columns(z)?;
        let (nrows, ncols) = z.shape();
        let mut out = Vec::with_capacity(nrows * ncols);
        for row in z.rows() {
            for c in 0..ncols {
                out.push(row[c] * self.scale[c] + self.mean[c]);
            }
        }
        Ok(Array2::from_shape_vec((nrows, ncols), out)?)
    }

    fn check_columns(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features() {
            return Err(ClassifierError::ShapeMismatch(format!(
                "scaler was fit on {} columns, got {}",
                self.n_features(),
                x.ncols()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|c| format!("f{}", c)).collect()
    }

    #[test]
    fn fit_computes_mean_and_population_std() {
        let x = Array2::from_shape_vec((4, 2), vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0])
            .unwrap();
        let sc = StandardScaler::fit(&x, &names(2), ZeroVariancePolicy::Error).unwrap();
        assert!((sc.mean()[0] - 2.5).abs() < 1e-12);
        assert!((sc.mean()[1] - 25.0).abs() < 1e-12);
        // population std of 1..4 is sqrt(1.25)
        assert!((sc.scale()[0] - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn transform_centers_and_scales() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let sc = StandardScaler::fit(&x, &names(1), ZeroVariancePolicy::Error).unwrap();
        let t = sc.transform(&x).unwrap();
        let col = t.as_slice();
        let mean = col.iter().sum::<f64>() / 4.0;
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
        assert!(mean.abs() < 1e-12, "mean after transform = {}", mean);
        assert!((var - 1.0).abs() < 1e-12, "variance after transform = {}", var);
    }

    #[test]
    fn inverse_transform_round_trips() {
        let x = Array2::from_shape_vec(
            (3, 3),
            vec![72.0, 72.0, 74.0, 69.0, 90.0, 88.0, 47.0, 57.0, 44.0],
        )
        .unwrap();
        let sc = StandardScaler::fit(&x, &names(3), ZeroVariancePolicy::Error).unwrap();
        let back = sc.inverse_transform(&sc.transform(&x).unwrap()).unwrap();
        for (a, b) in x.as_slice().iter().zip(back.as_slice()) {
            assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
        }
    }

    #[test]
    fn constant_column_follows_policy() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 5.0, 2.0, 5.0, 3.0, 5.0]).unwrap();
        match StandardScaler::fit(&x, &names(2), ZeroVariancePolicy::Error) {
            Err(ClassifierError::ZeroVariance { column }) => assert_eq!(column, "f1"),
            other => panic!("expected ZeroVariance, got {:?}", other),
        }

        let sc = StandardScaler::fit(&x, &names(2), ZeroVariancePolicy::UnitScale).unwrap();
        assert_eq!(sc.scale()[1], 1.0);
        let t = sc.transform(&x).unwrap();
        assert!(t.rows().all(|row| row[1].abs() < 1e-12));
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let x = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let sc = StandardScaler::fit(&x, &names(2), ZeroVariancePolicy::Error).unwrap();
        let narrow = Array2::from_shape_vec((1, 1), vec![1.0]).unwrap();
        assert!(matches!(
            sc.transform(&narrow),
            Err(ClassifierError::ShapeMismatch(_))
        ));
    }
}
