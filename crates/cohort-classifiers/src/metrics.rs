use crate::error::{ClassifierError, Result};
use crate::math::Array2;
use crate::models::ClassifierModel;

/// Fraction of rows of `x` whose predicted class equals `y`.
pub fn accuracy(model: &dyn ClassifierModel, x: &Array2<f64>, y: &[usize]) -> Result<f64> {
    if x.nrows() != y.len() {
        return Err(ClassifierError::ShapeMismatch(format!(
            "{} rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    let predicted = model.predict(x)?;
    accuracy_score(y, &predicted)
}

/// Fraction of positions where `truth` and `predicted` agree.
pub fn accuracy_score(truth: &[usize], predicted: &[usize]) -> Result<f64> {
    if truth.is_empty() {
        return Err(ClassifierError::EmptyDataset);
    }
    if truth.len() != predicted.len() {
        return Err(ClassifierError::ShapeMismatch(format!(
            "{} labels but {} predictions",
            truth.len(),
            predicted.len()
        )));
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// `n_classes × n_classes` counts; rows are true classes, columns predictions.
pub fn confusion_matrix(
    truth: &[usize],
    predicted: &[usize],
    n_classes: usize,
) -> Result<Array2<usize>> {
    if truth.len() != predicted.len() {
        return Err(ClassifierError::ShapeMismatch(format!(
            "{} labels but {} predictions",
            truth.len(),
            predicted.len()
        )));
    }
    let mut matrix = Array2::zeros(n_classes, n_classes);
    for (&t, &p) in truth.iter().zip(predicted) {
        if t >= n_classes || p >= n_classes {
            return Err(ClassifierError::ShapeMismatch(format!(
                "class code outside 0..{}",
                n_classes
            )));
        }
        matrix[(t, p)] += 1;
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_score_counts_matches() {
        assert_eq!(accuracy_score(&[0, 1, 1, 2], &[0, 1, 0, 2]).unwrap(), 0.75);
        assert_eq!(accuracy_score(&[1], &[0]).unwrap(), 0.0);
        assert!(matches!(
            accuracy_score(&[], &[]),
            Err(ClassifierError::EmptyDataset)
        ));
        assert!(accuracy_score(&[0, 1], &[0]).is_err());
    }

    #[test]
    fn confusion_matrix_rows_are_truth() {
        let cm = confusion_matrix(&[0, 0, 1, 2], &[0, 1, 1, 1], 3).unwrap();
        assert_eq!(cm[(0, 0)], 1);
        assert_eq!(cm[(0, 1)], 1);
        assert_eq!(cm[(1, 1)], 1);
        assert_eq!(cm[(2, 1)], 1);
        assert_eq!(cm.as_slice().iter().sum::<usize>(), 4);
        assert!(confusion_matrix(&[3], &[0], 3).is_err());
    }
}
