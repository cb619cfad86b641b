//! Feature and label extraction from a loaded [`Table`].
//!
//! This module defines `ClassLabels` (the code <-> label-string vocabulary) and
//! `Dataset` (feature matrix, label codes and the vocabulary they index), and
//! the `extract_dataset` helper that projects the configured columns out of a
//! raw table.
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};
use crate::io::Table;
use crate::math::{Array1, Array2};

/// Ordered class vocabulary: `labels()[code]` is the name of class `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLabels {
    labels: Vec<String>,
}

impl ClassLabels {
    /// Vocabulary made of the distinct observed values in sorted order.
    pub fn from_observed<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        ClassLabels {
            labels: distinct.into_iter().map(str::to_string).collect(),
        }
    }

    /// Vocabulary pinned by the caller, in the given order.
    pub fn from_vocabulary(labels: Vec<String>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(ClassifierError::DuplicateClassLabel(label.clone()));
            }
        }
        Ok(ClassLabels { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn code_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn label_of(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }
}

/// Features, label codes and the vocabulary the codes index into.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Array2<f64>,
    pub y: Array1<usize>,
    pub classes: ClassLabels,
    pub feature_names: Vec<String>,
}

impl Dataset {
    pub fn new(
        x: Array2<f64>,
        y: Array1<usize>,
        classes: ClassLabels,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(ClassifierError::ShapeMismatch(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if x.ncols() != feature_names.len() {
            return Err(ClassifierError::ShapeMismatch(format!(
                "{} feature columns but {} feature names",
                x.ncols(),
                feature_names.len()
            )));
        }
        if let Some(&code) = y.iter().find(|&&code| code >= classes.len()) {
            return Err(ClassifierError::ShapeMismatch(format!(
                "label code {} outside vocabulary of {} classes",
                code,
                classes.len()
            )));
        }
        Ok(Dataset {
            x,
            y,
            classes,
            feature_names,
        })
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    /// Number of rows per class code, indexed by code.
    pub fn class_counts(&self) -> Vec<usize> {
        class_counts(self.y.as_slice(), self.classes.len())
    }

    /// Rows at `indices`, keeping the full vocabulary.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select_rows(indices),
            y: self.y.select(indices),
            classes: self.classes.clone(),
            feature_names: self.feature_names.clone(),
        }
    }

    pub fn log_input_data_summary(&self) {
        log::info!("----- Input Data Summary -----");
        log::info!(
            "{} rows, {} feature columns ({})",
            self.nrows(),
            self.x.ncols(),
            self.feature_names.join(", ")
        );
        for (label, count) in self.classes.labels().iter().zip(self.class_counts()) {
            log::info!("class '{}': {} rows", label, count);
        }
        log::info!("-------------------------------");
    }
}

pub fn class_counts(y: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &code in y {
        if code < n_classes {
            counts[code] += 1;
        }
    }
    counts
}

/// Project `feature_columns` (in order) and `label_column` out of `table`.
///
/// Without a `vocabulary` the label codes follow the sorted order of the
/// distinct labels present in the table, so a different dataset can yield
/// different codes. Passing a vocabulary pins the codes; labels outside it are
/// rejected.
pub fn extract_dataset(
    table: &Table,
    feature_columns: &[String],
    label_column: &str,
    vocabulary: Option<&[String]>,
) -> Result<Dataset> {
    if feature_columns.is_empty() {
        return Err(ClassifierError::InvalidConfig(
            "at least one feature column is required".to_string(),
        ));
    }
    if table.is_empty() {
        return Err(ClassifierError::EmptyDataset);
    }

    let columns = feature_columns
        .iter()
        .map(|name| table.column(name))
        .collect::<Result<Vec<_>>>()?;
    let raw_labels = table.column(label_column)?;

    let n_rows = table.nrows();
    let n_features = feature_columns.len();
    let mut features = Vec::with_capacity(n_rows * n_features);
    for row in 0..n_rows {
        for (name, cells) in feature_columns.iter().zip(&columns) {
            features.push(parse_feature(cells[row], row + 1, name)?);
        }
    }
    let x = Array2::from_shape_vec((n_rows, n_features), features)?;

    let mut labels = Vec::with_capacity(n_rows);
    for (row, cell) in raw_labels.iter().enumerate() {
        let label = cell.trim();
        if label.is_empty() {
            return Err(ClassifierError::MissingValue {
                row: row + 1,
                column: label_column.to_string(),
            });
        }
        labels.push(label);
    }

    let classes = match vocabulary {
        Some(vocab) => ClassLabels::from_vocabulary(vocab.to_vec())?,
        None => ClassLabels::from_observed(labels.iter().copied()),
    };

    let lookup: HashMap<&str, usize> = classes
        .labels()
        .iter()
        .enumerate()
        .map(|(code, label)| (label.as_str(), code))
        .collect();

    let mut codes = Vec::with_capacity(n_rows);
    for (row, label) in labels.iter().enumerate() {
        let code = lookup
            .get(label)
            .copied()
            .ok_or_else(|| ClassifierError::UnknownLabel {
                row: row + 1,
                label: label.to_string(),
            })?;
        codes.push(code);
    }

    let dataset = Dataset::new(x, Array1::from_vec(codes), classes, feature_columns.to_vec())?;

    if vocabulary.is_some() {
        for (label, count) in dataset.classes.labels().iter().zip(dataset.class_counts()) {
            if count == 0 {
                log::warn!("Class '{}' from the vocabulary has no rows in the data", label);
            }
        }
    }

    Ok(dataset)
}

fn parse_feature(cell: &str, row: usize, column: &str) -> Result<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Err(ClassifierError::MissingValue {
            row,
            column: column.to_string(),
        });
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ClassifierError::InvalidValue {
            row,
            column: column.to_string(),
            value: trimmed.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::StringRecord;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter().map(|r| StringRecord::from(r.to_vec())).collect(),
        )
    }

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn codes_follow_sorted_label_order() {
        let t = table(
            &["group", "a", "b"],
            &[
                &["group C", "1", "2"],
                &["group A", "3", "4"],
                &["group B", "5", "6"],
                &["group A", "7", "8"],
            ],
        );
        let ds = extract_dataset(&t, &names(&["b", "a"]), "group", None).unwrap();
        assert_eq!(ds.classes.labels(), &names(&["group A", "group B", "group C"])[..]);
        assert_eq!(ds.y.to_vec(), vec![2, 0, 1, 0]);
        // features are projected in the requested order
        assert_eq!(ds.x.row_slice(0), &[2.0, 1.0]);
        assert_eq!(ds.class_counts(), vec![2, 1, 1]);
    }

    #[test]
    fn vocabulary_pins_codes_and_rejects_unknown_labels() {
        let t = table(&["g", "a"], &[&["b", "1"], &["a", "2"]]);
        let vocab = names(&["b", "a", "c"]);
        let ds = extract_dataset(&t, &names(&["a"]), "g", Some(vocab.as_slice())).unwrap();
        assert_eq!(ds.y.to_vec(), vec![0, 1]);
        assert_eq!(ds.classes.len(), 3);

        let narrow = names(&["a"]);
        match extract_dataset(&t, &names(&["a"]), "g", Some(narrow.as_slice())) {
            Err(ClassifierError::UnknownLabel { row, label }) => {
                assert_eq!(row, 1);
                assert_eq!(label, "b");
            }
            other => panic!("expected UnknownLabel, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_vocabulary_entries_are_rejected() {
        assert!(matches!(
            ClassLabels::from_vocabulary(names(&["x", "y", "x"])),
            Err(ClassifierError::DuplicateClassLabel(label)) if label == "x"
        ));
    }

    #[test]
    fn bad_cells_are_reported_with_row_and_column() {
        let t = table(&["g", "a"], &[&["x", "1"], &["y", "abc"]]);
        match extract_dataset(&t, &names(&["a"]), "g", None) {
            Err(ClassifierError::InvalidValue { row, column, value }) => {
                assert_eq!((row, column.as_str(), value.as_str()), (2, "a", "abc"));
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }

        let t = table(&["g", "a"], &[&["x", ""], &["y", "1"]]);
        assert!(matches!(
            extract_dataset(&t, &names(&["a"]), "g", None),
            Err(ClassifierError::MissingValue { row: 1, .. })
        ));
    }

    #[test]
    fn absent_columns_are_schema_errors() {
        let t = table(&["g", "a"], &[&["x", "1"]]);
        assert!(matches!(
            extract_dataset(&t, &names(&["a", "b"]), "g", None),
            Err(ClassifierError::MissingColumn(name)) if name == "b"
        ));
        assert!(matches!(
            extract_dataset(&t, &names(&["a"]), "label", None),
            Err(ClassifierError::MissingColumn(name)) if name == "label"
        ));
    }

    #[test]
    fn subset_keeps_vocabulary() {
        let t = table(&["g", "a"], &[&["x", "1"], &["y", "2"], &["x", "3"]]);
        let ds = extract_dataset(&t, &names(&["a"]), "g", None).unwrap();
        let sub = ds.subset(&[2]);
        assert_eq!(sub.nrows(), 1);
        assert_eq!(sub.classes.len(), 2);
        assert_eq!(sub.x.row_slice(0), &[3.0]);
    }
}
