use std::path::PathBuf;

use thiserror::Error;

use crate::math::ShapeError;

pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Failures raised while loading, fitting, evaluating or persisting a model.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed delimited file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Dataset contains no rows")]
    EmptyDataset,

    #[error("Missing column '{0}'")]
    MissingColumn(String),
    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue { row: usize, column: String },
    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Label '{label}' at row {row} is not part of the configured class vocabulary")]
    UnknownLabel { row: usize, label: String },
    #[error("Class label '{0}' appears more than once in the vocabulary")]
    DuplicateClassLabel(String),
    #[error("Feature columns {found:?} do not match the training columns {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Need at least two classes to train a classifier, found {found}")]
    SingleClass { found: usize },
    #[error("Class '{label}' has only {count} member(s); at least 2 are required to stratify")]
    InsufficientClassMembers { label: String, count: usize },
    #[error("Not enough samples: {0}")]
    InsufficientSamples(String),
    #[error("Feature column '{column}' has zero variance in the training data")]
    ZeroVariance { column: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to encode model artifact: {0}")]
    ArtifactEncode(#[from] bincode::error::EncodeError),
    #[error("Failed to decode model artifact: {0}")]
    ArtifactDecode(#[from] bincode::error::DecodeError),
    #[error("{path} is not a cohort model artifact")]
    ArtifactFormat { path: PathBuf },
    #[error("Unsupported artifact format version {found} (this build reads version {expected})")]
    UnsupportedArtifactVersion { found: u32, expected: u32 },
}

impl ClassifierError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClassifierError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ShapeError> for ClassifierError {
    fn from(err: ShapeError) -> Self {
        ClassifierError::ShapeMismatch(err.to_string())
    }
}
