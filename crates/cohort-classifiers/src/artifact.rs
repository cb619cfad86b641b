//! Versioned on-disk bundle of a fitted pipeline and its class vocabulary.
//!
//! Layout: the 4-byte magic `CHRT`, the format version as a little-endian
//! `u32`, then the bincode encoding of [`ModelArtifact`]. The header is read
//! before the body so an artifact written by a different format version is
//! rejected with a clear error instead of a decode failure.
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::data_handling::ClassLabels;
use crate::error::{ClassifierError, Result};
use crate::math::Array2;
use crate::models::ClassifierModel;
use crate::pipeline::Pipeline;

pub const ARTIFACT_MAGIC: &[u8; 4] = b"CHRT";
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8;

/// Everything a consumer needs to turn raw score rows into label strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub pipeline: Pipeline,
    pub classes: ClassLabels,
    /// Feature columns in the order the pipeline expects them.
    pub feature_names: Vec<String>,
    pub label_column: String,
    /// RFC 3339 timestamp of the training run.
    pub trained_at: String,
    /// Version of the crate that produced the artifact.
    pub producer_version: String,
}

impl ModelArtifact {
    pub fn new(
        pipeline: Pipeline,
        classes: ClassLabels,
        feature_names: Vec<String>,
        label_column: impl Into<String>,
    ) -> Self {
        ModelArtifact {
            pipeline,
            classes,
            feature_names,
            label_column: label_column.into(),
            trained_at: chrono::Utc::now().to_rfc3339(),
            producer_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = bincode::serde::encode_to_vec(self, bincode::config::standard())?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
        bytes.extend_from_slice(ARTIFACT_MAGIC);
        bytes.extend_from_slice(&ARTIFACT_FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Parse bytes produced by [`to_bytes`](Self::to_bytes). `origin` names
    /// the source in error messages.
    pub fn from_bytes(bytes: &[u8], origin: &Path) -> Result<Self> {
        if bytes.len() < HEADER_LEN || &bytes[..4] != ARTIFACT_MAGIC {
            return Err(ClassifierError::ArtifactFormat {
                path: origin.to_path_buf(),
            });
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[4..HEADER_LEN]);
        let found = u32::from_le_bytes(version);
        if found != ARTIFACT_FORMAT_VERSION {
            return Err(ClassifierError::UnsupportedArtifactVersion {
                found,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }
        let (artifact, _): (ModelArtifact, usize) =
            bincode::serde::decode_from_slice(&bytes[HEADER_LEN..], bincode::config::standard())?;
        Ok(artifact)
    }

    /// Write the artifact to `path`, replacing any existing file.
    ///
    /// Missing parent directories are created. The bytes go to a temporary
    /// file in the destination directory which is then renamed over `path`,
    /// so readers never observe a partially written artifact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| ClassifierError::io(dir, source))?;

        let bytes = self.to_bytes()?;
        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|source| ClassifierError::io(dir, source))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|source| ClassifierError::io(tmp.path(), source))?;
        tmp.persist(path)
            .map_err(|err| ClassifierError::io(path, err.error))?;

        log::debug!("Wrote {} byte artifact to {}", bytes.len(), path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ClassifierError::io(path, source))?;
        Self::from_bytes(&bytes, path)
    }

    /// Fail unless `names` equals the training feature order.
    pub fn check_features(&self, names: &[String]) -> Result<()> {
        if names != self.feature_names.as_slice() {
            return Err(ClassifierError::FeatureMismatch {
                expected: self.feature_names.clone(),
                found: names.to_vec(),
            });
        }
        Ok(())
    }

    /// Predicted label string for each raw feature row.
    pub fn predict_labels(&self, x: &Array2<f64>) -> Result<Vec<&str>> {
        let codes = self.pipeline.predict(x)?;
        codes
            .into_iter()
            .map(|code| {
                self.classes.label_of(code).ok_or_else(|| {
                    ClassifierError::ShapeMismatch(format!(
                        "predicted code {} outside vocabulary of {} classes",
                        code,
                        self.classes.len()
                    ))
                })
            })
            .collect()
    }
}
