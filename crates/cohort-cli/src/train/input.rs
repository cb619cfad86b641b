use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use cohort_classifiers::config::{ModelConfig, SplitConfig, ZeroVariancePolicy};

use crate::util::validate_tsv_or_csv_file;

/// Everything a training run needs: where to read, where to write, which
/// columns to use and how to split and fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub input_path: String,
    pub output_path: String,
    pub feature_columns: Vec<String>,
    pub label_column: String,
    /// Pins the class codes; when absent they follow the sorted labels in the data.
    pub class_labels: Option<Vec<String>>,
    /// Field delimiter; inferred from the input extension when absent.
    pub delimiter: Option<char>,
    /// Optional HTML training report.
    pub report_file: Option<String>,
    pub split: SplitConfig,
    pub model: ModelConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            input_path: String::from("data/StudentsPerformance.csv"),
            output_path: String::from("student_app/model.bin"),
            feature_columns: vec![
                String::from("math score"),
                String::from("reading score"),
                String::from("writing score"),
            ],
            label_column: String::from("race/ethnicity"),
            class_labels: None,
            delimiter: None,
            report_file: None,
            split: SplitConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Load a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: TrainConfig = serde_json::from_str(&config_json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Build the run configuration from an optional config file plus CLI
    /// overrides, then validate it.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => TrainConfig::load(path)?,
            None => {
                log::info!("No config file given; using built-in defaults");
                TrainConfig::default()
            }
        };

        // Apply CLI overrides
        if let Some(train_data) = matches.get_one::<String>("train_data") {
            config.input_path = train_data.clone();
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_path = output_file.clone();
        }
        if let Some(report_file) = matches.get_one::<String>("report_file") {
            config.report_file = Some(report_file.clone());
        }
        if let Some(seed) = matches.get_one::<u64>("seed") {
            config.split.seed = *seed;
        }
        if let Some(policy) = matches.get_one::<ZeroVariancePolicy>("zero_variance") {
            config.model.zero_variance = *policy;
        }

        validate_tsv_or_csv_file(&config.input_path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.feature_columns.is_empty() {
            anyhow::bail!("feature_columns must name at least one column");
        }
        if self.label_column.trim().is_empty() {
            anyhow::bail!("label_column must not be empty");
        }
        if self.feature_columns.iter().any(|c| c == &self.label_column) {
            anyhow::bail!(
                "label column '{}' cannot also be a feature column",
                self.label_column
            );
        }
        if self.output_path.trim().is_empty() {
            anyhow::bail!("output_path must not be empty");
        }
        self.delimiter_byte()?;
        self.split.validate()?;
        self.model.validate()?;
        Ok(())
    }

    /// Configured delimiter as a byte, if any.
    pub fn delimiter_byte(&self) -> Result<Option<u8>> {
        match self.delimiter {
            None => Ok(None),
            Some(c) if c.is_ascii() => Ok(Some(c as u8)),
            Some(c) => anyhow::bail!("delimiter must be a single ASCII character, got {:?}", c),
        }
    }
}
