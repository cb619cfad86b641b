use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use cohort_classifiers::artifact::ModelArtifact;
use cohort_classifiers::data_handling::extract_dataset;
use cohort_classifiers::io::read_table;
use cohort_classifiers::metrics::{accuracy, confusion_matrix};
use cohort_classifiers::models::{ClassifierModel, FitSummary};
use cohort_classifiers::pipeline::Pipeline;
use cohort_classifiers::report::TrainingReport;
use cohort_classifiers::split::train_test_split;

use super::input::TrainConfig;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Accuracy on the held-out rows, in `[0, 1]`.
    pub accuracy: f64,
    pub fit_summary: FitSummary,
    pub n_train: usize,
    pub n_test: usize,
    pub classes: Vec<String>,
    pub output_path: PathBuf,
}

/// Load, split, fit, evaluate and persist according to `config`.
///
/// The artifact is written last; any earlier failure leaves the previous
/// artifact at `output_path` untouched.
pub fn run_training(config: &TrainConfig) -> Result<TrainingOutcome> {
    config.validate()?;
    let start_time = Instant::now();

    log::info!("Loading training data from {}", config.input_path);
    let table = read_table(&config.input_path, config.delimiter_byte()?)
        .with_context(|| format!("Failed to load dataset: {}", config.input_path))?;

    let dataset = extract_dataset(
        &table,
        &config.feature_columns,
        &config.label_column,
        config.class_labels.as_deref(),
    )
    .context("Failed to extract features and labels")?;
    dataset.log_input_data_summary();
    if config.class_labels.is_none() {
        log::debug!(
            "Class codes derived from the data: {:?}",
            dataset.classes.labels()
        );
    }

    let split = train_test_split(dataset.y.as_slice(), &dataset.classes, &config.split)
        .context("Failed to split data into training and validation sets")?;
    let train = dataset.subset(&split.train);
    let test = dataset.subset(&split.test);
    log::info!(
        "Split {} rows into {} training and {} validation rows (seed {})",
        dataset.nrows(),
        train.nrows(),
        test.nrows(),
        config.split.seed
    );

    log::trace!("Training started");
    let (pipeline, fit_summary) = Pipeline::fit(
        &train.x,
        train.y.as_slice(),
        dataset.classes.len(),
        &dataset.feature_names,
        &config.model,
    )
    .context("Training failed: an error occurred while fitting the pipeline")?;
    log::info!(
        "Fitted {} in {:?}",
        pipeline.name(),
        start_time.elapsed()
    );

    let acc = accuracy(&pipeline, &test.x, test.y.as_slice())
        .context("Failed to evaluate the fitted pipeline")?;
    log::info!("Validation accuracy: {:.3}", acc);

    let classes = dataset.classes.labels().to_vec();
    let artifact = ModelArtifact::new(
        pipeline,
        dataset.classes.clone(),
        dataset.feature_names.clone(),
        config.label_column.clone(),
    );

    if let Some(report_file) = &config.report_file {
        let predicted = artifact
            .pipeline
            .predict(&test.x)
            .context("Failed to predict validation rows for the report")?;
        let confusion = confusion_matrix(test.y.as_slice(), &predicted, classes.len())
            .context("Failed to build the confusion matrix")?;
        let report = TrainingReport {
            title: format!("Cohort training report: {}", config.label_column),
            generated_at: artifact.trained_at.clone(),
            config_json: TrainingReport::config_to_json(config),
            classes: classes.clone(),
            train_counts: train.class_counts(),
            test_counts: test.class_counts(),
            accuracy: acc,
            confusion,
            fit_summary: fit_summary.clone(),
            feature_names: dataset.feature_names.clone(),
            scaler: artifact.pipeline.scaler().clone(),
            artifact_path: config.output_path.clone(),
        };
        report
            .write(report_file)
            .with_context(|| format!("Failed to write training report: {}", report_file))?;
        log::info!("Report written to: {}", report_file);
    }

    artifact
        .save(&config.output_path)
        .with_context(|| format!("Failed to write model artifact: {}", config.output_path))?;
    log::info!("Model saved to: {}", config.output_path);

    Ok(TrainingOutcome {
        accuracy: acc,
        fit_summary,
        n_train: train.nrows(),
        n_test: test.nrows(),
        classes,
        output_path: PathBuf::from(&config.output_path),
    })
}
