//! End-to-end training runs through `run_training`.

use std::path::Path;

use cohort_classifiers::artifact::ModelArtifact;
use cohort_cli::train::input::TrainConfig;
use cohort_cli::train::trainer::run_training;

fn write_scores(dir: &Path, name: &str, sep: char) -> String {
    let mut text = format!(
        "gender{s}race/ethnicity{s}math score{s}reading score{s}writing score\n",
        s = sep
    );
    for i in 0..10 {
        text.push_str(&format!(
            "female{s}group A{s}{}{s}{}{s}{}\n",
            20 + i,
            50 + i,
            45 + 2 * i,
            s = sep
        ));
        text.push_str(&format!(
            "male{s}group B{s}{}{s}{}{s}{}\n",
            85 + i,
            52 + i,
            47 + i,
            s = sep
        ));
    }
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path.to_str().unwrap().to_string()
}

fn config_for(dir: &Path, input_path: String) -> TrainConfig {
    TrainConfig {
        input_path,
        output_path: dir
            .join("student_app")
            .join("model.bin")
            .to_str()
            .unwrap()
            .to_string(),
        ..TrainConfig::default()
    }
}

#[test]
fn training_writes_a_loadable_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scores(dir.path(), "scores.csv", ',');
    let config = config_for(dir.path(), input);

    let outcome = run_training(&config).unwrap();
    assert_eq!(outcome.n_test, 4);
    assert_eq!(outcome.n_train, 16);
    assert_eq!(outcome.classes, vec!["group A".to_string(), "group B".to_string()]);
    assert_eq!(outcome.accuracy, 1.0);

    let artifact = ModelArtifact::load(&outcome.output_path).unwrap();
    assert_eq!(artifact.classes.labels(), outcome.classes.as_slice());
    assert_eq!(artifact.label_column, "race/ethnicity");
}

#[test]
fn tab_separated_input_is_detected_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scores(dir.path(), "scores.tsv", '\t');
    let config = config_for(dir.path(), input);
    assert!(run_training(&config).is_ok());
}

#[test]
fn missing_feature_column_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scores(dir.path(), "scores.csv", ',');
    let mut config = config_for(dir.path(), input);
    config.feature_columns.push("science score".to_string());

    let err = run_training(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("science score"));
    assert!(!Path::new(&config.output_path).exists());
}

#[test]
fn report_is_written_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scores(dir.path(), "scores.csv", ',');
    let mut config = config_for(dir.path(), input);
    let report = dir.path().join("reports").join("train.html");
    config.report_file = Some(report.to_str().unwrap().to_string());

    run_training(&config).unwrap();
    let html = std::fs::read_to_string(&report).unwrap();
    assert!(html.contains("group A"));
    assert!(html.contains("race/ethnicity"));
}

#[test]
fn failed_report_leaves_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scores(dir.path(), "scores.csv", ',');
    let mut config = config_for(dir.path(), input);
    // a regular file cannot act as the report's parent directory
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "x").unwrap();
    config.report_file = Some(blocker.join("train.html").to_str().unwrap().to_string());

    let err = run_training(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("training report"));
    assert!(!Path::new(&config.output_path).exists());
}
