//! Integration tests for CLI config parsing and util helpers.

use std::io::Write;
use std::path::PathBuf;

use cohort_classifiers::config::ZeroVariancePolicy;
use cohort_cli::cli::build_cli;
use cohort_cli::train::input::TrainConfig;
use cohort_cli::util::validate_tsv_or_csv_file;

// ---------------------------------------------------------------------------
// validate_tsv_or_csv_file
// ---------------------------------------------------------------------------

#[test]
fn validate_tsv_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.tsv");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_ok());
}

#[test]
fn validate_csv_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.CSV");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_ok());
}

#[test]
fn validate_wrong_extension_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.txt");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_err());
}

#[test]
fn validate_nonexistent_file_errors() {
    assert!(validate_tsv_or_csv_file("/nonexistent/path/data.csv").is_err());
}

// ---------------------------------------------------------------------------
// TrainConfig defaults & serialization
// ---------------------------------------------------------------------------

#[test]
fn train_config_default_values() {
    let cfg = TrainConfig::default();
    assert_eq!(cfg.input_path, "data/StudentsPerformance.csv");
    assert_eq!(cfg.output_path, "student_app/model.bin");
    assert_eq!(cfg.label_column, "race/ethnicity");
    assert_eq!(cfg.feature_columns.len(), 3);
    assert_eq!(cfg.split.test_fraction, 0.2);
    assert_eq!(cfg.split.seed, 42);
    assert_eq!(cfg.model.max_iterations, 500);
    assert!(cfg.validate().is_ok());
}

#[test]
fn train_config_json_roundtrip() {
    let cfg = TrainConfig::default();
    let json = serde_json::to_string_pretty(&cfg).unwrap();
    assert!(json.contains("feature_columns"));
    assert!(json.contains("test_fraction"));
    let back: TrainConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn partial_config_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"{{"label_column": "gender", "split": {{"seed": 7}},
            "model": {{"zero_variance": "unit_scale"}}}}"#
    )
    .unwrap();

    let cfg = TrainConfig::load(&path).unwrap();
    assert_eq!(cfg.label_column, "gender");
    assert_eq!(cfg.split.seed, 7);
    assert_eq!(cfg.split.test_fraction, 0.2);
    assert_eq!(cfg.model.zero_variance, ZeroVariancePolicy::UnitScale);
    assert_eq!(cfg.output_path, "student_app/model.bin");
}

#[test]
fn malformed_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(TrainConfig::load(&path).is_err());
}

#[test]
fn label_used_as_feature_is_rejected() {
    let mut cfg = TrainConfig::default();
    cfg.label_column = "math score".to_string();
    assert!(cfg.validate().is_err());
}

#[test]
fn out_of_range_test_fraction_is_rejected() {
    let mut cfg = TrainConfig::default();
    cfg.split.test_fraction = 1.0;
    assert!(cfg.validate().is_err());
}

#[test]
fn non_ascii_delimiter_is_rejected() {
    let mut cfg = TrainConfig::default();
    cfg.delimiter = Some('§');
    assert!(cfg.delimiter_byte().is_err());
    cfg.delimiter = Some(';');
    assert_eq!(cfg.delimiter_byte().unwrap(), Some(b';'));
}

// ---------------------------------------------------------------------------
// from_arguments
// ---------------------------------------------------------------------------

#[test]
fn cli_overrides_take_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("scores.csv");
    std::fs::write(&data, "race/ethnicity,math score\n").unwrap();
    let out = dir.path().join("out").join("model.bin");

    let matches = build_cli()
        .try_get_matches_from([
            "cohort",
            "-d",
            data.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--seed",
            "11",
        ])
        .unwrap();
    let config_path: Option<&PathBuf> = matches.get_one("config");
    let cfg = TrainConfig::from_arguments(config_path, &matches).unwrap();

    assert_eq!(cfg.input_path, data.to_str().unwrap());
    assert_eq!(cfg.output_path, out.to_str().unwrap());
    assert_eq!(cfg.split.seed, 11);
    assert!(cfg.report_file.is_none());
}

#[test]
fn missing_input_file_is_rejected() {
    let matches = build_cli()
        .try_get_matches_from(["cohort", "-d", "/nonexistent/scores.csv"])
        .unwrap();
    assert!(TrainConfig::from_arguments(None, &matches).is_err());
}

#[test]
fn zero_variance_policy_can_be_overridden() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("scores.csv");
    std::fs::write(&data, "race/ethnicity,math score\n").unwrap();

    let matches = build_cli()
        .try_get_matches_from([
            "cohort",
            "-d",
            data.to_str().unwrap(),
            "--zero_variance",
            "unit-scale",
        ])
        .unwrap();
    let cfg = TrainConfig::from_arguments(None, &matches).unwrap();
    assert_eq!(cfg.model.zero_variance, ZeroVariancePolicy::UnitScale);

    assert!(build_cli()
        .try_get_matches_from(["cohort", "--zero_variance", "clamp"])
        .is_err());
}

#[test]
fn invalid_seed_fails_to_parse() {
    assert!(build_cli()
        .try_get_matches_from(["cohort", "--seed", "minus-one"])
        .is_err());
}
