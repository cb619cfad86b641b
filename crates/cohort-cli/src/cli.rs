use std::path::PathBuf;

use clap::{Arg, Command, ValueHint};

use cohort_classifiers::config::ZeroVariancePolicy;

/// Argument definitions for the `cohort` binary.
pub fn build_cli() -> Command {
    Command::new("cohort")
        .version(clap::crate_version!())
        .about("Train the exam-score classifier and write the model artifact")
        .arg(
            Arg::new("config")
                .help(
                    "Path to a JSON training configuration file. \
                     Built-in defaults are used when omitted.",
                )
                .required(false)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("train_data")
                .short('d')
                .long("train_data")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to the training data (.csv or .tsv). Overrides the input_path \
                     specified in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output_file")
                .short('o')
                .long("output_file")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "File path that the model artifact will be written to. \
                     Overrides the output_path specified in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("report_file")
                .short('r')
                .long("report")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Write an HTML training report to this path.")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(clap::value_parser!(u64))
                .help("Random seed for the train/validation split.")
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("zero_variance")
                .long("zero_variance")
                .value_parser(|s: &str| s.parse::<ZeroVariancePolicy>())
                .help(
                    "How to treat a constant feature column: `error` (default) or \
                     `unit_scale`. Overrides model.zero_variance in the configuration file.",
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}
