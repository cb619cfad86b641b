use anyhow::Result;
use log::LevelFilter;
use std::path::PathBuf;

use cohort_cli::cli::build_cli;
use cohort_cli::train::input::TrainConfig;
use cohort_cli::train::trainer::{self, TrainingOutcome};

fn main() {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("COHORT_LOG", "error,cohort=info"))
        .init();

    match run() {
        Ok(outcome) => println!("Validation accuracy: {:.3}", outcome.accuracy),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<TrainingOutcome> {
    let matches = build_cli().get_matches();

    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[Cohort::Train] Training from config: {:?}", path),
        None => log::info!("[Cohort::Train] Training with default configuration"),
    }

    let params = TrainConfig::from_arguments(config_path, &matches)?;
    trainer::run_training(&params)
}
