//! cohort-classifiers: a small standardize-then-softmax classification stack.
//!
//! The crate covers one linear training flow for tabular score data: read a
//! delimited file (`io`), project feature and label columns (`data_handling`),
//! split rows with a seeded stratified splitter (`split`), fit a
//! `StandardScaler` plus multinomial logistic regression (`preprocessing`,
//! `models`, `pipeline`), score the held-out rows (`metrics`) and persist the
//! fitted pipeline with its class vocabulary (`artifact`). `report` renders an
//! optional HTML summary of a run.
pub mod artifact;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod math;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod split;

pub use error::{ClassifierError, Result};
