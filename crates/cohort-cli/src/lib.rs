//! Training driver and argument handling for the `cohort` binary.
pub mod cli;
pub mod train;
pub mod util;
