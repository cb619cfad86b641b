//! Readers for delimited tabular input.
pub mod table;

pub use table::{read_table, Table};
