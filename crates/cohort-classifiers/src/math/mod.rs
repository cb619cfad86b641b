//! Small ndarray-like types used throughout the crate.
//!
//! Provides `Array2` (row-major 2D) and `Array1` (1D) containers with the
//! handful of operations the pipeline needs. Both derive serde so fitted
//! parameters can be stored in the model artifact.
pub mod matrix;
pub mod vector;

pub use matrix::{Array2, ShapeError};
pub use vector::Array1;
