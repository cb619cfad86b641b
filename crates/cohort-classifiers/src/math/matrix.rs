use std::ops::{Index, IndexMut};

use num_traits::Zero;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Row-major `rows × cols` buffer. Feature matrices use one row per sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Array2<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("buffer of {found} values cannot form a {rows}x{cols} matrix")]
pub struct ShapeError {
    rows: usize,
    cols: usize,
    found: usize,
}

impl<T> Array2<T> {
    pub fn from_shape_vec((rows, cols): (usize, usize), data: Vec<T>) -> Result<Self, ShapeError> {
        if rows * cols != data.len() {
            return Err(ShapeError {
                rows,
                cols,
                found: data.len(),
            });
        }
        Ok(Array2 { data, rows, cols })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// All values in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn row_slice(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_slice_mut(&mut self, row: usize) -> &mut [T] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |row| self.row_slice(row))
    }

    /// Copy of the rows at `indices`, in that order (repeats allowed).
    pub fn select_rows(&self, indices: &[usize]) -> Array2<T>
    where
        T: Clone,
    {
        let data = indices
            .iter()
            .flat_map(|&row| self.row_slice(row).iter().cloned())
            .collect();
        Array2 {
            data,
            rows: indices.len(),
            cols: self.cols,
        }
    }
}

impl<T: Clone + Zero> Array2<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Array2 {
            data: vec![T::zero(); rows * cols],
            rows,
            cols,
        }
    }
}

impl<T> Index<(usize, usize)> for Array2<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        debug_assert!(col < self.cols);
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Array2<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        debug_assert!(col < self.cols);
        &mut self.data[row * self.cols + col]
    }
}
