use std::ops::Index;
use std::slice::Iter;

use serde::{Deserialize, Serialize};

/// One value per sample, e.g. the class code of every row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Array1<T> {
    data: Vec<T>,
}

impl<T> Array1<T> {
    pub fn from_vec(data: Vec<T>) -> Self {
        Array1 { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Values at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Array1<T>
    where
        T: Clone,
    {
        Array1 {
            data: indices.iter().map(|&i| self.data[i].clone()).collect(),
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.clone()
    }
}

impl<T> Index<usize> for Array1<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5, 0.1]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn select_repeats_and_reorders() {
        let v = Array1::from_vec(vec![10, 20, 30]);
        assert_eq!(v.select(&[2, 0, 2]).to_vec(), vec![30, 10, 30]);
        assert_eq!(v[1], 20);
    }
}
