//! Flat 2-D buffers with explicit shape.

use std::ops::{Index, IndexMut};

/// A row-major 2-D buffer: `rows` slow-axis samples of `cols` fast-axis samples.
///
/// Every slice that moves between the engine, its stores and its kernels
/// is a `Plane`. The shape never changes after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Plane<T> {
    /// A zero-filled (`T::default()`) plane.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }

    /// Wrap existing samples. Returns `None` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != rows * cols {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    /// Reset every sample to `T::default()`.
    pub fn zero(&mut self) {
        self.data.fill(T::default());
    }

    /// Set every sample to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Plane<T> {
    /// Number of rows (slow axis).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (fast axis).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total sample count.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the plane holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Samples in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable samples in row-major order.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// One row.
    pub fn row(&self, r: usize) -> &[T] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// One mutable row.
    pub fn row_mut(&mut self, r: usize) -> &mut [T] {
        let cols = self.cols;
        &mut self.data[r * cols..(r + 1) * cols]
    }
}

impl<T> Index<(usize, usize)> for Plane<T> {
    type Output = T;

    fn index(&self, (r, c): (usize, usize)) -> &T {
        &self.data[r * self.cols + c]
    }
}

impl<T> IndexMut<(usize, usize)> for Plane<T> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        &mut self.data[r * self.cols + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_plane_is_zeroed() {
        let p: Plane<f32> = Plane::new(3, 4);
        assert_eq!(p.shape(), (3, 4));
        assert_eq!(p.len(), 12);
        assert!(p.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Plane::from_vec(2, 2, vec![1.0f32; 3]).is_none());
        let p = Plane::from_vec(2, 2, vec![1.0f32, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(p[(1, 0)], 3.0);
        assert_eq!(p.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn index_mut_is_row_major() {
        let mut p: Plane<f32> = Plane::new(2, 3);
        p[(1, 2)] = 7.0;
        assert_eq!(p.as_slice()[5], 7.0);
        p.row_mut(0).fill(1.0);
        assert_eq!(p.as_slice(), &[1.0, 1.0, 1.0, 0.0, 0.0, 7.0]);
    }

    #[test]
    fn zero_resets_samples() {
        let mut p = Plane::from_vec(1, 3, vec![1.0f32, 2.0, 3.0]).unwrap();
        p.zero();
        assert_eq!(p.as_slice(), &[0.0, 0.0, 0.0]);
    }
}
