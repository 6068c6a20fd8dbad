//! In-place 2-D FFTs over row-major planes.

use std::fmt;
use std::sync::Arc;

use num_complex::Complex32;
use rustfft::{Fft, FftDirection, FftPlanner};

/// Cached forward/inverse plans and scratch for one `rows x cols` grid.
///
/// The inverse transform is normalized by `1 / (rows * cols)`, so
/// `forward` followed by `inverse` is the identity.
#[derive(Clone)]
pub struct Fft2 {
    rows: usize,
    cols: usize,
    row_fwd: Arc<dyn Fft<f32>>,
    row_inv: Arc<dyn Fft<f32>>,
    col_fwd: Arc<dyn Fft<f32>>,
    col_inv: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
    column: Vec<Complex32>,
}

impl fmt::Debug for Fft2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft2")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

impl Fft2 {
    /// Plan transforms for a `rows x cols` grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::new();
        let row_fwd = planner.plan_fft(cols, FftDirection::Forward);
        let row_inv = planner.plan_fft(cols, FftDirection::Inverse);
        let col_fwd = planner.plan_fft(rows, FftDirection::Forward);
        let col_inv = planner.plan_fft(rows, FftDirection::Inverse);

        let scratch_len = [&row_fwd, &row_inv, &col_fwd, &col_inv]
            .iter()
            .map(|p| p.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);

        Self {
            rows,
            cols,
            row_fwd,
            row_inv,
            col_fwd,
            col_inv,
            scratch: vec![Complex32::new(0.0, 0.0); scratch_len],
            column: vec![Complex32::new(0.0, 0.0); rows],
        }
    }

    /// `(rows, cols)` this workspace was planned for.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// In-place forward transform. `data.len()` must be `rows * cols`.
    pub fn forward(&mut self, data: &mut [Complex32]) {
        let (row, col) = (Arc::clone(&self.row_fwd), Arc::clone(&self.col_fwd));
        self.transform(data, &*row, &*col);
    }

    /// In-place normalized inverse transform.
    pub fn inverse(&mut self, data: &mut [Complex32]) {
        let (row, col) = (Arc::clone(&self.row_inv), Arc::clone(&self.col_inv));
        self.transform(data, &*row, &*col);
        let norm = 1.0 / (self.rows * self.cols) as f32;
        for v in data.iter_mut() {
            *v *= norm;
        }
    }

    fn transform(&mut self, data: &mut [Complex32], row: &dyn Fft<f32>, col: &dyn Fft<f32>) {
        debug_assert_eq!(data.len(), self.rows * self.cols);

        // All rows at once: rustfft processes consecutive chunks of `cols`.
        row.process_with_scratch(data, &mut self.scratch);

        for c in 0..self.cols {
            for r in 0..self.rows {
                self.column[r] = data[r * self.cols + c];
            }
            col.process_with_scratch(&mut self.column, &mut self.scratch);
            for r in 0..self.rows {
                data[r * self.cols + c] = self.column[r];
            }
        }
    }
}

/// Signed wavenumber (rad per unit length) of FFT bin `j` on an
/// `n`-point axis with sample spacing `d`.
pub fn wavenumber(j: usize, n: usize, d: f32) -> f32 {
    let signed = if j <= n / 2 {
        j as f32
    } else {
        j as f32 - n as f32
    };
    2.0 * std::f32::consts::PI * signed / (n as f32 * d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_err(a: &[Complex32], b: &[Complex32]) -> f32 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f32::max)
    }

    #[test]
    fn forward_then_inverse_is_identity() {
        let mut fft = Fft2::new(4, 6);
        let original: Vec<Complex32> = (0..24)
            .map(|i| Complex32::new((i as f32).sin(), (i as f32 * 0.3).cos()))
            .collect();
        let mut data = original.clone();
        fft.forward(&mut data);
        fft.inverse(&mut data);
        assert!(max_err(&data, &original) < 1e-5);
    }

    #[test]
    fn constant_plane_transforms_to_dc_only() {
        let mut fft = Fft2::new(3, 5);
        let mut data = vec![Complex32::new(2.0, 0.0); 15];
        fft.forward(&mut data);
        assert!((data[0] - Complex32::new(30.0, 0.0)).norm() < 1e-4);
        assert!(data[1..].iter().all(|v| v.norm() < 1e-4));
    }

    #[test]
    fn wavenumbers_wrap_past_nyquist() {
        let d = 10.0;
        assert_eq!(wavenumber(0, 8, d), 0.0);
        assert!(wavenumber(4, 8, d) > 0.0);
        assert!(wavenumber(5, 8, d) < 0.0);
        assert!((wavenumber(7, 8, d) + wavenumber(1, 8, d)).abs() < 1e-7);
    }

    #[test]
    fn clone_shares_plans_but_not_scratch() {
        let mut a = Fft2::new(2, 2);
        let mut b = a.clone();
        let mut x = vec![Complex32::new(1.0, 0.0); 4];
        let mut y = x.clone();
        a.forward(&mut x);
        b.forward(&mut y);
        assert_eq!(x, y);
    }
}
