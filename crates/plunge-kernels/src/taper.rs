//! Cosine edge taper for wavefield slices.
//!
//! Damps the outermost samples of a slice so energy reaching the grid edge
//! does not wrap around through the periodic FFT. The `k`-th sample from
//! an edge (`k < t`) is scaled by
//!
//! ```text
//! gain[k] = (1 + sin(π/2 · k / t)) / 2
//! ```
//!
//! Applying the taper twice squares the gains; it is not idempotent.

use num_complex::Complex32;
use plunge_core::Plane;

/// Precomputed edge gains for a `rows x cols` slice.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialTaper {
    rows: usize,
    cols: usize,
    row_gain: Vec<f32>,
    col_gain: Vec<f32>,
}

impl SpatialTaper {
    /// Precompute gains. Taper sizes are clamped to `n - 1` per direction.
    pub fn new(rows: usize, cols: usize, taper_rows: usize, taper_cols: usize) -> Self {
        let taper_rows = taper_rows.min(rows.saturating_sub(1));
        let taper_cols = taper_cols.min(cols.saturating_sub(1));
        Self {
            rows,
            cols,
            row_gain: gains(taper_rows),
            col_gain: gains(taper_cols),
        }
    }

    /// Effective `(rows, cols)` taper widths.
    pub fn widths(&self) -> (usize, usize) {
        (self.row_gain.len(), self.col_gain.len())
    }

    /// Slice shape this taper was built for.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Scale the edges of `field` in place.
    ///
    /// `along_rows` damps the first/last rows, `along_cols` the first/last
    /// columns.
    ///
    /// # Panics
    ///
    /// Panics if `field` does not have the taper's shape.
    pub fn apply(&self, along_rows: bool, along_cols: bool, field: &mut Plane<Complex32>) {
        assert_eq!(field.shape(), (self.rows, self.cols), "taper shape mismatch");

        if along_cols {
            for r in 0..self.rows {
                let row = field.row_mut(r);
                for (k, &g) in self.col_gain.iter().enumerate() {
                    row[k] *= g;
                    row[self.cols - 1 - k] *= g;
                }
            }
        }
        if along_rows {
            for (k, &g) in self.row_gain.iter().enumerate() {
                for v in field.row_mut(k) {
                    *v *= g;
                }
                for v in field.row_mut(self.rows - 1 - k) {
                    *v *= g;
                }
            }
        }
    }
}

fn gains(width: usize) -> Vec<f32> {
    (0..width)
        .map(|k| {
            let x = std::f32::consts::FRAC_PI_2 * k as f32 / width as f32;
            0.5 * (1.0 + x.sin())
        })
        .collect()
}
