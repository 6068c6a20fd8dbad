//! Survey geometry shared by the engine and its collaborators.

use crate::axis::Axis;

/// Grid geometry for one depth-continuation run.
///
/// Built by the engine at initialization and handed to the extrapolator.
/// The frequency axis is always in angular units (rad/s) here.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    /// Depth axis (m).
    pub depth: Axis,
    /// Angular frequency axis (rad/s).
    pub frequency: Axis,
    /// In-line axis of the data grid.
    pub data_x: Axis,
    /// Cross-line axis of the data grid.
    pub data_y: Axis,
    /// In-line axis of the slowness grid.
    pub slow_x: Axis,
    /// Cross-line axis of the slowness grid.
    pub slow_y: Axis,
    /// Extra wavenumber-domain padding `(x, y)` in samples.
    pub padding: (usize, usize),
    /// Requested edge taper sizes `(x, y)` in samples (unclamped).
    pub taper: (usize, usize),
    /// Time step over depth step, `dt / dz`.
    pub depth_time_scale: f32,
}

impl Geometry {
    /// `(rows, cols)` of a data-grid slice: `(ny, nx)`.
    pub fn data_shape(&self) -> (usize, usize) {
        (self.data_y.n(), self.data_x.n())
    }

    /// `(rows, cols)` of a slowness-grid slice.
    pub fn slowness_shape(&self) -> (usize, usize) {
        (self.slow_y.n(), self.slow_x.n())
    }

    /// `(rows, cols)` of the padded wavenumber grid.
    pub fn padded_shape(&self) -> (usize, usize) {
        (self.data_y.n() + self.padding.1, self.data_x.n() + self.padding.0)
    }

    /// Samples in one data-grid slice.
    pub fn data_len(&self) -> usize {
        self.data_y.n() * self.data_x.n()
    }

    /// Taper sizes `(rows, cols)` clamped to at most `n - 1` per direction.
    pub fn clamped_taper(&self) -> (usize, usize) {
        (
            self.taper.1.min(self.data_y.n() - 1),
            self.taper.0.min(self.data_x.n() - 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(nx: usize, ny: usize, taper: (usize, usize)) -> Geometry {
        let a = |n| Axis::new(n, 0.0, 10.0).unwrap();
        Geometry {
            depth: a(4),
            frequency: a(2).to_angular(),
            data_x: a(nx),
            data_y: a(ny),
            slow_x: a(nx),
            slow_y: a(ny),
            padding: (3, 1),
            taper,
            depth_time_scale: 0.0004,
        }
    }

    #[test]
    fn shapes_are_row_major_y_by_x() {
        let g = geometry(6, 4, (0, 0));
        assert_eq!(g.data_shape(), (4, 6));
        assert_eq!(g.padded_shape(), (5, 9));
        assert_eq!(g.data_len(), 24);
    }

    #[test]
    fn taper_is_clamped_below_axis_length() {
        let g = geometry(3, 5, (10, 2));
        assert_eq!(g.clamped_taper(), (2, 2));
        let g = geometry(1, 1, (4, 4));
        assert_eq!(g.clamped_taper(), (0, 0));
    }
}
