//! Uniform sampling axes.

use std::f32::consts::PI;
use std::fmt;

/// A uniformly sampled axis: `n` samples starting at `o`, spaced `d` apart.
///
/// Axes are immutable once built. Depth, frequency and the two spatial
/// grids (data and slowness) are all described by an `Axis`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Axis {
    n: usize,
    o: f32,
    d: f32,
}

impl Axis {
    /// Build an axis, rejecting empty axes and non-finite origin/spacing.
    pub fn new(n: usize, o: f32, d: f32) -> Result<Self, AxisError> {
        if n == 0 {
            return Err(AxisError::Empty);
        }
        if !o.is_finite() {
            return Err(AxisError::NonFinite { what: "origin", value: o });
        }
        if !d.is_finite() {
            return Err(AxisError::NonFinite { what: "spacing", value: d });
        }
        Ok(Self { n, o, d })
    }

    /// Number of samples.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Coordinate of the first sample.
    pub fn o(&self) -> f32 {
        self.o
    }

    /// Sample spacing.
    pub fn d(&self) -> f32 {
        self.d
    }

    /// Coordinate of sample `i`. Not bounds-checked.
    pub fn coord(&self, i: usize) -> f32 {
        self.o + i as f32 * self.d
    }

    /// Coordinate of the last sample.
    pub fn last(&self) -> f32 {
        self.coord(self.n - 1)
    }

    /// Index of the sample nearest to `x`, clamped into `[0, n)`.
    pub fn nearest(&self, x: f32) -> usize {
        if self.d == 0.0 {
            return 0;
        }
        let f = ((x - self.o) / self.d).round();
        if f <= 0.0 {
            0
        } else {
            (f as usize).min(self.n - 1)
        }
    }

    /// The same axis with origin and spacing scaled by 2π.
    ///
    /// Converts a linear frequency axis (Hz) to angular frequency (rad/s).
    pub fn to_angular(&self) -> Self {
        Self {
            n: self.n,
            o: self.o * 2.0 * PI,
            d: self.d * 2.0 * PI,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={} o={} d={}", self.n, self.o, self.d)
    }
}

/// Errors from [`Axis::new`].
#[derive(Clone, Debug, PartialEq)]
pub enum AxisError {
    /// The axis has zero samples.
    Empty,
    /// Origin or spacing is NaN or infinite.
    NonFinite {
        /// Which parameter was bad (`"origin"` or `"spacing"`).
        what: &'static str,
        /// The offending value.
        value: f32,
    },
}

impl fmt::Display for AxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "axis must have at least one sample"),
            Self::NonFinite { what, value } => {
                write!(f, "axis {what} must be finite, got {value}")
            }
        }
    }
}

impl std::error::Error for AxisError {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_empty_axis() {
        assert_eq!(Axis::new(0, 0.0, 1.0), Err(AxisError::Empty));
    }

    #[test]
    fn rejects_nan_spacing() {
        match Axis::new(4, 0.0, f32::NAN) {
            Err(AxisError::NonFinite { what: "spacing", .. }) => {}
            other => panic!("expected NonFinite spacing, got {other:?}"),
        }
    }

    #[test]
    fn angular_conversion_scales_origin_and_spacing() {
        let hz = Axis::new(8, 5.0, 2.5).unwrap();
        let w = hz.to_angular();
        assert_eq!(w.n(), 8);
        assert!((w.o() - 5.0 * 2.0 * PI).abs() < 1e-4);
        assert!((w.d() - 2.5 * 2.0 * PI).abs() < 1e-4);
    }

    #[test]
    fn nearest_clamps_out_of_range_coordinates() {
        let a = Axis::new(5, 100.0, 10.0).unwrap();
        assert_eq!(a.nearest(-1000.0), 0);
        assert_eq!(a.nearest(100.0), 0);
        assert_eq!(a.nearest(124.0), 2);
        assert_eq!(a.nearest(126.0), 3);
        assert_eq!(a.nearest(1e6), 4);
    }

    #[test]
    fn last_is_origin_plus_span() {
        let a = Axis::new(11, 0.0, 4.0).unwrap();
        assert_eq!(a.last(), 40.0);
    }

    proptest! {
        #[test]
        fn nearest_of_sample_coord_is_identity(n in 1usize..200, o in -1e3f32..1e3, d in 0.5f32..50.0) {
            let a = Axis::new(n, o, d).unwrap();
            for i in 0..n {
                prop_assert_eq!(a.nearest(a.coord(i)), i);
            }
        }
    }
}
