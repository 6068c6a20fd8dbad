//! Reusable volume fixtures.
//!
//! - [`constant_slowness`]: the same one-way slowness everywhere.
//! - [`layered_slowness`]: one value per depth level.
//! - [`random_slowness`]: seeded lateral jitter around a base value.
//! - [`impulse_data`] / [`gaussian_data`]: surface data volumes.

use num_complex::Complex32;
use plunge_core::{Axis, MemoryVolume, VolumeShape};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Axes for a small survey: `nz` depths of `dz`, `nw` frequencies starting
/// at `f0` Hz spaced `df`, and an `n x n` grid of spacing `dx`.
#[derive(Clone, Copy, Debug)]
pub struct TestAxes {
    pub depth: Axis,
    pub frequency: Axis,
    pub x: Axis,
    pub y: Axis,
}

pub fn test_axes(nz: usize, dz: f32, nw: usize, f0: f32, df: f32, n: usize, dx: f32) -> TestAxes {
    TestAxes {
        depth: Axis::new(nz, 0.0, dz).unwrap(),
        frequency: Axis::new(nw, f0, df).unwrap(),
        x: Axis::new(n, 0.0, dx).unwrap(),
        y: Axis::new(n, 0.0, dx).unwrap(),
    }
}

/// A slowness volume holding `value` at every sample.
pub fn constant_slowness(shape: VolumeShape, value: f32) -> MemoryVolume<f32> {
    MemoryVolume::filled(shape, value)
}

/// One constant value per depth slice. `values.len()` must equal `shape.slices`.
pub fn layered_slowness(shape: VolumeShape, values: &[f32]) -> MemoryVolume<f32> {
    assert_eq!(values.len(), shape.slices, "one value per depth slice");
    let mut vol = MemoryVolume::new(shape);
    for (iz, &v) in values.iter().enumerate() {
        vol.slice_mut(iz).fill(v);
    }
    vol
}

/// `base` plus uniform jitter in `[-jitter, jitter)`, reproducible from `seed`.
pub fn random_slowness(shape: VolumeShape, base: f32, jitter: f32, seed: u64) -> MemoryVolume<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let data = (0..shape.slices * shape.slice_len())
        .map(|_| base + rng.random_range(-jitter..jitter))
        .collect();
    MemoryVolume::from_vec(shape, data).unwrap()
}

/// A data volume that is zero except for `amplitude` at `(row, col)` of
/// frequency slice `iw`.
pub fn impulse_data(
    shape: VolumeShape,
    iw: usize,
    row: usize,
    col: usize,
    amplitude: f32,
) -> MemoryVolume<Complex32> {
    let mut vol = MemoryVolume::new(shape);
    vol.slice_mut(iw)[row * shape.cols + col] = Complex32::new(amplitude, 0.0);
    vol
}

/// Every frequency slice holds the same centred Gaussian bump of width
/// `sigma` samples.
pub fn gaussian_data(shape: VolumeShape, sigma: f32) -> MemoryVolume<Complex32> {
    let (cr, cc) = (
        (shape.rows as f32 - 1.0) / 2.0,
        (shape.cols as f32 - 1.0) / 2.0,
    );
    let mut vol = MemoryVolume::new(shape);
    for iw in 0..shape.slices {
        for (i, v) in vol.slice_mut(iw).iter_mut().enumerate() {
            let r = (i / shape.cols) as f32 - cr;
            let c = (i % shape.cols) as f32 - cc;
            *v = Complex32::new((-(r * r + c * c) / (2.0 * sigma * sigma)).exp(), 0.0);
        }
    }
    vol
}
