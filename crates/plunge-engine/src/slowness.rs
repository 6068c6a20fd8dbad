//! Two-level resident slowness.

use plunge_core::{Plane, SliceStore, StorageError};

/// Read depth slice `iz` of a one-way slowness source into `out` and
/// double it in place, giving the two-way zero-offset slowness.
pub fn fetch_two_way(
    source: &dyn SliceStore<f32>,
    iz: usize,
    out: &mut Plane<f32>,
) -> Result<(), StorageError> {
    source.get(iz, out)?;
    for s in out.as_mut_slice() {
        *s *= 2.0;
    }
    Ok(())
}

/// The slowness at the level the wavefield sits on (`current`) and at the
/// level it is about to move to (`next`).
///
/// After a depth step the caller [`rotate`](SlownessPair::rotate)s so the
/// level just reached becomes `current`, without copying.
#[derive(Clone, Debug)]
pub struct SlownessPair {
    current: Plane<f32>,
    next: Plane<f32>,
}

impl SlownessPair {
    /// Zeroed buffers of slowness-grid shape.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            current: Plane::new(rows, cols),
            next: Plane::new(rows, cols),
        }
    }

    /// Load depth `iz` (two-way) as the current level.
    pub fn load_current(
        &mut self,
        source: &dyn SliceStore<f32>,
        iz: usize,
    ) -> Result<(), StorageError> {
        fetch_two_way(source, iz, &mut self.current)
    }

    /// Load depth `iz` (two-way) as the next level.
    pub fn load_next(&mut self, source: &dyn SliceStore<f32>, iz: usize) -> Result<(), StorageError> {
        fetch_two_way(source, iz, &mut self.next)
    }

    /// Swap roles: the next level becomes current.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Two-way slowness at the current level.
    pub fn current(&self) -> &[f32] {
        self.current.as_slice()
    }

    /// Two-way slowness at the next level.
    pub fn next(&self) -> &[f32] {
        self.next.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plunge_core::{MemoryVolume, VolumeShape};

    fn source() -> MemoryVolume<f32> {
        let shape = VolumeShape::new(3, 2, 2);
        MemoryVolume::from_vec(shape, (0..12).map(|i| i as f32 * 0.25).collect()).unwrap()
    }

    #[test]
    fn fetch_doubles_exactly_once() {
        let src = source();
        let mut out = Plane::new(2, 2);
        fetch_two_way(&src, 1, &mut out).unwrap();
        assert_eq!(out.as_slice(), &[2.0, 2.5, 3.0, 3.5]);
        // A second fetch re-reads the source rather than doubling again.
        fetch_two_way(&src, 1, &mut out).unwrap();
        assert_eq!(out.as_slice(), &[2.0, 2.5, 3.0, 3.5]);
    }

    #[test]
    fn rotate_promotes_next() {
        let src = source();
        let mut pair = SlownessPair::new(2, 2);
        pair.load_current(&src, 0).unwrap();
        pair.load_next(&src, 2).unwrap();
        pair.rotate();
        assert_eq!(pair.current(), &[4.0, 4.5, 5.0, 5.5]);
        assert_eq!(pair.next(), &[0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn out_of_range_depth_is_an_error() {
        let src = source();
        let mut pair = SlownessPair::new(2, 2);
        match pair.load_next(&src, 3) {
            Err(StorageError::IndexOutOfRange { index: 3, count: 3 }) => {}
            other => panic!("expected IndexOutOfRange, got {other:?}"),
        }
    }
}
