//! Per-depth reference slowness table.
//!
//! Built once at initialization and read-only afterwards. Level `iz` holds
//! the squared references used for the step from depth `iz` to its
//! neighbour, averaged positionally with level `iz + 1` so the references
//! describe the interval rather than its top.

use plunge_core::{Plane, ReferenceSelector, ReferenceSet, SliceStore};
use tracing::info;

use crate::config::ConfigError;
use crate::error::EngineError;
use crate::slowness::fetch_two_way;

/// Squared reference slownesses for every depth level.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceTable {
    levels: Vec<ReferenceSet>,
}

impl ReferenceTable {
    /// Select references for every depth of `slowness` and average
    /// neighbouring levels.
    ///
    /// Each level is fetched as two-way slowness before selection. A
    /// selector that returns nothing, or more than `max_count`, is a
    /// configuration error.
    pub fn build(
        selector: &dyn ReferenceSelector,
        max_count: usize,
        depth_scale: f32,
        slowness: &dyn SliceStore<f32>,
        verbose: bool,
    ) -> Result<Self, EngineError> {
        let shape = slowness.shape();
        let mut field = Plane::new(shape.rows, shape.cols);
        let mut levels = Vec::with_capacity(shape.slices);

        for iz in 0..shape.slices {
            fetch_two_way(slowness, iz, &mut field)?;
            let refs = selector.select(max_count, depth_scale, field.as_slice());
            if refs.is_empty() {
                return Err(ConfigError::NoReferences { depth: iz }.into());
            }
            if refs.len() > max_count {
                return Err(ConfigError::ReferenceOverflow {
                    depth: iz,
                    count: refs.len(),
                    max: max_count,
                }
                .into());
            }
            if verbose {
                info!(depth = iz, count = refs.len(), "reference slownesses");
            }
            levels.push(refs);
        }

        average_with_next(&mut levels);
        Ok(Self { levels })
    }

    /// Squared references for depth `iz`.
    ///
    /// # Panics
    ///
    /// Panics if `iz` is out of range.
    pub fn level(&self, iz: usize) -> &[f32] {
        &self.levels[iz]
    }

    /// Number of references at depth `iz`.
    pub fn count(&self, iz: usize) -> usize {
        self.levels[iz].len()
    }

    /// Number of depth levels.
    pub fn depths(&self) -> usize {
        self.levels.len()
    }
}

/// `levels[iz][j] = (levels[iz][j] + levels[iz + 1][j]) / 2` for every level
/// but the last, using the un-averaged value of the deeper level.
///
/// Only the shared prefix is averaged when counts differ; trailing entries
/// of the shallower level keep their own values.
fn average_with_next(levels: &mut [ReferenceSet]) {
    for iz in 1..levels.len() {
        let (above, below) = levels.split_at_mut(iz);
        let upper = &mut above[iz - 1];
        let lower = &below[0];
        for (u, &l) in upper.iter_mut().zip(lower.iter()) {
            *u = 0.5 * (*u + l);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plunge_core::{MemoryVolume, VolumeShape};
    use plunge_test_utils::{layered_slowness, FixedReferenceSelector};
    use smallvec::smallvec;

    #[test]
    fn averaging_uses_unaveraged_deeper_level() {
        let mut levels: Vec<ReferenceSet> = vec![smallvec![1.0], smallvec![3.0], smallvec![7.0]];
        average_with_next(&mut levels);
        assert_eq!(levels[0].as_slice(), &[2.0]);
        assert_eq!(levels[1].as_slice(), &[5.0]);
        assert_eq!(levels[2].as_slice(), &[7.0]);
    }

    #[test]
    fn averaging_unequal_counts_uses_shared_prefix() {
        let mut levels: Vec<ReferenceSet> = vec![smallvec![1.0, 2.0, 9.0], smallvec![3.0]];
        average_with_next(&mut levels);
        assert_eq!(levels[0].as_slice(), &[2.0, 2.0, 9.0]);
        assert_eq!(levels[1].as_slice(), &[3.0]);
    }

    #[test]
    fn build_selects_on_two_way_slowness() {
        struct Echo;
        impl ReferenceSelector for Echo {
            fn select(&self, _: usize, _: f32, slowness: &[f32]) -> ReferenceSet {
                smallvec![slowness[0] * slowness[0]]
            }
        }
        let slow = layered_slowness(VolumeShape::new(2, 2, 2), &[0.5, 1.0]);
        let table = ReferenceTable::build(&Echo, 1, 0.0004, &slow, false).unwrap();
        // Two-way 1.0 and 2.0, squared 1.0 and 4.0, level 0 averaged.
        assert_eq!(table.level(0), &[2.5]);
        assert_eq!(table.level(1), &[4.0]);
        assert_eq!(table.depths(), 2);
    }

    #[test]
    fn overflow_is_a_config_error() {
        let slow = MemoryVolume::filled(VolumeShape::new(2, 2, 2), 0.001f32);
        let sel = FixedReferenceSelector::from_slices(&[&[1.0], &[1.0, 2.0]]);
        match ReferenceTable::build(&sel, 1, 0.0004, &slow, false) {
            Err(EngineError::Config(ConfigError::ReferenceOverflow {
                depth: 1,
                count: 2,
                max: 1,
            })) => {}
            other => panic!("expected ReferenceOverflow, got {other:?}"),
        }
    }

    #[test]
    fn empty_selection_is_a_config_error() {
        let slow = MemoryVolume::filled(VolumeShape::new(1, 2, 2), 0.001f32);
        let sel = FixedReferenceSelector::from_slices(&[&[]]);
        match ReferenceTable::build(&sel, 4, 0.0004, &slow, false) {
            Err(EngineError::Config(ConfigError::NoReferences { depth: 0 })) => {}
            other => panic!("expected NoReferences, got {other:?}"),
        }
    }
}
