//! Quantile-based reference slowness selection.

use plunge_core::{ReferenceSelector, ReferenceSet};

/// Picks references at evenly spaced quantiles of the slowness field.
///
/// The number of candidates is `min(max_count, 1 + ⌊(smax − smin) / ds⌋)`,
/// so a laterally homogeneous level always gets a single reference.
/// Candidate `j` of `n` is the `(j + 0.5) / n` quantile; a candidate closer
/// than `ds` to the previously kept one is dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuantileReferenceSelector;

impl QuantileReferenceSelector {
    /// Create a selector.
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceSelector for QuantileReferenceSelector {
    fn select(&self, max_count: usize, depth_scale: f32, slowness: &[f32]) -> ReferenceSet {
        let mut refs = ReferenceSet::new();
        if slowness.is_empty() || max_count == 0 {
            return refs;
        }

        let mut sorted = slowness.to_vec();
        sorted.sort_by(f32::total_cmp);
        let n = sorted.len();
        let (smin, smax) = (sorted[0], sorted[n - 1]);

        let candidates = if depth_scale > 0.0 {
            let spread = ((smax - smin) / depth_scale).floor();
            if spread.is_finite() && spread >= 0.0 {
                (spread as usize).saturating_add(1).min(max_count)
            } else {
                max_count
            }
        } else {
            max_count
        };

        let mut last: Option<f32> = None;
        for j in 0..candidates {
            let q = (j as f32 + 0.5) / candidates as f32;
            let s = sorted[((q * n as f32) as usize).min(n - 1)];
            if last.is_none_or(|prev| (s - prev).abs() > depth_scale) {
                refs.push(s * s);
                last = Some(s);
            }
        }
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn homogeneous_field_gives_one_reference() {
        let refs = QuantileReferenceSelector.select(8, 0.0004, &[0.001; 25]);
        assert_eq!(refs.len(), 1);
        assert!((refs[0] - 1e-6).abs() < 1e-12);
    }

    #[test]
    fn max_count_one_caps_heterogeneous_field() {
        let field: Vec<f32> = (0..100).map(|i| 0.0005 + i as f32 * 1e-5).collect();
        let refs = QuantileReferenceSelector.select(1, 1e-5, &field);
        assert_eq!(refs.len(), 1);
        // The single reference is the median.
        let median = field[50];
        assert!((refs[0] - median * median).abs() < 1e-10);
    }

    #[test]
    fn spread_field_gets_several_sorted_references() {
        let field: Vec<f32> = (0..64).map(|i| 0.0004 + (i % 8) as f32 * 1e-4).collect();
        let refs = QuantileReferenceSelector.select(4, 5e-5, &field);
        assert_eq!(refs.len(), 4);
        assert!(refs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn nearby_candidates_are_merged() {
        // Two clusters far apart, each internally tighter than ds.
        let mut field = vec![0.001f32; 50];
        field.extend(std::iter::repeat_n(0.002f32, 50));
        let refs = QuantileReferenceSelector.select(8, 0.0004, &field);
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn selection_is_deterministic() {
        let field: Vec<f32> = (0..40).map(|i| 0.0005 + ((i * 7) % 13) as f32 * 3e-5).collect();
        let a = QuantileReferenceSelector.select(6, 2e-5, &field);
        let b = QuantileReferenceSelector.select(6, 2e-5, &field);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn never_exceeds_max_count(
            field in prop::collection::vec(1e-4f32..5e-3, 1..200),
            max_count in prop_oneof![Just(1usize), Just(64usize), 1usize..16],
            ds in 1e-6f32..1e-3,
        ) {
            let refs = QuantileReferenceSelector.select(max_count, ds, &field);
            prop_assert!(!refs.is_empty());
            prop_assert!(refs.len() <= max_count);
        }
    }
}
