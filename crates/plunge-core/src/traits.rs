//! Collaborator traits driven by the depth continuation engine.
//!
//! The engine owns the recursion over frequency and depth; the numeric
//! depth step and the reference slowness heuristic are pluggable.

use num_complex::Complex32;
use smallvec::SmallVec;

use crate::error::KernelError;
use crate::geometry::Geometry;

/// Squared reference slownesses for one depth level.
///
/// Small enough (typically 1–8 entries) to stay inline.
pub type ReferenceSet = SmallVec<[f32; 8]>;

/// Advances a frequency-domain wavefield by exactly one depth interval.
///
/// # Contract
///
/// - `initialize()` is called once by the engine before any `step()`.
/// - `step()` mutates `wavefield` in place. `current` is the (two-way)
///   slowness at the level the wavefield sits on, `next` the level it is
///   moved to. Both are slowness-grid slices; `wavefield` is a data-grid
///   slice.
/// - `references` holds squared reference slownesses, never empty.
/// - `close()` releases internal resources; `step()` afterwards fails with
///   [`KernelError::NotInitialized`].
///
/// # Object safety
///
/// This trait is object-safe; the engine stores it as
/// `Box<dyn Extrapolator>`.
pub trait Extrapolator: Send {
    /// Human-readable name for logs and errors.
    fn name(&self) -> &str;

    /// Prepare plans and scratch for `geometry`.
    fn initialize(&mut self, geometry: &Geometry) -> Result<(), KernelError>;

    /// Continue `wavefield` one depth step at angular frequency `w`.
    fn step(
        &mut self,
        w: Complex32,
        wavefield: &mut [Complex32],
        current: &[f32],
        next: &[f32],
        references: &[f32],
    ) -> Result<(), KernelError>;

    /// Release internal resources.
    fn close(&mut self);

    /// An independent, already-initialized copy with private scratch.
    ///
    /// Used to give each concurrent frequency worker its own kernel state.
    fn fork(&self) -> Box<dyn Extrapolator>;
}

/// Picks representative slowness values for one depth level.
///
/// # Contract
///
/// - Returns at most `max_count` squared slowness values, at least one.
/// - Deterministic: identical inputs give identical output.
pub trait ReferenceSelector: Send + Sync {
    /// Select squared reference slownesses from a (two-way) slowness field.
    ///
    /// `depth_scale` is the engine's `dt / dz`, used as the minimum
    /// separation between distinct references.
    fn select(&self, max_count: usize, depth_scale: f32, slowness: &[f32]) -> ReferenceSet;
}
