//! Plunge: zero-offset 3-D split-step depth continuation.
//!
//! This is the top-level facade crate that re-exports the public API of the
//! plunge sub-crates. It migrates surface data into a depth image, models
//! data from an image, redatums data between the top and bottom of the depth
//! axis, and extracts the downward-continued wavefield at every depth.
//!
//! # Quick start
//!
//! ```rust
//! use plunge::prelude::*;
//!
//! let grid = Axis::new(16, 0.0, 10.0).unwrap();
//! let config = EngineConfig::new(
//!     Axis::new(8, 0.0, 10.0).unwrap(),
//!     Axis::new(4, 10.0, 5.0).unwrap(),
//!     grid,
//!     grid,
//! );
//!
//! // Constant 2 km/s one-way slowness, one slice per depth.
//! let slowness = MemoryVolume::filled(config.slowness_shape(), 0.0005f32);
//! let mut data = MemoryVolume::<Complex32>::new(config.data_shape());
//! data.slice_mut(0)[8 * 16 + 8] = Complex32::new(1.0, 0.0);
//!
//! let mut engine = DepthContinuationEngine::split_step(config.clone(), Box::new(slowness)).unwrap();
//! let mut scratch = engine.alloc_image_scratch();
//! let mut image = MemoryVolume::<f32>::new(config.image_shape());
//! let report = engine.migrate(&mut scratch, &data, &mut image).unwrap();
//! assert_eq!(report.frequencies, 4);
//! engine.close();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `plunge-core` | Axes, geometry, planes, volume storage, kernel traits |
//! | [`kernels`] | `plunge-kernels` | Split-step extrapolator, reference selection, taper, FFT |
//! | [`engine`] | `plunge-engine` | The depth continuation engine and its configuration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`plunge-core`).
///
/// Sampling axes, [`types::Geometry`], [`types::Plane`] buffers, the
/// [`types::SliceStore`] volume abstraction with in-memory and file-backed
/// implementations, and the [`types::Extrapolator`] and
/// [`types::ReferenceSelector`] extension points.
pub use plunge_core as types;

/// Stock numeric kernels (`plunge-kernels`).
///
/// [`kernels::SplitStepExtrapolator`] performs one extended split-step depth
/// step; [`kernels::QuantileReferenceSelector`] picks per-depth reference
/// slownesses.
pub use plunge_kernels as kernels;

/// Depth continuation engine (`plunge-engine`).
///
/// [`engine::DepthContinuationEngine`] drives an extrapolator over frequency
/// and depth, configured by [`engine::EngineConfig`].
pub use plunge_engine as engine;

/// Common imports for typical plunge usage.
///
/// ```rust
/// use plunge::prelude::*;
/// ```
pub mod prelude {
    // Core types and storage
    pub use plunge_core::{
        Axis, Complex32, FileVolume, Geometry, MemoryVolume, Plane, SliceStore, VolumeShape,
    };

    // Extension points
    pub use plunge_core::{Extrapolator, ReferenceSelector, ReferenceSet};

    // Errors
    pub use plunge_core::{AxisError, KernelError, StorageError};
    pub use plunge_engine::{ConfigError, EngineError};

    // Kernels
    pub use plunge_kernels::{QuantileReferenceSelector, SplitStepExtrapolator};

    // Engine
    pub use plunge_engine::{
        DepthContinuationEngine, Direction, EngineConfig, ImageScratch, Operation, RunReport,
    };
}
