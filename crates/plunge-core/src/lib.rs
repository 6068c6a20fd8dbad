//! Core types and traits for plunge depth continuation.
//!
//! This is the leaf crate of the workspace. It defines sampling axes and
//! geometry, flat 2-D [`Plane`] buffers, slice-addressable volume storage,
//! the collaborator traits the engine drives, and the shared error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod axis;
pub mod error;
pub mod geometry;
pub mod plane;
pub mod store;
pub mod traits;

pub use axis::{Axis, AxisError};
pub use error::{KernelError, StorageError};
pub use geometry::Geometry;
pub use num_complex::Complex32;
pub use plane::Plane;
pub use store::{FileVolume, MemoryVolume, Sample, SliceStore, VolumeShape};
pub use traits::{Extrapolator, ReferenceSelector, ReferenceSet};
