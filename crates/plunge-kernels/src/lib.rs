//! Reference numeric kernels for plunge depth continuation.
//!
//! Stock implementations of the collaborators the engine drives:
//!
//! 1. [`SplitStepExtrapolator`]: one extended split-step depth step
//! 2. [`QuantileReferenceSelector`]: per-depth reference slowness set
//! 3. [`SpatialTaper`]: cosine edge damping of wavefield slices
//!
//! plus the [`Fft2`] workspace the extrapolator is built on.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fft;
pub mod reference;
pub mod ssr;
pub mod taper;

pub use fft::Fft2;
pub use reference::QuantileReferenceSelector;
pub use ssr::SplitStepExtrapolator;
pub use taper::SpatialTaper;
