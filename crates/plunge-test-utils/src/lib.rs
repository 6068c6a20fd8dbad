//! Test utilities and mock collaborators for plunge development.
//!
//! Provides volume fixtures (constant, layered, seeded-random slowness;
//! impulse data), a [`RecordingExtrapolator`] that logs every depth step,
//! a [`FailingExtrapolator`] for error paths,
//! a [`FixedReferenceSelector`] with scripted output, and a
//! [`CountingStore`] wrapper that records slice traffic.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::{
    constant_slowness, gaussian_data, impulse_data, layered_slowness, random_slowness,
    test_axes, TestAxes,
};
pub use mocks::{
    CountingStore, FailingExtrapolator, FixedReferenceSelector, RecordingExtrapolator, StepRecord,
};
