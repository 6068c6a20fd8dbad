//! Zero-offset split-step depth continuation.
//!
//! Provides [`DepthContinuationEngine`], which drives a pluggable
//! [`Extrapolator`](plunge_core::Extrapolator) over frequency and depth to
//! migrate surface data into a depth image, model data from an image,
//! redatum data between the top and bottom of the depth axis, and extract
//! the wavefield at every depth.
//!
//! Volumes are accessed one slice at a time through
//! [`SliceStore`](plunge_core::SliceStore), so inputs and outputs may live
//! in memory or on disk.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod parallel;
pub mod references;
pub mod report;
pub mod slowness;
mod worker;

pub use config::{ConfigError, EngineConfig};
pub use engine::{DepthContinuationEngine, ImageScratch};
pub use error::EngineError;
pub use parallel::resolved_worker_count;
pub use references::ReferenceTable;
pub use report::{Operation, RunReport};
pub use slowness::{fetch_two_way, SlownessPair};
pub use worker::Direction;
