//! Benchmark profiles for the plunge depth continuation engine.
//!
//! - [`reference_profile`]: 64x64 grid, 32 depths, 16 frequencies, 3 references
//! - [`stress_profile`]: 128x128 grid, 64 depths, 32 frequencies, 5 references
//!
//! Each profile bundles an [`EngineConfig`] with a seeded heterogeneous
//! slowness model and Gaussian surface data.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use num_complex::Complex32;
use plunge_core::{Axis, MemoryVolume};
use plunge_engine::{DepthContinuationEngine, EngineConfig};
use plunge_test_utils::{gaussian_data, random_slowness};

/// Configuration and volumes for one benchmark run.
pub struct Survey {
    /// Engine configuration.
    pub config: EngineConfig,
    /// One-way slowness, one slice per depth.
    pub slowness: MemoryVolume<f32>,
    /// Surface data, one slice per frequency.
    pub data: MemoryVolume<Complex32>,
}

impl Survey {
    /// Build an engine with the stock split-step kernel over this survey.
    pub fn engine(&self) -> DepthContinuationEngine {
        DepthContinuationEngine::split_step(self.config.clone(), Box::new(self.slowness.clone()))
            .unwrap()
    }
}

/// 64x64 grid at 12.5 m, 32 depths of 10 m, 16 frequencies from 10 Hz.
pub fn reference_profile(seed: u64) -> Survey {
    profile(64, 32, 16, 3, seed)
}

/// 128x128 grid at 12.5 m, 64 depths of 10 m, 32 frequencies from 10 Hz.
pub fn stress_profile(seed: u64) -> Survey {
    profile(128, 64, 32, 5, seed)
}

fn profile(n: usize, nz: usize, nw: usize, max_references: usize, seed: u64) -> Survey {
    let grid = Axis::new(n, 0.0, 12.5).unwrap();
    let mut config = EngineConfig::new(
        Axis::new(nz, 0.0, 10.0).unwrap(),
        Axis::new(nw, 10.0, 2.0).unwrap(),
        grid,
        grid,
    );
    config.max_references = max_references;
    config.taper = (n / 8, n / 8);
    config.padding = (n / 4, n / 4);

    Survey {
        slowness: random_slowness(config.slowness_shape(), 0.0005, 0.0001, seed),
        data: gaussian_data(config.data_shape(), n as f32 / 16.0),
        config,
    }
}
