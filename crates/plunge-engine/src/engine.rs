//! The depth continuation engine.
//!
//! [`DepthContinuationEngine`] is the user-facing API. It is built once per
//! survey geometry and slowness model, then runs any number of
//! operations: [`migrate`](DepthContinuationEngine::migrate),
//! [`model`](DepthContinuationEngine::model),
//! [`redatum`](DepthContinuationEngine::redatum) and
//! [`extract_wavefield`](DepthContinuationEngine::extract_wavefield).
//!
//! # Ownership model
//!
//! The engine owns the slowness source, the extrapolator and all resident
//! buffers. Input and output volumes are borrowed per call. Operations take
//! `&mut self` because they reuse the resident wavefield.
//!
//! # Shutdown
//!
//! [`close()`](DepthContinuationEngine::close) releases the extrapolator
//! and then the resident buffers. Dropping the engine does the same.
//! An [`ImageScratch`] is independent of the engine and is freed by
//! dropping it.

use std::time::Instant;

use num_complex::Complex32;
use plunge_core::{
    Extrapolator, Geometry, Plane, ReferenceSelector, SliceStore, StorageError, VolumeShape,
};
use plunge_kernels::{QuantileReferenceSelector, SpatialTaper, SplitStepExtrapolator};
use tracing::debug;

use crate::config::{ConfigError, EngineConfig};
use crate::error::EngineError;
use crate::references::ReferenceTable;
use crate::report::{Operation, RunReport};
use crate::worker::{Direction, FrequencyWorker, Plan, Shared};

// Compile-time assertion: the engine can move to another thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<DepthContinuationEngine>();
    }
};

// ── ImageScratch ───────────────────────────────────────────────────

/// Reusable buffer for reading and updating one image slice.
///
/// Allocated by
/// [`alloc_image_scratch()`](DepthContinuationEngine::alloc_image_scratch)
/// and passed to [`migrate`](DepthContinuationEngine::migrate) and
/// [`model`](DepthContinuationEngine::model). One scratch can serve many
/// calls.
#[derive(Clone, Debug)]
pub struct ImageScratch {
    pub(crate) slice: Plane<f32>,
}

impl ImageScratch {
    /// `(rows, cols)` of the buffer.
    pub fn shape(&self) -> (usize, usize) {
        self.slice.shape()
    }
}

// ── DepthContinuationEngine ────────────────────────────────────────

/// Zero-offset split-step depth continuation over a fixed geometry and
/// slowness model.
///
/// # Example
///
/// ```ignore
/// let mut engine = DepthContinuationEngine::split_step(config, Box::new(slowness))?;
/// let mut scratch = engine.alloc_image_scratch();
/// engine.migrate(&mut scratch, &data, &mut image)?;
/// engine.close();
/// ```
pub struct DepthContinuationEngine {
    pub(crate) config: EngineConfig,
    pub(crate) plan: Plan,
    pub(crate) slowness: Box<dyn SliceStore<f32>>,
    pub(crate) worker: FrequencyWorker,
}

impl DepthContinuationEngine {
    /// Validate `config`, initialize `extrapolator` and precompute the
    /// taper and the per-depth reference table.
    ///
    /// `slowness` must hold one one-way slowness slice per depth on the
    /// slowness grid.
    pub fn new(
        config: EngineConfig,
        slowness: Box<dyn SliceStore<f32>>,
        mut extrapolator: Box<dyn Extrapolator>,
        selector: &dyn ReferenceSelector,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let expected = config.slowness_shape();
        if slowness.shape() != expected {
            return Err(ConfigError::SlownessShapeMismatch {
                expected,
                actual: slowness.shape(),
            }
            .into());
        }

        let geometry = config.geometry();
        extrapolator.initialize(&geometry)?;

        let (rows, cols) = geometry.data_shape();
        let (taper_rows, taper_cols) = geometry.clamped_taper();
        let taper = SpatialTaper::new(rows, cols, taper_rows, taper_cols);

        let references = ReferenceTable::build(
            selector,
            config.max_references,
            geometry.depth_time_scale,
            &*slowness,
            config.verbose,
        )?;

        let worker = FrequencyWorker::new(&geometry, extrapolator);
        debug!(
            extrapolator = worker.extrapolator_name(),
            depths = geometry.depth.n(),
            frequencies = geometry.frequency.n(),
            "engine initialized"
        );

        Ok(Self {
            plan: Plan {
                geometry,
                references,
                taper,
                eps: config.eps,
                verbose: config.verbose,
            },
            config,
            slowness,
            worker,
        })
    }

    /// [`new`](Self::new) with the stock split-step extrapolator and
    /// quantile reference selector.
    pub fn split_step(
        config: EngineConfig,
        slowness: Box<dyn SliceStore<f32>>,
    ) -> Result<Self, EngineError> {
        Self::new(
            config,
            slowness,
            Box::new(SplitStepExtrapolator::new()),
            &QuantileReferenceSelector::new(),
        )
    }

    /// Release the extrapolator, then the resident buffers.
    pub fn close(mut self) {
        self.worker.release();
        debug!("engine closed");
    }

    /// The configuration the engine was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Geometry with the angular frequency axis.
    pub fn geometry(&self) -> &Geometry {
        &self.plan.geometry
    }

    /// Averaged squared reference slownesses per depth.
    pub fn references(&self) -> &ReferenceTable {
        &self.plan.references
    }

    /// A fresh image scratch of data-grid shape.
    pub fn alloc_image_scratch(&self) -> ImageScratch {
        let (rows, cols) = self.plan.geometry.data_shape();
        ImageScratch {
            slice: Plane::new(rows, cols),
        }
    }

    /// Downward continuation with imaging: `image[iz] = Σ_w Re(wavefield_w(iz))`.
    ///
    /// Every image slice is zeroed first. Each data slice is tapered twice
    /// before the first depth step.
    pub fn migrate(
        &mut self,
        scratch: &mut ImageScratch,
        data: &dyn SliceStore<Complex32>,
        image: &mut dyn SliceStore<f32>,
    ) -> Result<RunReport, EngineError> {
        let started = Instant::now();
        expect_shape("data", data.shape(), self.config.data_shape())?;
        expect_shape("image", image.shape(), self.config.image_shape())?;
        self.check_scratch(scratch)?;

        let mut report = RunReport::new(Operation::Migrate);
        zero_image(image, &mut scratch.slice, &mut report)?;

        let shared = Shared {
            plan: &self.plan,
            slowness: &*self.slowness,
        };
        let mut image_updates = 0u64;
        for iw in 0..self.plan.frequencies() {
            self.worker
                .migrate_frequency(shared, iw, data, &mut report, |iz, field| {
                    let values = field.as_slice().iter().map(|c| c.re);
                    accumulate(image, &mut scratch.slice, iz, values)?;
                    image_updates += 1;
                    Ok(())
                })?;
        }
        report.slices_read += image_updates;
        report.slices_written += image_updates;
        Ok(finish(report, started))
    }

    /// Upward continuation injecting the image at every depth; writes one
    /// data slice per frequency.
    ///
    /// Approximate counterpart of [`migrate`](Self::migrate), not its exact
    /// adjoint.
    pub fn model(
        &mut self,
        scratch: &mut ImageScratch,
        image: &dyn SliceStore<f32>,
        data: &mut dyn SliceStore<Complex32>,
    ) -> Result<RunReport, EngineError> {
        let started = Instant::now();
        expect_shape("image", image.shape(), self.config.image_shape())?;
        expect_shape("data", data.shape(), self.config.data_shape())?;
        self.check_scratch(scratch)?;

        let mut report = RunReport::new(Operation::Model);
        let shared = Shared {
            plan: &self.plan,
            slowness: &*self.slowness,
        };
        for iw in 0..self.plan.frequencies() {
            self.worker
                .model_frequency(shared, iw, image, &mut scratch.slice, data, &mut report)?;
        }
        Ok(finish(report, started))
    }

    /// [`migrate`](Self::migrate) for [`Direction::Downward`],
    /// [`model`](Self::model) for [`Direction::Upward`].
    pub fn continue_image(
        &mut self,
        direction: Direction,
        scratch: &mut ImageScratch,
        data: &mut dyn SliceStore<Complex32>,
        image: &mut dyn SliceStore<f32>,
    ) -> Result<RunReport, EngineError> {
        match direction {
            Direction::Downward => self.migrate(scratch, &*data, image),
            Direction::Upward => self.model(scratch, &*image, data),
        }
    }

    /// Move data between the top and bottom of the depth axis without
    /// imaging.
    ///
    /// [`Direction::Upward`] reads `bottom` and writes `top`;
    /// [`Direction::Downward`] reads `top` and writes `bottom`. The
    /// wavefield is tapered once before and once after the sweep.
    pub fn redatum(
        &mut self,
        direction: Direction,
        top: &mut dyn SliceStore<Complex32>,
        bottom: &mut dyn SliceStore<Complex32>,
    ) -> Result<RunReport, EngineError> {
        let started = Instant::now();
        expect_shape("top", top.shape(), self.config.data_shape())?;
        expect_shape("bottom", bottom.shape(), self.config.data_shape())?;

        let mut report = RunReport::new(match direction {
            Direction::Upward => Operation::RedatumUp,
            Direction::Downward => Operation::RedatumDown,
        });
        let shared = Shared {
            plan: &self.plan,
            slowness: &*self.slowness,
        };
        for iw in 0..self.plan.frequencies() {
            match direction {
                Direction::Upward => self.worker.redatum_frequency(
                    shared,
                    direction,
                    iw,
                    &*bottom,
                    &mut *top,
                    &mut report,
                )?,
                Direction::Downward => self.worker.redatum_frequency(
                    shared,
                    direction,
                    iw,
                    &*top,
                    &mut *bottom,
                    &mut report,
                )?,
            }
        }
        Ok(finish(report, started))
    }

    /// Downward-continued wavefield at every depth for every frequency.
    ///
    /// `wavefield` must have `nw * nz` slices; slice `iw * nz + iz` holds
    /// frequency `iw` at depth `iz`.
    pub fn extract_wavefield(
        &mut self,
        data: &dyn SliceStore<Complex32>,
        wavefield: &mut dyn SliceStore<Complex32>,
    ) -> Result<RunReport, EngineError> {
        let started = Instant::now();
        expect_shape("data", data.shape(), self.config.data_shape())?;
        expect_shape("wavefield", wavefield.shape(), self.config.wavefield_shape())?;

        let mut report = RunReport::new(Operation::ExtractWavefield);
        let shared = Shared {
            plan: &self.plan,
            slowness: &*self.slowness,
        };
        for iw in 0..self.plan.frequencies() {
            self.worker
                .extract_frequency(shared, iw, data, wavefield, &mut report)?;
        }
        Ok(finish(report, started))
    }

    pub(crate) fn check_scratch(&self, scratch: &ImageScratch) -> Result<(), StorageError> {
        let expected = self.plan.geometry.data_shape();
        if scratch.shape() != expected {
            return Err(StorageError::ShapeMismatch {
                expected,
                actual: scratch.shape(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for DepthContinuationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepthContinuationEngine")
            .field("extrapolator", &self.worker.extrapolator_name())
            .field("depths", &self.plan.depths())
            .field("frequencies", &self.plan.frequencies())
            .field("data_shape", &self.plan.geometry.data_shape())
            .field("eps", &self.plan.eps)
            .finish()
    }
}

/// Check a borrowed volume against the shape an operation requires.
pub(crate) fn expect_shape(
    volume: &'static str,
    actual: VolumeShape,
    expected: VolumeShape,
) -> Result<(), StorageError> {
    if actual.slices != expected.slices {
        return Err(StorageError::SliceCountMismatch {
            volume,
            expected: expected.slices,
            actual: actual.slices,
        });
    }
    if actual.plane() != expected.plane() {
        return Err(StorageError::ShapeMismatch {
            expected: expected.plane(),
            actual: actual.plane(),
        });
    }
    Ok(())
}

pub(crate) fn zero_image(
    image: &mut dyn SliceStore<f32>,
    buf: &mut Plane<f32>,
    report: &mut RunReport,
) -> Result<(), StorageError> {
    buf.zero();
    for iz in 0..image.shape().slices {
        image.put(iz, buf)?;
        report.slices_written += 1;
    }
    Ok(())
}

/// Read image slice `iz`, add `values` sample by sample, write it back.
pub(crate) fn accumulate(
    image: &mut dyn SliceStore<f32>,
    buf: &mut Plane<f32>,
    iz: usize,
    values: impl Iterator<Item = f32>,
) -> Result<(), StorageError> {
    image.get(iz, buf)?;
    for (dst, v) in buf.as_mut_slice().iter_mut().zip(values) {
        *dst += v;
    }
    image.put(iz, buf)
}

pub(crate) fn finish(mut report: RunReport, started: Instant) -> RunReport {
    report.elapsed_us = started.elapsed().as_micros() as u64;
    debug!(
        operation = %report.operation,
        frequencies = report.frequencies,
        steps = report.extrapolation_steps,
        elapsed_us = report.elapsed_us,
        "operation finished"
    );
    report
}
