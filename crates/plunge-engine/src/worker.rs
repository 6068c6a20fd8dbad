//! Per-frequency depth recursions.
//!
//! A [`FrequencyWorker`] owns the mutable state of one frequency at a time:
//! the resident wavefield, the two-level slowness and an extrapolator. The
//! read-only state shared by all frequencies lives in [`Plan`]. The
//! sequential engine drives one worker; the parallel migration forks one
//! per thread.

use num_complex::Complex32;
use plunge_core::{Axis, Extrapolator, Geometry, Plane, SliceStore};
use plunge_kernels::SpatialTaper;
use tracing::info;

use crate::error::EngineError;
use crate::references::ReferenceTable;
use crate::report::RunReport;
use crate::slowness::SlownessPair;

/// Direction of continuation, which fixes the sign of the imaginary part
/// of the complex frequency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Toward increasing depth: `w = eps·dω − iω`.
    Downward,
    /// Toward the surface: `w = eps·dω + iω`.
    Upward,
}

impl Direction {
    /// Complex frequency of sample `iw` on an angular `frequency` axis.
    pub fn complex_frequency(self, eps: f32, frequency: &Axis, iw: usize) -> Complex32 {
        let re = eps * frequency.d();
        let omega = frequency.coord(iw);
        match self {
            Self::Downward => Complex32::new(re, -omega),
            Self::Upward => Complex32::new(re, omega),
        }
    }
}

/// Read-only state fixed at initialization.
#[derive(Debug)]
pub(crate) struct Plan {
    pub geometry: Geometry,
    pub references: ReferenceTable,
    pub taper: SpatialTaper,
    pub eps: f32,
    pub verbose: bool,
}

impl Plan {
    pub fn depths(&self) -> usize {
        self.geometry.depth.n()
    }

    pub fn frequencies(&self) -> usize {
        self.geometry.frequency.n()
    }

    fn w(&self, direction: Direction, iw: usize) -> Complex32 {
        direction.complex_frequency(self.eps, &self.geometry.frequency, iw)
    }

    fn progress(&self, iw: usize) {
        if self.verbose {
            info!("iw = {} of {}", iw + 1, self.frequencies());
        }
    }

    fn apply_taper(&self, field: &mut Plane<Complex32>, times: usize) {
        for _ in 0..times {
            self.taper.apply(true, true, field);
        }
    }
}

/// Everything a worker reads but never writes.
#[derive(Clone, Copy)]
pub(crate) struct Shared<'a> {
    pub plan: &'a Plan,
    pub slowness: &'a dyn SliceStore<f32>,
}

pub(crate) struct FrequencyWorker {
    wavefield: Plane<Complex32>,
    slowness: SlownessPair,
    extrapolator: Box<dyn Extrapolator>,
    released: bool,
}

impl FrequencyWorker {
    pub fn new(geometry: &Geometry, extrapolator: Box<dyn Extrapolator>) -> Self {
        let (rows, cols) = geometry.data_shape();
        let (srows, scols) = geometry.slowness_shape();
        Self {
            wavefield: Plane::new(rows, cols),
            slowness: SlownessPair::new(srows, scols),
            extrapolator,
            released: false,
        }
    }

    /// A worker with private scratch and a forked extrapolator.
    pub fn fork(&self, geometry: &Geometry) -> Self {
        Self::new(geometry, self.extrapolator.fork())
    }

    pub fn extrapolator_name(&self) -> &str {
        self.extrapolator.name()
    }

    /// Close the extrapolator. Idempotent.
    pub fn release(&mut self) {
        if !self.released {
            self.extrapolator.close();
            self.released = true;
        }
    }

    /// Data slice `iw` down through every depth, handing the wavefield at
    /// each level to `emit` (depth 0 first).
    pub fn migrate_frequency<F>(
        &mut self,
        shared: Shared<'_>,
        iw: usize,
        data: &dyn SliceStore<Complex32>,
        report: &mut RunReport,
        mut emit: F,
    ) -> Result<(), EngineError>
    where
        F: FnMut(usize, &Plane<Complex32>) -> Result<(), EngineError>,
    {
        let plan = shared.plan;
        plan.progress(iw);
        let w = plan.w(Direction::Downward, iw);

        data.get(iw, &mut self.wavefield)?;
        report.slices_read += 1;
        plan.apply_taper(&mut self.wavefield, 2);
        emit(0, &self.wavefield)?;

        self.sweep(shared, Direction::Downward, w, report, |iz, field, _| {
            emit(iz, &*field)
        })?;
        report.frequencies += 1;
        Ok(())
    }

    /// Build data slice `iw` by injecting every image level on the way up.
    pub fn model_frequency(
        &mut self,
        shared: Shared<'_>,
        iw: usize,
        image: &dyn SliceStore<f32>,
        image_buf: &mut Plane<f32>,
        data: &mut dyn SliceStore<Complex32>,
        report: &mut RunReport,
    ) -> Result<(), EngineError> {
        let plan = shared.plan;
        plan.progress(iw);
        let w = plan.w(Direction::Upward, iw);

        self.wavefield.zero();
        let deepest = plan.depths() - 1;
        inject_image(image, deepest, image_buf, &mut self.wavefield, report)?;
        self.sweep(shared, Direction::Upward, w, report, |iz, field, report| {
            inject_image(image, iz, image_buf, field, report)
        })?;

        plan.apply_taper(&mut self.wavefield, 1);
        data.put(iw, &self.wavefield)?;
        report.slices_written += 1;
        report.frequencies += 1;
        Ok(())
    }

    /// Move data slice `iw` from one end of the depth axis to the other.
    pub fn redatum_frequency(
        &mut self,
        shared: Shared<'_>,
        direction: Direction,
        iw: usize,
        source: &dyn SliceStore<Complex32>,
        target: &mut dyn SliceStore<Complex32>,
        report: &mut RunReport,
    ) -> Result<(), EngineError> {
        let plan = shared.plan;
        plan.progress(iw);
        let w = plan.w(direction, iw);

        source.get(iw, &mut self.wavefield)?;
        report.slices_read += 1;
        plan.apply_taper(&mut self.wavefield, 1);
        self.sweep(shared, direction, w, report, |_, _, _| Ok(()))?;
        plan.apply_taper(&mut self.wavefield, 1);
        target.put(iw, &self.wavefield)?;
        report.slices_written += 1;
        report.frequencies += 1;
        Ok(())
    }

    /// Write the downward-continued wavefield of data slice `iw` at every
    /// depth into slices `iw * nz ..(iw + 1) * nz` of `wavefield`.
    pub fn extract_frequency(
        &mut self,
        shared: Shared<'_>,
        iw: usize,
        data: &dyn SliceStore<Complex32>,
        wavefield: &mut dyn SliceStore<Complex32>,
        report: &mut RunReport,
    ) -> Result<(), EngineError> {
        let plan = shared.plan;
        plan.progress(iw);
        let w = plan.w(Direction::Downward, iw);
        let base = iw * plan.depths();

        data.get(iw, &mut self.wavefield)?;
        report.slices_read += 1;
        plan.apply_taper(&mut self.wavefield, 2);
        wavefield.put(base, &self.wavefield)?;
        report.slices_written += 1;

        self.sweep(shared, Direction::Downward, w, report, |iz, field, report| {
            plan.apply_taper(field, 1);
            wavefield.put(base + iz, field)?;
            report.slices_written += 1;
            Ok(())
        })?;
        report.frequencies += 1;
        Ok(())
    }

    /// Step the resident wavefield across every depth interval in
    /// `direction`, calling `visit` with the level reached after each step.
    ///
    /// The step from level `a` to its neighbour always uses the references
    /// of `a`.
    fn sweep<F>(
        &mut self,
        shared: Shared<'_>,
        direction: Direction,
        w: Complex32,
        report: &mut RunReport,
        mut visit: F,
    ) -> Result<(), EngineError>
    where
        F: FnMut(usize, &mut Plane<Complex32>, &mut RunReport) -> Result<(), EngineError>,
    {
        let nz = shared.plan.depths();
        let start = match direction {
            Direction::Downward => 0,
            Direction::Upward => nz - 1,
        };
        self.slowness.load_current(shared.slowness, start)?;
        report.slices_read += 1;

        for k in 1..nz {
            let (from, to) = match direction {
                Direction::Downward => (k - 1, k),
                Direction::Upward => (nz - k, nz - k - 1),
            };
            self.slowness.load_next(shared.slowness, to)?;
            report.slices_read += 1;
            self.extrapolator.step(
                w,
                self.wavefield.as_mut_slice(),
                self.slowness.current(),
                self.slowness.next(),
                shared.plan.references.level(from),
            )?;
            report.extrapolation_steps += 1;
            self.slowness.rotate();
            visit(to, &mut self.wavefield, report)?;
        }
        Ok(())
    }
}

impl Drop for FrequencyWorker {
    fn drop(&mut self) {
        self.release();
    }
}

/// Add image slice `iz` into the real part of `field`.
fn inject_image(
    image: &dyn SliceStore<f32>,
    iz: usize,
    buf: &mut Plane<f32>,
    field: &mut Plane<Complex32>,
    report: &mut RunReport,
) -> Result<(), EngineError> {
    image.get(iz, buf)?;
    report.slices_read += 1;
    for (f, &v) in field.as_mut_slice().iter_mut().zip(buf.as_slice()) {
        f.re += v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downward_and_upward_are_conjugate() {
        let f = Axis::new(4, 10.0, 5.0).unwrap().to_angular();
        let down = Direction::Downward.complex_frequency(0.1, &f, 2);
        let up = Direction::Upward.complex_frequency(0.1, &f, 2);
        assert_eq!(down, up.conj());
        assert!((down.re - 0.1 * f.d()).abs() < 1e-5);
        assert!((down.im + f.coord(2)).abs() < 1e-4);
    }

    #[test]
    fn zero_eps_gives_pure_imaginary_frequency() {
        let f = Axis::new(2, 1.0, 1.0).unwrap();
        let w = Direction::Downward.complex_frequency(0.0, &f, 0);
        assert_eq!(w, Complex32::new(0.0, -1.0));
    }
}
