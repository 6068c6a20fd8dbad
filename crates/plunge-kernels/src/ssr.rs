//! Extended split-step depth extrapolation.
//!
//! One depth step of thickness `dz` at complex angular frequency `w`:
//!
//! ```text
//! u  ← u · exp(−w · s_cur/2 · dz)                      split-step, current level
//! U  ← FFT2(pad(u))
//! for each reference s_r² in refs:
//!     U_r ← U · exp((√(w² s_r²) − √(w² s_r² + k²)) · dz)  phase shift
//!     u_r ← IFFT2(U_r)
//! u  ← Σ_r ω_r u_r / Σ_r ω_r,   ω_r = ds⁴ / (|s_cur² − s_r²|² + ds⁴)
//! u  ← u · exp(−w · s_next/2 · dz)                     split-step, next level
//! ```
//!
//! `w = ε·dω ∓ i·ω` picks the continuation direction; the engine owns
//! that choice. Slowness is looked up from the slowness grid at the sample
//! nearest each data-grid position.

use num_complex::Complex32;
use plunge_core::{Extrapolator, Geometry, KernelError};

use crate::fft::{wavenumber, Fft2};

/// Split-step Fourier extrapolator with multi-reference interpolation.
#[derive(Clone, Debug, Default)]
pub struct SplitStepExtrapolator {
    state: Option<SsrState>,
}

#[derive(Clone, Debug)]
struct SsrState {
    dz: f32,
    ds2: f32,
    rows: usize,
    cols: usize,
    padded_cols: usize,
    slow_len: usize,
    /// Data-grid sample → slowness-grid sample.
    lookup: Vec<usize>,
    /// `kx² + ky²` on the padded grid.
    kk: Vec<f32>,
    fft: Fft2,
    spectrum: Vec<Complex32>,
    shifted: Vec<Complex32>,
    accum: Vec<Complex32>,
    weight: Vec<f32>,
}

impl SplitStepExtrapolator {
    /// An uninitialized extrapolator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Extrapolator for SplitStepExtrapolator {
    fn name(&self) -> &str {
        "split_step"
    }

    fn initialize(&mut self, geometry: &Geometry) -> Result<(), KernelError> {
        let dz = geometry.depth.d();
        if dz.is_nan() || dz <= 0.0 {
            return Err(KernelError::InvalidGeometry {
                reason: format!("depth spacing must be positive, got {dz}"),
            });
        }
        let (dx, dy) = (geometry.data_x.d(), geometry.data_y.d());
        if dx == 0.0 || dy == 0.0 {
            return Err(KernelError::InvalidGeometry {
                reason: "data grid spacing must be nonzero".to_string(),
            });
        }

        let (rows, cols) = geometry.data_shape();
        let (padded_rows, padded_cols) = geometry.padded_shape();
        let slow_cols = geometry.slow_x.n();

        let mut lookup = Vec::with_capacity(rows * cols);
        for iy in 0..rows {
            let sy = geometry.slow_y.nearest(geometry.data_y.coord(iy));
            for ix in 0..cols {
                let sx = geometry.slow_x.nearest(geometry.data_x.coord(ix));
                lookup.push(sy * slow_cols + sx);
            }
        }

        let mut kk = Vec::with_capacity(padded_rows * padded_cols);
        for jy in 0..padded_rows {
            let ky = wavenumber(jy, padded_rows, dy);
            for jx in 0..padded_cols {
                let kx = wavenumber(jx, padded_cols, dx);
                kk.push(kx * kx + ky * ky);
            }
        }

        let ds = geometry.depth_time_scale;
        let padded_len = padded_rows * padded_cols;
        self.state = Some(SsrState {
            dz,
            ds2: ds * ds,
            rows,
            cols,
            padded_cols,
            slow_len: geometry.slow_y.n() * slow_cols,
            lookup,
            kk,
            fft: Fft2::new(padded_rows, padded_cols),
            spectrum: vec![Complex32::new(0.0, 0.0); padded_len],
            shifted: vec![Complex32::new(0.0, 0.0); padded_len],
            accum: vec![Complex32::new(0.0, 0.0); rows * cols],
            weight: vec![0.0; rows * cols],
        });
        tracing::debug!(
            rows,
            cols,
            padded_rows,
            padded_cols,
            dz,
            "split-step extrapolator initialized"
        );
        Ok(())
    }

    fn step(
        &mut self,
        w: Complex32,
        wavefield: &mut [Complex32],
        current: &[f32],
        next: &[f32],
        references: &[f32],
    ) -> Result<(), KernelError> {
        let st = self.state.as_mut().ok_or(KernelError::NotInitialized)?;
        check_len("wavefield", st.rows * st.cols, wavefield.len())?;
        check_len("current slowness", st.slow_len, current.len())?;
        check_len("next slowness", st.slow_len, next.len())?;
        if references.is_empty() {
            return Err(KernelError::EmptyReferences);
        }

        let half_dz = 0.5 * st.dz;
        for (u, &li) in wavefield.iter_mut().zip(&st.lookup) {
            *u *= (-w * (current[li] * half_dz)).exp();
        }

        st.spectrum.fill(Complex32::new(0.0, 0.0));
        for r in 0..st.rows {
            let dst = r * st.padded_cols;
            st.spectrum[dst..dst + st.cols]
                .copy_from_slice(&wavefield[r * st.cols..(r + 1) * st.cols]);
        }
        st.fft.forward(&mut st.spectrum);

        st.accum.fill(Complex32::new(0.0, 0.0));
        st.weight.fill(0.0);
        let w2 = w * w;
        for &sr2 in references {
            let co = (w2 * sr2).sqrt();
            for ((dst, &src), &k2) in st.shifted.iter_mut().zip(&st.spectrum).zip(&st.kk) {
                let cc = (w2 * sr2 + k2).sqrt();
                *dst = src * ((co - cc) * st.dz).exp();
            }
            st.fft.inverse(&mut st.shifted);

            for r in 0..st.rows {
                for c in 0..st.cols {
                    let i = r * st.cols + c;
                    let s = current[st.lookup[i]];
                    let g = weight(s * s, sr2, st.ds2);
                    st.accum[i] += st.shifted[r * st.padded_cols + c] * g;
                    st.weight[i] += g;
                }
            }
        }

        for (i, u) in wavefield.iter_mut().enumerate() {
            let s = next[st.lookup[i]];
            *u = st.accum[i] / st.weight[i] * (-w * (s * half_dz)).exp();
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.state.take().is_some() {
            tracing::debug!("split-step extrapolator closed");
        }
    }

    fn fork(&self) -> Box<dyn Extrapolator> {
        Box::new(self.clone())
    }
}

/// Interpolation weight of a reference for a local squared slowness.
///
/// Never below `f32::MIN_POSITIVE`, so the weight sum is always positive.
fn weight(s2: f32, sr2: f32, ds2: f32) -> f32 {
    if ds2 <= 0.0 {
        return if s2 == sr2 { 1.0 } else { f32::MIN_POSITIVE };
    }
    let r = (s2 - sr2).abs() / ds2;
    (1.0 / (1.0 + r * r)).max(f32::MIN_POSITIVE)
}

fn check_len(buffer: &'static str, expected: usize, actual: usize) -> Result<(), KernelError> {
    if expected != actual {
        return Err(KernelError::LengthMismatch {
            buffer,
            expected,
            actual,
        });
    }
    Ok(())
}
