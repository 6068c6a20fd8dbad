//! Engine configuration, validation, and error types.
//!
//! [`EngineConfig`] is the input to
//! [`DepthContinuationEngine::new`](crate::DepthContinuationEngine::new).
//! [`validate()`](EngineConfig::validate) checks every scalar and axis
//! invariant up front; checks that need the slowness source or the
//! reference selector run during engine construction and report through
//! the same [`ConfigError`].

use std::error::Error;
use std::fmt;

use plunge_core::{Axis, Geometry, VolumeShape};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating an [`EngineConfig`] or initializing
/// an engine from it.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// An axis has a spacing or origin the engine cannot use.
    InvalidAxis {
        /// Which axis (`"depth"`, `"frequency"`, `"data_x"`, ...).
        axis: &'static str,
        /// Description of the violation.
        reason: String,
    },
    /// A scalar parameter is out of range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the violation.
        reason: String,
    },
    /// The slowness source does not match the depth axis and slowness grid.
    SlownessShapeMismatch {
        /// `depth.n x slow_y.n x slow_x.n`.
        expected: VolumeShape,
        /// Shape reported by the source.
        actual: VolumeShape,
    },
    /// The reference selector returned more references than allowed.
    ReferenceOverflow {
        /// Depth index of the offending level.
        depth: usize,
        /// Number of references returned.
        count: usize,
        /// Configured maximum.
        max: usize,
    },
    /// The reference selector returned no references for a level.
    NoReferences {
        /// Depth index of the offending level.
        depth: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAxis { axis, reason } => write!(f, "invalid {axis} axis: {reason}"),
            Self::InvalidParameter { name, reason } => write!(f, "invalid {name}: {reason}"),
            Self::SlownessShapeMismatch { expected, actual } => write!(
                f,
                "slowness volume is {}x{}x{}, expected {}x{}x{}",
                actual.slices, actual.rows, actual.cols, expected.slices, expected.rows, expected.cols
            ),
            Self::ReferenceOverflow { depth, count, max } => write!(
                f,
                "depth {depth}: selector returned {count} references, maximum is {max}"
            ),
            Self::NoReferences { depth } => {
                write!(f, "depth {depth}: selector returned no references")
            }
        }
    }
}

impl Error for ConfigError {}

// ── EngineConfig ───────────────────────────────────────────────────

/// Complete configuration for one depth-continuation engine.
///
/// The frequency axis is given in Hz; the engine converts it to angular
/// frequency once at initialization. Slowness is one-way (s/m) in the
/// source volume and doubled internally for the two-way zero-offset
/// travel path.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Log per-depth reference counts and per-frequency progress. Default: false.
    pub verbose: bool,
    /// Damping added to the real part of the complex frequency, as a
    /// fraction of the frequency spacing. Default: 0.01.
    ///
    /// This is the only stabilization the engine applies; too small a value
    /// can let evanescent energy grow and nothing detects it.
    pub eps: f32,
    /// Time sampling of the original recording (s). Default: 0.004.
    pub dt: f32,
    /// Depth axis (m).
    pub depth: Axis,
    /// Frequency axis (Hz).
    pub frequency: Axis,
    /// In-line axis of the data and image grid.
    pub data_x: Axis,
    /// Cross-line axis of the data and image grid.
    pub data_y: Axis,
    /// In-line axis of the slowness grid. Default: `data_x`.
    pub slow_x: Axis,
    /// Cross-line axis of the slowness grid. Default: `data_y`.
    pub slow_y: Axis,
    /// Edge taper size `(x, y)` in samples. Default: `(0, 0)`.
    pub taper: (usize, usize),
    /// Wavenumber-domain padding `(x, y)` in samples. Default: `(0, 0)`.
    pub padding: (usize, usize),
    /// Maximum number of reference slownesses per depth. Default: 1.
    pub max_references: usize,
}

impl EngineConfig {
    /// A configuration with the documented defaults and the slowness grid
    /// equal to the data grid.
    pub fn new(depth: Axis, frequency: Axis, data_x: Axis, data_y: Axis) -> Self {
        Self {
            verbose: false,
            eps: 0.01,
            dt: 0.004,
            depth,
            frequency,
            data_x,
            data_y,
            slow_x: data_x,
            slow_y: data_y,
            taper: (0, 0),
            padding: (0, 0),
            max_references: 1,
        }
    }

    /// Validate all scalar and axis invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. eps must be finite and non-negative.
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "eps",
                reason: format!("must be finite and >= 0, got {}", self.eps),
            });
        }
        // 2. dt must be finite and positive.
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "dt",
                reason: format!("must be finite and positive, got {}", self.dt),
            });
        }
        // 3. At least one reference per depth.
        if self.max_references == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_references",
                reason: "must be at least 1".to_string(),
            });
        }
        // 4. Depth and spatial axes must step forward.
        for (name, axis) in [
            ("depth", &self.depth),
            ("data_x", &self.data_x),
            ("data_y", &self.data_y),
            ("slow_x", &self.slow_x),
            ("slow_y", &self.slow_y),
        ] {
            if axis.d() <= 0.0 {
                return Err(ConfigError::InvalidAxis {
                    axis: name,
                    reason: format!("spacing must be positive, got {}", axis.d()),
                });
            }
        }
        // 5. Frequencies are non-negative and increasing.
        if self.frequency.d() <= 0.0 {
            return Err(ConfigError::InvalidAxis {
                axis: "frequency",
                reason: format!("spacing must be positive, got {}", self.frequency.d()),
            });
        }
        if self.frequency.o() < 0.0 {
            return Err(ConfigError::InvalidAxis {
                axis: "frequency",
                reason: format!("origin must be >= 0, got {}", self.frequency.o()),
            });
        }
        // 6. Padded grid must not overflow.
        if self.data_x.n().checked_add(self.padding.0).is_none()
            || self.data_y.n().checked_add(self.padding.1).is_none()
        {
            return Err(ConfigError::InvalidParameter {
                name: "padding",
                reason: "padded grid size overflows usize".to_string(),
            });
        }
        Ok(())
    }

    /// Geometry handed to the extrapolator: angular frequency axis and the
    /// `dt / dz` depth scale.
    pub fn geometry(&self) -> Geometry {
        Geometry {
            depth: self.depth,
            frequency: self.frequency.to_angular(),
            data_x: self.data_x,
            data_y: self.data_y,
            slow_x: self.slow_x,
            slow_y: self.slow_y,
            padding: self.padding,
            taper: self.taper,
            depth_time_scale: self.dt / self.depth.d(),
        }
    }

    /// Expected shape of the slowness source.
    pub fn slowness_shape(&self) -> VolumeShape {
        VolumeShape::new(self.depth.n(), self.slow_y.n(), self.slow_x.n())
    }

    /// Shape of a data volume: one data-grid slice per frequency.
    pub fn data_shape(&self) -> VolumeShape {
        VolumeShape::new(self.frequency.n(), self.data_y.n(), self.data_x.n())
    }

    /// Shape of an image volume: one data-grid slice per depth.
    pub fn image_shape(&self) -> VolumeShape {
        VolumeShape::new(self.depth.n(), self.data_y.n(), self.data_x.n())
    }

    /// Shape of an extracted wavefield volume: `nw * nz` data-grid slices,
    /// depth varying fastest.
    pub fn wavefield_shape(&self) -> VolumeShape {
        VolumeShape::new(
            self.frequency.n() * self.depth.n(),
            self.data_y.n(),
            self.data_x.n(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(n: usize, o: f32, d: f32) -> Axis {
        Axis::new(n, o, d).unwrap()
    }

    fn valid_config() -> EngineConfig {
        EngineConfig::new(
            axis(4, 0.0, 10.0),
            axis(8, 5.0, 2.5),
            axis(16, 0.0, 12.5),
            axis(12, 0.0, 12.5),
        )
    }

    #[test]
    fn defaults_are_documented_values() {
        let cfg = valid_config();
        assert!(!cfg.verbose);
        assert_eq!(cfg.eps, 0.01);
        assert_eq!(cfg.dt, 0.004);
        assert_eq!(cfg.max_references, 1);
        assert_eq!(cfg.taper, (0, 0));
        assert_eq!(cfg.padding, (0, 0));
        assert_eq!(cfg.slow_x, cfg.data_x);
        assert_eq!(cfg.slow_y, cfg.data_y);
    }

    #[test]
    fn validate_valid_config_succeeds() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_negative_eps_fails() {
        let mut cfg = valid_config();
        cfg.eps = -0.1;
        match cfg.validate() {
            Err(ConfigError::InvalidParameter { name: "eps", .. }) => {}
            other => panic!("expected InvalidParameter(eps), got {other:?}"),
        }
    }

    #[test]
    fn validate_nan_dt_fails() {
        let mut cfg = valid_config();
        cfg.dt = f32::NAN;
        match cfg.validate() {
            Err(ConfigError::InvalidParameter { name: "dt", .. }) => {}
            other => panic!("expected InvalidParameter(dt), got {other:?}"),
        }
    }

    #[test]
    fn validate_zero_max_references_fails() {
        let mut cfg = valid_config();
        cfg.max_references = 0;
        match cfg.validate() {
            Err(ConfigError::InvalidParameter {
                name: "max_references",
                ..
            }) => {}
            other => panic!("expected InvalidParameter(max_references), got {other:?}"),
        }
    }

    #[test]
    fn validate_zero_depth_step_fails() {
        let mut cfg = valid_config();
        cfg.depth = axis(4, 0.0, 0.0);
        match cfg.validate() {
            Err(ConfigError::InvalidAxis { axis: "depth", .. }) => {}
            other => panic!("expected InvalidAxis(depth), got {other:?}"),
        }
    }

    #[test]
    fn validate_reversed_slowness_grid_fails() {
        let mut cfg = valid_config();
        cfg.slow_y = axis(12, 100.0, -12.5);
        match cfg.validate() {
            Err(ConfigError::InvalidAxis { axis: "slow_y", .. }) => {}
            other => panic!("expected InvalidAxis(slow_y), got {other:?}"),
        }
    }

    #[test]
    fn validate_negative_frequency_origin_fails() {
        let mut cfg = valid_config();
        cfg.frequency = axis(8, -1.0, 2.5);
        match cfg.validate() {
            Err(ConfigError::InvalidAxis {
                axis: "frequency", ..
            }) => {}
            other => panic!("expected InvalidAxis(frequency), got {other:?}"),
        }
    }

    #[test]
    fn geometry_is_angular_and_scaled() {
        let g = valid_config().geometry();
        let two_pi = 2.0 * std::f32::consts::PI;
        assert!((g.frequency.o() - 5.0 * two_pi).abs() < 1e-4);
        assert!((g.frequency.d() - 2.5 * two_pi).abs() < 1e-4);
        assert!((g.depth_time_scale - 0.0004).abs() < 1e-9);
    }

    #[test]
    fn volume_shapes() {
        let cfg = valid_config();
        assert_eq!(cfg.data_shape(), VolumeShape::new(8, 12, 16));
        assert_eq!(cfg.image_shape(), VolumeShape::new(4, 12, 16));
        assert_eq!(cfg.wavefield_shape(), VolumeShape::new(32, 12, 16));
        assert_eq!(cfg.slowness_shape(), VolumeShape::new(4, 12, 16));
    }

    #[test]
    fn error_messages_name_the_problem() {
        let e = ConfigError::ReferenceOverflow {
            depth: 3,
            count: 5,
            max: 4,
        };
        assert_eq!(
            e.to_string(),
            "depth 3: selector returned 5 references, maximum is 4"
        );
    }
}
