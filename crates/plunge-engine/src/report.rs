//! Per-operation run reports.

use std::fmt;

/// Which engine operation produced a [`RunReport`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Data to image, downward.
    Migrate,
    /// Image to data, upward.
    Model,
    /// Data at the deepest level moved to the surface.
    RedatumUp,
    /// Data at the surface moved to the deepest level.
    RedatumDown,
    /// Wavefield snapshots at every depth.
    ExtractWavefield,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Migrate => "migrate",
            Self::Model => "model",
            Self::RedatumUp => "redatum-up",
            Self::RedatumDown => "redatum-down",
            Self::ExtractWavefield => "extract-wavefield",
        };
        f.write_str(name)
    }
}

/// Counters collected while an operation runs.
///
/// Slowness fetches count as slice reads. All durations are in
/// microseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// The operation that ran.
    pub operation: Operation,
    /// Frequencies processed.
    pub frequencies: usize,
    /// Calls to the extrapolator's `step`.
    pub extrapolation_steps: u64,
    /// Slices read from any volume.
    pub slices_read: u64,
    /// Slices written to any volume.
    pub slices_written: u64,
    /// Wall-clock time of the whole operation.
    pub elapsed_us: u64,
}

impl RunReport {
    /// An all-zero report for `operation`.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            frequencies: 0,
            extrapolation_steps: 0,
            slices_read: 0,
            slices_written: 0,
            elapsed_us: 0,
        }
    }

    /// Add the counters of `other` (a worker's partial report) into `self`.
    /// Elapsed time is not summed.
    pub fn merge(&mut self, other: &RunReport) {
        self.frequencies += other.frequencies;
        self.extrapolation_steps += other.extrapolation_steps;
        self.slices_read += other.slices_read;
        self.slices_written += other.slices_written;
    }
}
