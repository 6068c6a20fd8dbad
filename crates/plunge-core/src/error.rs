//! Error types shared across the plunge workspace.
//!
//! Storage failures and kernel misuse are both fatal for a run: the engine
//! never retries, it propagates the first error to the caller.

use std::error::Error;
use std::fmt;

/// Errors from reading or writing slices of an external volume.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// Slice index beyond the volume's slice count.
    IndexOutOfRange {
        /// The requested slice index.
        index: usize,
        /// Number of slices in the volume.
        count: usize,
    },
    /// A buffer or volume does not have the expected `(rows, cols)` shape.
    ShapeMismatch {
        /// Shape the volume or operation requires.
        expected: (usize, usize),
        /// Shape that was supplied.
        actual: (usize, usize),
    },
    /// A volume has the wrong number of slices for the operation.
    SliceCountMismatch {
        /// Which volume was checked.
        volume: &'static str,
        /// Slice count the operation requires.
        expected: usize,
        /// Slice count the volume has.
        actual: usize,
    },
    /// A flat sample buffer does not hold exactly one volume.
    LengthMismatch {
        /// Sample count the volume shape requires.
        expected: usize,
        /// Sample count supplied.
        actual: usize,
    },
    /// Underlying I/O failed.
    Io {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, count } => {
                write!(f, "slice index {index} out of range for {count} slices")
            }
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "slice shape mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::SliceCountMismatch {
                volume,
                expected,
                actual,
            } => write!(
                f,
                "{volume} volume has {actual} slices, expected {expected}"
            ),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "volume needs {expected} samples, got {actual}")
            }
            Self::Io { reason } => write!(f, "i/o failure: {reason}"),
        }
    }
}

impl Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            reason: e.to_string(),
        }
    }
}

/// Errors from a depth-step extrapolator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KernelError {
    /// `step()` was called before `initialize()` or after `close()`.
    NotInitialized,
    /// A buffer passed to the kernel has the wrong length.
    LengthMismatch {
        /// Which buffer.
        buffer: &'static str,
        /// Length the kernel was initialized for.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
    /// The reference slowness set for a step is empty.
    EmptyReferences,
    /// The geometry handed to `initialize()` is unusable.
    InvalidGeometry {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "extrapolator is not initialized"),
            Self::LengthMismatch {
                buffer,
                expected,
                actual,
            } => write!(
                f,
                "{buffer} buffer has {actual} samples, expected {expected}"
            ),
            Self::EmptyReferences => write!(f, "reference slowness set is empty"),
            Self::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
        }
    }
}

impl Error for KernelError {}
