//! Top-level engine error.

use std::error::Error;
use std::fmt;

use plunge_core::{KernelError, StorageError};

use crate::config::ConfigError;

/// Any failure of an engine operation.
///
/// Every variant is fatal for the call that produced it. Slices already
/// written to output volumes before the failure are left in place.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineError {
    /// Invalid configuration or initialization input.
    Config(ConfigError),
    /// A volume read or write failed.
    Storage(StorageError),
    /// The extrapolator rejected a call.
    Kernel(KernelError),
    /// A parallel worker thread panicked or disconnected.
    WorkerFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Kernel(e) => write!(f, "kernel: {e}"),
            Self::WorkerFailed { reason } => write!(f, "worker failed: {reason}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Storage(e) => Some(e),
            Self::Kernel(e) => Some(e),
            Self::WorkerFailed { .. } => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StorageError> for EngineError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<KernelError> for EngineError {
    fn from(e: KernelError) -> Self {
        Self::Kernel(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_chains_to_wrapped_error() {
        let e: EngineError = StorageError::IndexOutOfRange { index: 4, count: 2 }.into();
        assert!(e.source().is_some());
        assert_eq!(
            e.to_string(),
            "storage: slice index 4 out of range for 2 slices"
        );
    }

    #[test]
    fn worker_failure_has_no_source() {
        let e = EngineError::WorkerFailed {
            reason: "panicked".into(),
        };
        assert!(e.source().is_none());
    }
}
