//! Error types.
//!
//! Substate errors are recoverable: the registry logs them and falls back to
//! its `VOID` sentinel. Probe configuration errors are returned at
//! construction time so a broken probe layout never reaches classification.

use thiserror::Error;

/// Errors raised by a [`SubstateMachine`](crate::substate::SubstateMachine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstateError {
    /// A substate was registered twice.
    #[error("substate `{0}` is already registered")]
    AlreadyRegistered(String),

    /// A substate was requested that has no registered action.
    #[error("substate `{0}` is not registered")]
    NotFound(String),
}

/// Errors raised when building a [`SurfaceProbes`](crate::detection::SurfaceProbes) set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProbeConfigError {
    /// No probes were supplied. Probe 0 is the ground probe and must exist.
    #[error("surface probe set is empty; probe 0 must be the ground probe")]
    Empty,

    /// Offsets and half-extents were supplied with different lengths.
    #[error("probe offsets ({offsets}) and half-extents ({half_extents}) differ in length")]
    LengthMismatch {
        /// Number of offsets supplied.
        offsets: usize,
        /// Number of half-extents supplied.
        half_extents: usize,
    },
}
