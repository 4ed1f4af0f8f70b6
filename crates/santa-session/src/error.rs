//! Session error types.

use santa_core::{AssignmentViolation, ModelError};
use thiserror::Error;

use crate::event::PhaseKind;

/// Errors from session operations.
///
/// User-correctable outcomes (too few participants, no assignment found) are
/// not errors; they arrive as [`crate::SessionAction::Notify`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// Event is not accepted in the current phase.
    #[error("{operation} not allowed while {phase}")]
    InvalidPhase {
        /// The rejected operation.
        operation: &'static str,
        /// Phase the session was in.
        phase: PhaseKind,
    },

    /// Roster edit was rejected.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// A delivered assignment does not fit the lineup.
    #[error("invalid assignment: {0}")]
    InvalidAssignment(#[from] AssignmentViolation),
}

impl SessionError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Fatal errors indicate a bug in the host.
    /// Transient errors leave the session unchanged and can be retried.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidAssignment(_) => true,
            Self::InvalidPhase { .. } | Self::Model(_) => false,
        }
    }
}
