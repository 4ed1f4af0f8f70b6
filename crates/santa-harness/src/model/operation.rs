//! Operations for model-based testing.
//!
//! Operations cover every event a UI can send to a session. They are
//! generated randomly by proptest and applied to both the model and the real
//! session.

use arbitrary::Arbitrary;

/// Index into [`NAME_POOL`].
pub type NameId = u8;

/// Names used by generated operations.
///
/// The pool is small so adds collide, renames hit existing names, and
/// restrictions often name current participants.
pub const NAME_POOL: [&str; 6] = ["Alice", "Bob", "Carol", "Dave", "Erin", "Frank"];

/// Resolve a name id (wrapping into the pool).
pub fn pool_name(id: NameId) -> &'static str {
    NAME_POOL[usize::from(id) % NAME_POOL.len()]
}

/// Operations that can be applied to a session.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Append a participant.
    Add {
        /// Name to add.
        name: NameId,
    },

    /// Remove a participant.
    Remove {
        /// Name to remove.
        name: NameId,
    },

    /// Rename a participant.
    Rename {
        /// Current name.
        from: NameId,
        /// Replacement name.
        to: NameId,
    },

    /// Reorder participants. Indexes are small so both valid and
    /// out-of-range moves are common.
    Move {
        /// Current position.
        from: u8,
        /// Target position.
        to: u8,
    },

    /// Toggle a restriction.
    Toggle {
        /// Giver.
        giver: NameId,
        /// Restricted recipient.
        restricted: NameId,
    },

    /// Freeze the roster.
    StartGame,

    /// Return to editing from the ready phase.
    BackToEditing,

    /// Compute assignments.
    Generate,

    /// Show the current recipient.
    Reveal,

    /// Move to the next participant.
    Advance,

    /// Start over.
    Reset,
}

/// Advisory outcomes that are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationNotice {
    /// Fewer than two participants at game start.
    TooFewParticipants,
    /// No valid assignment exists.
    Infeasible,
}

/// Result of applying an operation.
///
/// Used to compare model and real session behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,

    /// Operation succeeded with an advisory notice.
    Notice(OperationNotice),

    /// Operation failed with expected error.
    Error(OperationError),
}

/// Expected errors that can occur during operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Event not accepted in the current phase.
    InvalidPhase,

    /// Name already on the roster.
    DuplicateName,

    /// Name not on the roster.
    UnknownName,

    /// Move index past the end of the roster.
    IndexOutOfRange,

    /// Name was blank after trimming (never produced by the name pool).
    BlankName,

    /// A computed assignment failed verification.
    InvalidAssignment,
}

impl OperationResult {
    /// Check if operation succeeded.
    pub fn is_ok(&self) -> bool {
        !self.is_err()
    }

    /// Check if operation failed.
    pub fn is_err(&self) -> bool {
        matches!(self, OperationResult::Error(_))
    }
}
