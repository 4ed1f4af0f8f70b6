//! Core error types.

use thiserror::Error;

use crate::model::Participant;

/// Errors from editing a roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Name was empty after trimming whitespace.
    #[error("participant name is blank")]
    BlankName,

    /// Name is already on the roster.
    #[error("participant already exists: {name}")]
    DuplicateParticipant {
        /// The name that is already present.
        name: Participant,
    },

    /// Name is not on the roster.
    #[error("participant not found: {name}")]
    UnknownParticipant {
        /// The name that was looked up.
        name: String,
    },

    /// Position is outside the participant list.
    #[error("index {index} out of range for {len} participants")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of participants.
        len: usize,
    },
}

/// Too few participants to start a game.
///
/// This is an expected, user-correctable outcome rather than a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("need at least 2 participants, found {found}")]
pub struct InsufficientParticipants {
    /// Number of valid participants on the roster.
    pub found: usize,
}

/// Engine called with input the editing phase should never produce.
///
/// Blank names are unrepresentable (`Participant` cannot hold one), so only
/// the count and uniqueness are checked at the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionViolation {
    /// Fewer than two participants were supplied.
    #[error("engine requires at least 2 participants, got {found}")]
    TooFewParticipants {
        /// Number of participants supplied.
        found: usize,
    },

    /// The same participant appears twice.
    #[error("participant listed twice: {name}")]
    DuplicateParticipant {
        /// The repeated participant.
        name: Participant,
    },
}

/// An assignment map that breaks one of its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentViolation {
    /// Map size differs from the participant count.
    #[error("map covers {actual} givers, expected {expected}")]
    SizeMismatch {
        /// Participant count.
        expected: usize,
        /// Entries in the map.
        actual: usize,
    },

    /// A participant has no recipient.
    #[error("no recipient for {giver}")]
    MissingGiver {
        /// Giver without an entry.
        giver: Participant,
    },

    /// A recipient is not a participant.
    #[error("recipient {recipient} is not a participant")]
    UnknownRecipient {
        /// The stray recipient.
        recipient: Participant,
    },

    /// A giver was assigned to themselves.
    #[error("{giver} assigned to themselves")]
    SelfAssignment {
        /// The offending giver.
        giver: Participant,
    },

    /// A giver was assigned a forbidden recipient.
    #[error("{giver} may not give to {recipient}")]
    RestrictedPair {
        /// The offending giver.
        giver: Participant,
        /// The forbidden recipient.
        recipient: Participant,
    },

    /// Two givers share a recipient.
    #[error("{recipient} receives more than one gift")]
    DuplicateRecipient {
        /// The doubly assigned recipient.
        recipient: Participant,
    },
}
