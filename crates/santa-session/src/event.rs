//! Session events and actions.

use std::fmt;

use santa_core::{
    AssignmentOutcome, EngineConfig, Environment, Lineup, Participant, Strategy, assign,
};

/// Events fed into the session by the UI layer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Append a participant (editing phase).
    AddParticipant {
        /// Raw name as typed.
        name: String,
    },

    /// Remove a participant and their restrictions (editing phase).
    RemoveParticipant {
        /// Name to remove.
        name: String,
    },

    /// Rename a participant in place (editing phase).
    RenameParticipant {
        /// Current name.
        old: String,
        /// Replacement name.
        new: String,
    },

    /// Reorder the reveal sequence (editing phase).
    MoveParticipant {
        /// Current position.
        from: usize,
        /// Target position.
        to: usize,
    },

    /// Add or remove a giver → restricted exclusion (editing phase).
    ToggleRestriction {
        /// Participant doing the giving.
        giver: String,
        /// Participant they may not draw.
        restricted: String,
    },

    /// Validate the roster and move to the assignment phase.
    StartGame,

    /// Leave the assignment phase to adjust the roster.
    BackToEditing,

    /// Run the engine inline.
    Generate,

    /// Deliver an outcome computed off-thread from a
    /// [`GenerationRequest`].
    AssignmentComputed {
        /// Engine result.
        outcome: AssignmentOutcome,
    },

    /// Show the current participant's recipient.
    Reveal,

    /// Move to the next participant.
    Advance,

    /// Discard everything and return to an empty roster.
    Reset,
}

/// User-correctable outcome the UI should surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Fewer than two participants at game start.
    InsufficientParticipants {
        /// Valid participants on the roster.
        found: usize,
    },

    /// No assignment within the retry budget.
    Infeasible {
        /// Greedy attempts consumed.
        attempts: u32,
        /// Whether infeasibility was proven by exact matching.
        proven: bool,
    },
}

impl Notice {
    /// Copy shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Self::InsufficientParticipants { .. } => "Please add at least 2 participants",
            Self::Infeasible { .. } => {
                "Could not find valid assignments. Please try again or adjust restrictions."
            },
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Coarse session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// Roster is being edited.
    Editing,
    /// Roster is frozen; waiting for an assignment.
    Ready,
    /// Assignment exists; stepping through reveals.
    Revealing,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editing => f.write_str("editing"),
            Self::Ready => f.write_str("ready"),
            Self::Revealing => f.write_str("revealing"),
        }
    }
}

/// Actions produced by the session for the UI to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Show an advisory message.
    Notify(Notice),

    /// The session moved to a new phase.
    PhaseChanged(PhaseKind),

    /// An assignment was accepted.
    AssignmentsReady {
        /// Algorithm that produced it.
        strategy: Strategy,
        /// Greedy attempts consumed.
        attempts: u32,
    },

    /// A participant's turn started (recipient still hidden).
    Turn {
        /// One-based round number.
        round: usize,
        /// Total rounds.
        of: usize,
        /// Whose turn it is.
        participant: Participant,
    },

    /// The current participant's recipient was shown.
    Revealed {
        /// Whose turn it is.
        participant: Participant,
        /// Who they are buying for.
        recipient: Participant,
    },

    /// The last participant has been revealed.
    Finished,

    /// Informational message.
    Log {
        /// Message text.
        message: String,
    },
}

/// Everything needed to compute an assignment away from the session.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Frozen participants and restrictions.
    pub lineup: Lineup,
    /// Engine settings.
    pub config: EngineConfig,
}

impl GenerationRequest {
    /// Run the engine for this request.
    pub fn run<E: Environment>(&self, env: &E) -> AssignmentOutcome {
        assign(&self.lineup, &self.config, env)
    }
}
