//! Reveal sequencer.
//!
//! Steps through the lineup one participant at a time, keeping each
//! recipient hidden until an explicit reveal.
//!
//! ## State machine
//!
//! ```text
//! (0, hidden) ──reveal──▶ (0, shown) ──advance──▶ (1, hidden) ─ ... ─▶ (n-1, shown)
//!                                                                         terminal
//! ```
//!
//! - `reveal` is idempotent
//! - `advance` only moves from a shown, non-terminal position; anywhere else
//!   it is a no-op
//! - `reset` consumes the sequencer, discarding the assignment, and hands back
//!   an empty roster
//!
//! Every transition takes `&mut self`, so a host sharing a sequencer across
//! threads must already hold exclusive access to mutate it.

use tracing::debug;

use crate::{
    engine::AssignmentMap,
    error::AssignmentViolation,
    model::{Lineup, Participant, Roster},
};

/// Position in the reveal order plus whether that position has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealCursor {
    /// Index into the lineup.
    pub index: usize,
    /// Whether the participant at `index` has seen their recipient.
    pub revealed: bool,
}

/// Cursor-based reveal over a verified assignment.
#[derive(Debug, Clone)]
pub struct RevealSequencer {
    lineup: Lineup,
    map: AssignmentMap,
    cursor: RevealCursor,
}

impl RevealSequencer {
    /// Start a reveal at the first participant, hidden.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentViolation` if `map` is not a valid assignment for
    /// `lineup`.
    pub fn new(lineup: Lineup, map: AssignmentMap) -> Result<Self, AssignmentViolation> {
        map.verify(lineup.participants(), lineup.restrictions())?;
        Ok(Self { lineup, map, cursor: RevealCursor { index: 0, revealed: false } })
    }

    /// Current cursor.
    pub fn cursor(&self) -> RevealCursor {
        self.cursor
    }

    /// One-based round number and total rounds.
    pub fn round(&self) -> (usize, usize) {
        (self.cursor.index + 1, self.lineup.len())
    }

    /// The lineup being revealed.
    pub fn lineup(&self) -> &Lineup {
        &self.lineup
    }

    /// Participant whose turn it is.
    pub fn current_participant(&self) -> &Participant {
        &self.lineup.participants()[self.cursor.index]
    }

    /// Current participant's recipient, once revealed.
    ///
    /// `None` until [`RevealSequencer::reveal`] has been called for this
    /// position.
    pub fn current_assignment(&self) -> Option<&Participant> {
        if !self.cursor.revealed {
            return None;
        }
        self.map.recipient_for(self.current_participant().as_str())
    }

    /// Show the current participant's recipient. Returns `false` if it was
    /// already shown.
    pub fn reveal(&mut self) -> bool {
        if self.cursor.revealed {
            return false;
        }
        self.cursor.revealed = true;
        debug!(cursor = self.cursor.index, "revealed");
        true
    }

    /// Move to the next participant. Returns `false` (and does nothing) when
    /// the current recipient is still hidden or the reveal is finished.
    pub fn advance(&mut self) -> bool {
        if !self.cursor.revealed || self.is_last() {
            return false;
        }
        self.cursor = RevealCursor { index: self.cursor.index + 1, revealed: false };
        debug!(cursor = self.cursor.index, "advanced");
        true
    }

    /// Whether the last participant has been shown.
    pub fn is_terminal(&self) -> bool {
        self.cursor.revealed && self.is_last()
    }

    fn is_last(&self) -> bool {
        self.cursor.index + 1 >= self.lineup.len()
    }

    /// Discard the assignment and cursor, returning to an empty roster.
    pub fn reset(self) -> Roster {
        debug!(participants = self.lineup.len(), "reveal reset");
        Roster::new()
    }
}
