//! Real session wrapper that mirrors [`ModelSession`]'s interface.
//!
//! [`ModelSession`]: crate::model::ModelSession

use santa_core::{EngineConfig, Fallback, ModelError, Participant, SeededEnv};
use santa_session::{
    Notice, PhaseKind, Session, SessionAction, SessionConfig, SessionError, SessionEvent,
};

use crate::model::{
    ObservableState, Operation, OperationError, OperationNotice, OperationResult, pool_name,
};

/// Drives a real [`Session`] with model operations.
///
/// The engine runs with the exact-matching fallback, so "infeasible" means
/// no assignment exists and the model can predict it.
#[derive(Debug)]
pub struct RealSession {
    session: Session<SeededEnv>,
    reveals: Vec<(Participant, Participant)>,
}

impl RealSession {
    /// Create a session seeded for reproducible draws.
    pub fn new(seed: u64) -> Self {
        let config = SessionConfig {
            engine: EngineConfig::default().with_fallback(Fallback::ExactMatching),
        };
        Self { session: Session::new(SeededEnv::with_seed(seed), config), reveals: Vec::new() }
    }

    /// The wrapped session.
    pub fn session(&self) -> &Session<SeededEnv> {
        &self.session
    }

    /// Giver → recipient pairs revealed since the last reset, in order.
    pub fn reveals(&self) -> &[(Participant, Participant)] {
        &self.reveals
    }

    /// Apply an operation and return the result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let event = match op {
            Operation::Add { name } => {
                SessionEvent::AddParticipant { name: pool_name(*name).to_string() }
            },
            Operation::Remove { name } => {
                SessionEvent::RemoveParticipant { name: pool_name(*name).to_string() }
            },
            Operation::Rename { from, to } => SessionEvent::RenameParticipant {
                old: pool_name(*from).to_string(),
                new: pool_name(*to).to_string(),
            },
            Operation::Move { from, to } => {
                SessionEvent::MoveParticipant { from: usize::from(*from), to: usize::from(*to) }
            },
            Operation::Toggle { giver, restricted } => SessionEvent::ToggleRestriction {
                giver: pool_name(*giver).to_string(),
                restricted: pool_name(*restricted).to_string(),
            },
            Operation::StartGame => SessionEvent::StartGame,
            Operation::BackToEditing => SessionEvent::BackToEditing,
            Operation::Generate => SessionEvent::Generate,
            Operation::Reveal => SessionEvent::Reveal,
            Operation::Advance => SessionEvent::Advance,
            Operation::Reset => SessionEvent::Reset,
        };

        if matches!(op, Operation::Reset) {
            self.reveals.clear();
        }

        match self.session.handle(event) {
            Ok(actions) => self.absorb(actions),
            Err(err) => OperationResult::Error(map_error(&err)),
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        let phase = self.session.phase();

        if let Some(sequencer) = self.session.sequencer() {
            let lineup = sequencer.lineup();
            let cursor = sequencer.cursor();
            return ObservableState {
                phase,
                participants: names(lineup.participants()),
                restrictions: sorted_pairs(lineup.restrictions().iter()),
                cursor: Some((cursor.index, cursor.revealed)),
            };
        }

        let (participants, restrictions) = match self.session.roster() {
            Some(roster) => {
                (names(roster.participants()), sorted_pairs(roster.restrictions().iter()))
            },
            None => (Vec::new(), Vec::new()),
        };
        ObservableState { phase, participants, restrictions, cursor: None }
    }

    fn absorb(&mut self, actions: Vec<SessionAction>) -> OperationResult {
        let mut result = OperationResult::Ok;
        for action in actions {
            match action {
                SessionAction::Notify(Notice::InsufficientParticipants { .. }) => {
                    result = OperationResult::Notice(OperationNotice::TooFewParticipants);
                },
                SessionAction::Notify(Notice::Infeasible { .. }) => {
                    result = OperationResult::Notice(OperationNotice::Infeasible);
                },
                SessionAction::Revealed { participant, recipient } => {
                    self.reveals.push((participant, recipient));
                },
                SessionAction::PhaseChanged(PhaseKind::Editing) => self.reveals.clear(),
                SessionAction::PhaseChanged(_)
                | SessionAction::AssignmentsReady { .. }
                | SessionAction::Turn { .. }
                | SessionAction::Finished
                | SessionAction::Log { .. } => {},
            }
        }
        result
    }
}

fn map_error(err: &SessionError) -> OperationError {
    match err {
        SessionError::InvalidPhase { .. } => OperationError::InvalidPhase,
        SessionError::Model(ModelError::DuplicateParticipant { .. }) => {
            OperationError::DuplicateName
        },
        SessionError::Model(ModelError::UnknownParticipant { .. }) => OperationError::UnknownName,
        SessionError::Model(ModelError::IndexOutOfRange { .. }) => OperationError::IndexOutOfRange,
        SessionError::Model(ModelError::BlankName) => OperationError::BlankName,
        SessionError::InvalidAssignment(_) => OperationError::InvalidAssignment,
    }
}

fn names(participants: &[Participant]) -> Vec<String> {
    participants.iter().map(|p| p.as_str().to_string()).collect()
}

fn sorted_pairs<'a>(
    pairs: impl Iterator<Item = (&'a Participant, &'a Participant)>,
) -> Vec<(String, String)> {
    let mut pairs: Vec<_> =
        pairs.map(|(g, r)| (g.as_str().to_string(), r.as_str().to_string())).collect();
    pairs.sort();
    pairs
}
