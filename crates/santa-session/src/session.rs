//! Session state machine.
//!
//! The `Session` carries one game from roster editing through assignment to
//! the last reveal. Pure state machine: it returns actions, the caller
//! renders them.

use santa_core::{
    AssignmentOutcome, EngineConfig, Environment, Lineup, RevealSequencer, Roster, assign,
};
use tracing::{debug, info};

use crate::{
    error::SessionError,
    event::{GenerationRequest, Notice, PhaseKind, SessionAction, SessionEvent},
};

/// Session configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Engine settings used for every generation.
    pub engine: EngineConfig,
}

/// Internal phase with the data each phase owns.
#[derive(Debug, Clone)]
enum Phase {
    Editing { roster: Roster },
    Ready { roster: Roster, lineup: Lineup },
    Revealing { sequencer: RevealSequencer },
}

impl Default for Phase {
    fn default() -> Self {
        Self::Editing { roster: Roster::new() }
    }
}

impl Phase {
    fn kind(&self) -> PhaseKind {
        match self {
            Self::Editing { .. } => PhaseKind::Editing,
            Self::Ready { .. } => PhaseKind::Ready,
            Self::Revealing { .. } => PhaseKind::Revealing,
        }
    }
}

/// Secret Santa session.
///
/// # Type Parameters
///
/// - `E`: Environment implementation for randomness
#[derive(Debug)]
pub struct Session<E: Environment> {
    /// Current phase and its data.
    phase: Phase,

    /// Engine settings.
    config: SessionConfig,

    /// Environment for randomness.
    env: E,
}

impl<E: Environment> Session<E> {
    /// Create a session with an empty roster.
    pub fn new(env: E, config: SessionConfig) -> Self {
        Self { phase: Phase::default(), config, env }
    }

    /// Current phase.
    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Roster being edited, or the one a pending game was started from.
    pub fn roster(&self) -> Option<&Roster> {
        match &self.phase {
            Phase::Editing { roster } | Phase::Ready { roster, .. } => Some(roster),
            Phase::Revealing { .. } => None,
        }
    }

    /// Frozen lineup once a game has started.
    pub fn lineup(&self) -> Option<&Lineup> {
        match &self.phase {
            Phase::Editing { .. } => None,
            Phase::Ready { lineup, .. } => Some(lineup),
            Phase::Revealing { sequencer } => Some(sequencer.lineup()),
        }
    }

    /// Active reveal, if any.
    pub fn sequencer(&self) -> Option<&RevealSequencer> {
        match &self.phase {
            Phase::Revealing { sequencer } => Some(sequencer),
            _ => None,
        }
    }

    /// Inputs for computing an assignment off-thread. Only available while
    /// waiting for an assignment.
    pub fn generation_request(&self) -> Option<GenerationRequest> {
        match &self.phase {
            Phase::Ready { lineup, .. } => {
                Some(GenerationRequest { lineup: lineup.clone(), config: self.config.engine })
            },
            _ => None,
        }
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the event does not apply to the current
    /// phase or the roster rejects an edit. The session is unchanged when an
    /// error is returned.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<SessionAction>, SessionError> {
        match event {
            SessionEvent::AddParticipant { name } => {
                self.edit("add participant", |roster| roster.with_participant(&name))
            },
            SessionEvent::RemoveParticipant { name } => {
                self.edit("remove participant", |roster| roster.without_participant(&name))
            },
            SessionEvent::RenameParticipant { old, new } => {
                self.edit("rename participant", |roster| {
                    roster.with_participant_renamed(&old, &new)
                })
            },
            SessionEvent::MoveParticipant { from, to } => {
                self.edit("move participant", |roster| roster.with_participant_moved(from, to))
            },
            SessionEvent::ToggleRestriction { giver, restricted } => self
                .edit("toggle restriction", |roster| {
                    Ok(roster.with_restriction_toggled(&giver, &restricted))
                }),
            SessionEvent::StartGame => self.handle_start_game(),
            SessionEvent::BackToEditing => self.handle_back_to_editing(),
            SessionEvent::Generate => self.handle_generate(),
            SessionEvent::AssignmentComputed { outcome } => self.handle_outcome(outcome),
            SessionEvent::Reveal => self.handle_reveal(),
            SessionEvent::Advance => self.handle_advance(),
            SessionEvent::Reset => Ok(self.handle_reset()),
        }
    }

    /// Replace the editing roster with the result of `f`.
    fn edit<F>(&mut self, operation: &'static str, f: F) -> Result<Vec<SessionAction>, SessionError>
    where
        F: FnOnce(&Roster) -> Result<Roster, santa_core::ModelError>,
    {
        let Phase::Editing { roster } = &self.phase else {
            return Err(self.invalid_phase(operation));
        };

        let next = f(roster)?;
        debug!(
            operation,
            participants = next.participants().len(),
            restrictions = next.restrictions().len(),
            "roster edited"
        );
        self.phase = Phase::Editing { roster: next };
        Ok(vec![])
    }

    /// Handle game start (roster validation).
    fn handle_start_game(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        let Phase::Editing { roster } = &self.phase else {
            return Err(self.invalid_phase("start game"));
        };

        match roster.lineup() {
            Ok(lineup) => {
                let message = format!(
                    "Started game with {} participants and {} restrictions",
                    lineup.len(),
                    lineup.restrictions().len()
                );
                info!(participants = lineup.len(), "game started");
                self.phase = Phase::Ready { roster: roster.clone(), lineup };
                Ok(vec![SessionAction::PhaseChanged(PhaseKind::Ready), SessionAction::Log {
                    message,
                }])
            },
            Err(insufficient) => {
                debug!(found = insufficient.found, "not enough participants");
                Ok(vec![SessionAction::Notify(Notice::InsufficientParticipants {
                    found: insufficient.found,
                })])
            },
        }
    }

    /// Handle return to editing with the roster intact.
    fn handle_back_to_editing(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        let Phase::Ready { roster, .. } = &self.phase else {
            return Err(self.invalid_phase("back to editing"));
        };

        self.phase = Phase::Editing { roster: roster.clone() };
        Ok(vec![SessionAction::PhaseChanged(PhaseKind::Editing)])
    }

    /// Handle inline generation.
    fn handle_generate(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        let Phase::Ready { lineup, .. } = &self.phase else {
            return Err(self.invalid_phase("generate"));
        };

        let outcome = assign(lineup, &self.config.engine, &self.env);
        self.handle_outcome(outcome)
    }

    /// Handle an engine outcome, whether computed inline or delivered.
    fn handle_outcome(
        &mut self,
        outcome: AssignmentOutcome,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let Phase::Ready { lineup, .. } = &self.phase else {
            return Err(self.invalid_phase("accept assignment"));
        };

        match outcome {
            AssignmentOutcome::Assigned(assignment) => {
                let sequencer = RevealSequencer::new(lineup.clone(), assignment.map)?;
                info!(
                    participants = lineup.len(),
                    attempts = assignment.attempts,
                    strategy = %assignment.strategy,
                    "assignments ready"
                );

                let first = turn(&sequencer);
                self.phase = Phase::Revealing { sequencer };
                Ok(vec![
                    SessionAction::AssignmentsReady {
                        strategy: assignment.strategy,
                        attempts: assignment.attempts,
                    },
                    SessionAction::PhaseChanged(PhaseKind::Revealing),
                    first,
                ])
            },
            AssignmentOutcome::Infeasible(infeasible) => {
                Ok(vec![SessionAction::Notify(Notice::Infeasible {
                    attempts: infeasible.attempts,
                    proven: infeasible.proven,
                })])
            },
        }
    }

    /// Handle reveal. Repeated reveals produce no actions.
    fn handle_reveal(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        let Phase::Revealing { sequencer } = &mut self.phase else {
            return Err(self.invalid_phase("reveal"));
        };

        if !sequencer.reveal() {
            return Ok(vec![]);
        }

        let mut actions = Vec::with_capacity(2);
        if let Some(recipient) = sequencer.current_assignment() {
            actions.push(SessionAction::Revealed {
                participant: sequencer.current_participant().clone(),
                recipient: recipient.clone(),
            });
        }
        if sequencer.is_terminal() {
            actions.push(SessionAction::Finished);
        }
        Ok(actions)
    }

    /// Handle advance. A no-op before reveal or after the last participant.
    fn handle_advance(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        let Phase::Revealing { sequencer } = &mut self.phase else {
            return Err(self.invalid_phase("advance"));
        };

        if !sequencer.advance() {
            return Ok(vec![]);
        }
        Ok(vec![turn(sequencer)])
    }

    /// Handle reset ("Start Over"): every phase returns to an empty roster.
    fn handle_reset(&mut self) -> Vec<SessionAction> {
        let roster = match std::mem::take(&mut self.phase) {
            Phase::Revealing { sequencer } => sequencer.reset(),
            Phase::Editing { .. } | Phase::Ready { .. } => Roster::new(),
        };
        info!("session reset");

        self.phase = Phase::Editing { roster };
        vec![SessionAction::PhaseChanged(PhaseKind::Editing)]
    }

    fn invalid_phase(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidPhase { operation, phase: self.phase.kind() }
    }
}

fn turn(sequencer: &RevealSequencer) -> SessionAction {
    let (round, of) = sequencer.round();
    SessionAction::Turn { round, of, participant: sequencer.current_participant().clone() }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use santa_core::{
        Assignment, AssignmentMap, Fallback, Infeasible, Participant, RevealCursor, SeededEnv,
        Strategy,
    };

    use super::*;

    fn session() -> Session<SeededEnv> {
        Session::new(SeededEnv::with_seed(42), SessionConfig::default())
    }

    fn add(session: &mut Session<SeededEnv>, names: &[&str]) {
        for name in names {
            session.handle(SessionEvent::AddParticipant { name: (*name).to_string() }).unwrap();
        }
    }

    fn toggle(session: &mut Session<SeededEnv>, giver: &str, restricted: &str) {
        session
            .handle(SessionEvent::ToggleRestriction {
                giver: giver.to_string(),
                restricted: restricted.to_string(),
            })
            .unwrap();
    }

    fn p(name: &str) -> Participant {
        Participant::new(name).unwrap()
    }

    #[test]
    fn new_session_is_editing_empty_roster() {
        let s = session();
        assert_eq!(s.phase(), PhaseKind::Editing);
        assert_eq!(s.roster(), Some(&Roster::new()));
        assert!(s.generation_request().is_none());
    }

    #[test]
    fn start_with_one_participant_notifies() {
        let mut s = session();
        add(&mut s, &["Alice"]);

        let actions = s.handle(SessionEvent::StartGame).unwrap();

        assert_eq!(actions, vec![SessionAction::Notify(Notice::InsufficientParticipants {
            found: 1
        })]);
        assert_eq!(s.phase(), PhaseKind::Editing);
    }

    #[test]
    fn full_game_reveals_everyone() {
        let mut s = session();
        add(&mut s, &["A", "B", "C"]);
        s.handle(SessionEvent::StartGame).unwrap();
        assert_eq!(s.phase(), PhaseKind::Ready);

        let actions = s.handle(SessionEvent::Generate).unwrap();
        assert!(matches!(actions[0], SessionAction::AssignmentsReady { .. }));
        assert_eq!(actions[1], SessionAction::PhaseChanged(PhaseKind::Revealing));
        assert_eq!(actions[2], SessionAction::Turn { round: 1, of: 3, participant: p("A") });

        let mut finished = false;
        for round in 1..=3 {
            let revealed = s.handle(SessionEvent::Reveal).unwrap();
            assert!(matches!(revealed[0], SessionAction::Revealed { .. }));
            finished = revealed.contains(&SessionAction::Finished);

            let advanced = s.handle(SessionEvent::Advance).unwrap();
            if round < 3 {
                assert_eq!(advanced.len(), 1);
            } else {
                assert!(advanced.is_empty());
            }
        }

        assert!(finished);
        assert!(s.sequencer().unwrap().is_terminal());
    }

    #[test]
    fn infeasible_stays_ready_and_allows_retry() {
        let mut s = session();
        add(&mut s, &["A", "B"]);
        toggle(&mut s, "A", "B");
        toggle(&mut s, "B", "A");
        s.handle(SessionEvent::StartGame).unwrap();

        let actions = s.handle(SessionEvent::Generate).unwrap();
        assert_eq!(actions, vec![SessionAction::Notify(Notice::Infeasible {
            attempts: 100,
            proven: false
        })]);
        assert_eq!(s.phase(), PhaseKind::Ready);

        let again = s.handle(SessionEvent::Generate).unwrap();
        assert!(matches!(again[0], SessionAction::Notify(Notice::Infeasible { .. })));
    }

    #[test]
    fn back_to_editing_keeps_roster() {
        let mut s = session();
        add(&mut s, &["A", "B"]);
        toggle(&mut s, "A", "B");
        s.handle(SessionEvent::StartGame).unwrap();

        s.handle(SessionEvent::BackToEditing).unwrap();
        assert_eq!(s.phase(), PhaseKind::Editing);
        assert!(s.roster().unwrap().is_restricted("A", "B"));

        toggle(&mut s, "A", "B");
        assert!(!s.roster().unwrap().is_restricted("A", "B"));
    }

    #[test]
    fn edits_rejected_outside_editing() {
        let mut s = session();
        add(&mut s, &["A", "B"]);
        s.handle(SessionEvent::StartGame).unwrap();

        let result = s.handle(SessionEvent::AddParticipant { name: "C".to_string() });
        assert!(matches!(
            result,
            Err(SessionError::InvalidPhase { phase: PhaseKind::Ready, .. })
        ));
    }

    #[test]
    fn reveal_rejected_while_editing() {
        let mut s = session();
        let result = s.handle(SessionEvent::Reveal);
        assert!(matches!(
            result,
            Err(SessionError::InvalidPhase { phase: PhaseKind::Editing, .. })
        ));
    }

    #[test]
    fn duplicate_name_is_model_error() {
        let mut s = session();
        add(&mut s, &["A"]);

        let result = s.handle(SessionEvent::AddParticipant { name: " A ".to_string() });
        assert!(matches!(result, Err(SessionError::Model(_))));
        assert_eq!(s.roster().unwrap().participants().len(), 1);
    }

    #[test]
    fn removing_participant_cascades() {
        let mut s = session();
        add(&mut s, &["A", "B", "C"]);
        toggle(&mut s, "A", "B");

        s.handle(SessionEvent::RemoveParticipant { name: "B".to_string() }).unwrap();

        assert!(s.roster().unwrap().restrictions().is_empty());
    }

    #[test]
    fn repeated_reveal_produces_nothing() {
        let mut s = session();
        add(&mut s, &["A", "B", "C"]);
        s.handle(SessionEvent::StartGame).unwrap();
        s.handle(SessionEvent::Generate).unwrap();

        assert_eq!(s.handle(SessionEvent::Advance).unwrap(), vec![]);
        assert_eq!(s.handle(SessionEvent::Reveal).unwrap().len(), 1);
        assert_eq!(s.handle(SessionEvent::Reveal).unwrap(), vec![]);
        assert_eq!(
            s.sequencer().unwrap().cursor(),
            RevealCursor { index: 0, revealed: true }
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = session();
        add(&mut s, &["A", "B"]);
        s.handle(SessionEvent::StartGame).unwrap();
        s.handle(SessionEvent::Generate).unwrap();

        let actions = s.handle(SessionEvent::Reset).unwrap();

        assert_eq!(actions, vec![SessionAction::PhaseChanged(PhaseKind::Editing)]);
        assert_eq!(s.roster(), Some(&Roster::new()));
        assert!(s.sequencer().is_none());
    }

    #[test]
    fn delivered_outcome_starts_reveal() {
        let mut s = session();
        add(&mut s, &["A", "B", "C"]);
        s.handle(SessionEvent::StartGame).unwrap();

        let request = s.generation_request().unwrap();
        let outcome = request.run(&SeededEnv::with_seed(7));
        s.handle(SessionEvent::AssignmentComputed { outcome }).unwrap();

        assert_eq!(s.phase(), PhaseKind::Revealing);
    }

    #[test]
    fn delivered_infeasible_is_notice() {
        let mut s = session();
        add(&mut s, &["A", "B"]);
        s.handle(SessionEvent::StartGame).unwrap();

        let outcome = AssignmentOutcome::Infeasible(Infeasible { attempts: 3, proven: true });
        let actions = s.handle(SessionEvent::AssignmentComputed { outcome }).unwrap();

        assert_eq!(actions, vec![SessionAction::Notify(Notice::Infeasible {
            attempts: 3,
            proven: true
        })]);
    }

    #[test]
    fn mismatched_assignment_is_fatal() {
        let mut s = session();
        add(&mut s, &["A", "B"]);
        s.handle(SessionEvent::StartGame).unwrap();

        let outcome = AssignmentOutcome::Assigned(Assignment {
            map: AssignmentMap::from_pairs([(p("A"), p("A")), (p("B"), p("B"))]),
            attempts: 1,
            strategy: Strategy::GreedyRestart,
        });
        let err = s.handle(SessionEvent::AssignmentComputed { outcome }).unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(s.phase(), PhaseKind::Ready);
    }

    #[test]
    fn exact_fallback_reports_strategy() {
        let config = SessionConfig {
            engine: EngineConfig::default()
                .with_max_attempts(0)
                .with_fallback(Fallback::ExactMatching),
        };
        let mut s = Session::new(SeededEnv::with_seed(1), config);
        add(&mut s, &["A", "B", "C"]);
        s.handle(SessionEvent::StartGame).unwrap();

        let actions = s.handle(SessionEvent::Generate).unwrap();

        assert_eq!(actions[0], SessionAction::AssignmentsReady {
            strategy: Strategy::ExactMatching,
            attempts: 0
        });
    }
}
