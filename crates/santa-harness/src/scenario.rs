//! Seeded roster scenarios.
//!
//! Builds random groups from a seed and plays them through a session from
//! start to the last reveal.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use santa_core::{ModelError, Participant, Roster, SeededEnv};
use santa_session::{Notice, Session, SessionAction, SessionConfig, SessionError, SessionEvent};

/// Shape of a generated group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterScenario {
    /// Number of participants.
    pub size: usize,
    /// Chance, in percent, that any ordered pair is restricted.
    pub restriction_percent: u8,
}

impl RosterScenario {
    /// Generate a roster for `seed`. Participants are named `P0`, `P1`, ...
    ///
    /// # Errors
    ///
    /// Never fails for generated names; the error type is the roster's.
    pub fn roster(&self, seed: u64) -> Result<Roster, ModelError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let names: Vec<String> = (0..self.size).map(|i| format!("P{i}")).collect();

        let mut roster = Roster::new();
        for name in &names {
            roster = roster.with_participant(name)?;
        }

        for giver in &names {
            for restricted in &names {
                if giver != restricted && rng.gen_range(0..100u8) < self.restriction_percent {
                    roster = roster.with_restriction(giver, restricted);
                }
            }
        }
        Ok(roster)
    }
}

/// What happened when a roster was played through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    /// Every participant saw their recipient, in reveal order.
    Completed(Vec<(Participant, Participant)>),
    /// The session refused to start or could not assign.
    Stopped(Notice),
}

/// Play `roster` through a fresh session: start, generate, then reveal and
/// advance until finished.
///
/// # Errors
///
/// Returns `SessionError` if the session rejects an event, which indicates a
/// bug in the session.
pub fn play_through(
    roster: &Roster,
    seed: u64,
    config: SessionConfig,
) -> Result<GameOutcome, SessionError> {
    let mut session = Session::new(SeededEnv::with_seed(seed), config);

    for participant in roster.participants() {
        session.handle(SessionEvent::AddParticipant { name: participant.as_str().to_string() })?;
    }
    for (giver, restricted) in roster.restrictions().iter() {
        session.handle(SessionEvent::ToggleRestriction {
            giver: giver.as_str().to_string(),
            restricted: restricted.as_str().to_string(),
        })?;
    }

    for event in [SessionEvent::StartGame, SessionEvent::Generate] {
        if let Some(notice) = notice(&session.handle(event)?) {
            return Ok(GameOutcome::Stopped(notice));
        }
    }

    let mut reveals = Vec::with_capacity(roster.participants().len());
    loop {
        let mut finished = false;
        for action in session.handle(SessionEvent::Reveal)? {
            match action {
                SessionAction::Revealed { participant, recipient } => {
                    reveals.push((participant, recipient));
                },
                SessionAction::Finished => finished = true,
                _ => {},
            }
        }
        if finished {
            return Ok(GameOutcome::Completed(reveals));
        }
        session.handle(SessionEvent::Advance)?;
    }
}

fn notice(actions: &[SessionAction]) -> Option<Notice> {
    actions.iter().find_map(|action| match action {
        SessionAction::Notify(notice) => Some(*notice),
        _ => None,
    })
}
