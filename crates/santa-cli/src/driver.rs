//! Terminal game driver.
//!
//! Loads a roster into a [`Session`], computes the assignment on a blocking
//! task, then walks the reveal one Enter key at a time.

use std::io::{BufRead, Write};

use santa_core::{AssignmentOutcome, Environment};
use santa_session::{
    GenerationRequest, Notice, Session, SessionAction, SessionEvent, SessionError,
};
use tracing::{debug, info, warn};

use crate::{config::GameSetup, error::CliError};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// How a driven game ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverOutcome {
    /// Every participant saw their recipient and the session was reset.
    Completed {
        /// Participants revealed.
        participants: usize,
    },

    /// The game could not start or no assignment was found.
    Stopped(Notice),

    /// Input ended before the last reveal.
    Aborted,
}

/// Run the engine for `request` on a blocking task.
///
/// # Errors
///
/// Returns `CliError::Join` if the task panicked.
pub async fn generate<E: Environment>(
    request: GenerationRequest,
    env: E,
) -> Result<AssignmentOutcome, CliError> {
    let outcome = tokio::task::spawn_blocking(move || request.run(&env)).await?;
    Ok(outcome)
}

/// Drives one game over a line-based terminal.
pub struct Driver<E: Environment, R, W> {
    session: Session<E>,
    env: E,
    input: R,
    output: W,
    setup: GameSetup,
}

impl<E: Environment, R: BufRead, W: Write> Driver<E, R, W> {
    /// Create a driver for `setup`.
    pub fn new(env: E, setup: GameSetup, input: R, output: W) -> Self {
        let session = Session::new(env.clone(), setup.session);
        Self { session, env, input, output, setup }
    }

    /// The driven session.
    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    /// Consume the driver and return its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Play the game to completion.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if a name is rejected, the terminal fails, or the
    /// session refuses an event.
    pub async fn run(&mut self) -> Result<DriverOutcome, CliError> {
        self.load()?;

        let actions = self.session.handle(SessionEvent::StartGame)?;
        if let Some(notice) = self.render(actions)? {
            return Ok(DriverOutcome::Stopped(notice));
        }

        let request = self.session.generation_request().ok_or(SessionError::InvalidPhase {
            operation: "generate",
            phase: self.session.phase(),
        })?;
        let participants = request.lineup.len();
        writeln!(self.output, "Drawing names for {participants} participants...")?;
        let outcome = generate(request, self.env.clone()).await?;
        self.env.sleep(self.setup.pacing).await;

        let actions = self.session.handle(SessionEvent::AssignmentComputed { outcome })?;
        if let Some(notice) = self.render(actions)? {
            return Ok(DriverOutcome::Stopped(notice));
        }

        loop {
            if !self.wait_for_enter("Press Enter to reveal your match")? {
                return Ok(DriverOutcome::Aborted);
            }
            let actions = self.session.handle(SessionEvent::Reveal)?;
            let finished = actions.contains(&SessionAction::Finished);
            self.render(actions)?;

            if finished {
                break;
            }
            if !self.wait_for_enter("Press Enter and pass to the next person")? {
                return Ok(DriverOutcome::Aborted);
            }
            if self.setup.clear_between_turns {
                write!(self.output, "{CLEAR_SCREEN}")?;
            }
            let actions = self.session.handle(SessionEvent::Advance)?;
            self.render(actions)?;
        }

        let actions = self.session.handle(SessionEvent::Reset)?;
        self.render(actions)?;
        Ok(DriverOutcome::Completed { participants })
    }

    /// Feed the setup's roster into the session.
    fn load(&mut self) -> Result<(), CliError> {
        for name in &self.setup.participants {
            self.session.handle(SessionEvent::AddParticipant { name: name.clone() })?;
        }

        for arg in &self.setup.restrictions {
            let Some(roster) = self.session.roster() else {
                break;
            };
            if arg.giver == arg.recipient {
                warn!(giver = %arg.giver, "ignoring restriction on self");
                continue;
            }
            if roster.is_restricted(&arg.giver, &arg.recipient) {
                continue;
            }
            if !roster.contains(&arg.giver) || !roster.contains(&arg.recipient) {
                warn!(
                    giver = %arg.giver,
                    recipient = %arg.recipient,
                    "restriction names an absent participant"
                );
            }
            self.session.handle(SessionEvent::ToggleRestriction {
                giver: arg.giver.clone(),
                restricted: arg.recipient.clone(),
            })?;
        }
        Ok(())
    }

    /// Write actions to the terminal. Returns the first notice, if any.
    fn render(&mut self, actions: Vec<SessionAction>) -> Result<Option<Notice>, CliError> {
        let mut notice = None;
        for action in actions {
            match action {
                SessionAction::Notify(n) => {
                    writeln!(self.output, "{n}")?;
                    notice.get_or_insert(n);
                },
                SessionAction::PhaseChanged(phase) => debug!(%phase, "phase changed"),
                SessionAction::AssignmentsReady { strategy, attempts } => {
                    debug!(%strategy, attempts, "assignments ready");
                    writeln!(self.output, "Assignments are ready!")?;
                },
                SessionAction::Turn { round, of, participant } => {
                    writeln!(self.output)?;
                    writeln!(self.output, "Round {round} of {of}")?;
                    writeln!(self.output, "It's {participant}'s turn")?;
                },
                SessionAction::Revealed { participant, recipient } => {
                    writeln!(
                        self.output,
                        "{participant}, you will be buying a gift for {recipient}"
                    )?;
                },
                SessionAction::Finished => {
                    writeln!(self.output)?;
                    writeln!(self.output, "Everyone has their match. Happy gifting!")?;
                },
                SessionAction::Log { message } => info!("{message}"),
            }
        }
        self.output.flush()?;
        Ok(notice)
    }

    /// Prompt and block until a line arrives. `false` at end of input.
    fn wait_for_enter(&mut self, prompt: &str) -> Result<bool, CliError> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        writeln!(self.output)?;
        Ok(read > 0)
    }
}
