//! Secret Santa core.
//!
//! Pure game logic with no I/O: the participant model, the constrained
//! assignment engine, and the reveal sequencer.
//!
//! ## Architecture
//!
//! ```text
//! Roster ──lineup()──▶ Lineup ──assign()──▶ AssignmentMap ──▶ RevealSequencer
//!  (editing)          (validated)          (bijection)        (cursor + reveal)
//! ```
//!
//! Randomness comes from an [`Environment`], so every draw can be replayed
//! from a seed.

#![forbid(unsafe_code)]

pub mod engine;
pub mod env;
pub mod error;
pub mod model;
pub mod sequencer;

pub use engine::{
    Assignment, AssignmentMap, AssignmentOutcome, DEFAULT_MAX_ATTEMPTS, EngineConfig, Fallback,
    Infeasible, Strategy, assign, generate_assignment,
};
pub use env::{EnvRng, Environment, SeededEnv};
pub use error::{AssignmentViolation, InsufficientParticipants, ModelError, PreconditionViolation};
pub use model::{Lineup, MIN_PARTICIPANTS, Participant, Restriction, RestrictionSet, Roster};
pub use sequencer::{RevealCursor, RevealSequencer};
