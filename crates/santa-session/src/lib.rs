//! Session
//!
//! Action-based state machine for one Secret Santa game. Moves a roster from
//! editing through assignment to the last reveal.
//!
//! # Architecture
//!
//! The session is a pure state machine that:
//! - Receives events from the caller (roster edits, game controls, engine
//!   results)
//! - Produces actions for the caller to render (notices, turns, reveals)
//! - Uses the `Environment` trait for randomness (deterministic testing)
//!
//! # Phases
//!
//! ```text
//! Editing ──StartGame──▶ Ready ──Generate──▶ Revealing
//!    ▲                     │                     │
//!    └────BackToEditing────┘                     │
//!    └──────────────────Reset────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`Session`]: Top-level state machine
//! - [`SessionEvent`]: Events fed into the session
//! - [`SessionAction`]: Actions produced by the session
//! - [`GenerationRequest`]: Engine input for hosts that compute off-thread

#![forbid(unsafe_code)]

mod error;
mod event;
mod session;

pub use error::SessionError;
pub use event::{GenerationRequest, Notice, PhaseKind, SessionAction, SessionEvent};
pub use santa_core::env::Environment;
pub use session::{Session, SessionConfig};
