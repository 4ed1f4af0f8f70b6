//! Test harness for Secret Santa sessions.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation for model-based
//! testing. Operations are applied to both the model and the real session
//! (through [`RealSession`]), and their observable states are compared.
//!
//! # Scenarios
//!
//! The `scenario` module generates seeded rosters and plays them through a
//! session to the last reveal.

#![forbid(unsafe_code)]

pub mod model;
pub mod real;
pub mod scenario;

pub use model::{
    ModelSession, NAME_POOL, NameId, ObservableState, Operation, OperationError, OperationNotice,
    OperationResult, has_valid_assignment, pool_name,
};
pub use real::RealSession;
pub use scenario::{GameOutcome, RosterScenario, play_through};
