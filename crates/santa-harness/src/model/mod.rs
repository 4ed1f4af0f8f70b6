//! Reference model for model-based testing.
//!
//! The model is a plain-collections rendition of a Secret Santa session. It
//! decides feasibility by brute force over every permutation, so it serves
//! as the oracle for the real engine and session.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Exhaustive: Feasibility is decided by enumeration, not search
//! - Deterministic: Same inputs produce same outputs

pub mod operation;
mod world;

pub use operation::{
    NAME_POOL, NameId, Operation, OperationError, OperationNotice, OperationResult, pool_name,
};
pub use world::{ModelSession, ObservableState, has_valid_assignment};
