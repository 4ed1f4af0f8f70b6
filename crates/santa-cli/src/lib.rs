//! Secret Santa terminal driver.
//!
//! This crate hosts a [`santa_session::Session`] on a terminal:
//! - Tokio for the blocking engine task and cosmetic pacing
//! - OS randomness through [`SystemEnv`]
//! - A line-based reveal loop over any `BufRead`/`Write` pair
//!
//! ## Architecture
//!
//! ```text
//! santa (binary)
//!   ├─ GameSetup   (clap arguments → roster + config)
//!   ├─ Driver      (session host, renders actions)
//!   ├─ generate    (spawn_blocking engine wrapper)
//!   └─ SystemEnv   (production Environment impl)
//! ```

#![forbid(unsafe_code)]

mod config;
mod driver;
mod error;
mod system_env;

pub use config::{GameSetup, RestrictionArg, engine_config};
pub use driver::{Driver, DriverOutcome, generate};
pub use error::{CliError, ParseRestrictionError};
pub use system_env::SystemEnv;
