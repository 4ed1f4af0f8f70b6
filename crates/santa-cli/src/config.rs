//! Game setup from command-line arguments.

use std::{str::FromStr, time::Duration};

use santa_core::{EngineConfig, Fallback};
use santa_session::SessionConfig;

use crate::error::ParseRestrictionError;

/// A `--restrict GIVER:RECIPIENT` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionArg {
    /// Participant doing the giving.
    pub giver: String,
    /// Participant they may not draw.
    pub recipient: String,
}

impl FromStr for RestrictionArg {
    type Err = ParseRestrictionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseRestrictionError { value: value.to_string() };
        let (giver, recipient) = value.split_once(':').ok_or_else(invalid)?;
        let (giver, recipient) = (giver.trim(), recipient.trim());
        if giver.is_empty() || recipient.is_empty() {
            return Err(invalid());
        }
        Ok(Self { giver: giver.to_string(), recipient: recipient.to_string() })
    }
}

/// Everything the driver needs to run one game.
#[derive(Debug, Clone, Default)]
pub struct GameSetup {
    /// Names in reveal order.
    pub participants: Vec<String>,
    /// Exclusions to apply before starting.
    pub restrictions: Vec<RestrictionArg>,
    /// Session and engine settings.
    pub session: SessionConfig,
    /// Cosmetic delay between computing and showing the first turn.
    pub pacing: Duration,
    /// Clear the screen before each turn so the previous reveal is hidden.
    pub clear_between_turns: bool,
}

/// Engine settings from `--max-attempts` and `--exact`.
pub fn engine_config(max_attempts: u32, exact: bool) -> EngineConfig {
    let fallback = if exact { Fallback::ExactMatching } else { Fallback::None };
    EngineConfig::default().with_max_attempts(max_attempts).with_fallback(fallback)
}
