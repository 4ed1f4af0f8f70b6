//! Secret Santa terminal binary.
//!
//! # Usage
//!
//! ```bash
//! # Three people, Alice may not draw Bob
//! santa -p Alice -p Bob -p Carol --restrict Alice:Bob
//!
//! # Reproducible draw with the exact-matching fallback
//! santa -p Alice -p Bob -p Carol --seed 7 --exact
//! ```

use std::{
    io::{self, BufReader, IsTerminal},
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use santa_cli::{
    CliError, Driver, DriverOutcome, GameSetup, RestrictionArg, SystemEnv, engine_config,
};
use santa_core::{DEFAULT_MAX_ATTEMPTS, Environment, SeededEnv};
use santa_session::SessionConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Secret Santa draw
#[derive(Parser, Debug)]
#[command(name = "santa")]
#[command(about = "Draw Secret Santa matches and reveal them one person at a time")]
#[command(version)]
struct Args {
    /// Participant name, in reveal order (repeatable)
    #[arg(short, long = "participant", value_name = "NAME")]
    participants: Vec<String>,

    /// Forbid GIVER from drawing RECIPIENT (repeatable)
    #[arg(long = "restrict", value_name = "GIVER:RECIPIENT")]
    restrictions: Vec<RestrictionArg>,

    /// Greedy attempts before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Fall back to exact matching when greedy attempts run out
    #[arg(long)]
    exact: bool,

    /// Seed for a reproducible draw (defaults to OS randomness)
    #[arg(long)]
    seed: Option<u64>,

    /// Pause before the first turn, in milliseconds
    #[arg(long, default_value = "0")]
    pacing_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode, CliError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let setup = GameSetup {
        participants: args.participants,
        restrictions: args.restrictions,
        session: SessionConfig { engine: engine_config(args.max_attempts, args.exact) },
        pacing: Duration::from_millis(args.pacing_ms),
        clear_between_turns: io::stdout().is_terminal(),
    };

    let outcome = match args.seed {
        Some(seed) => {
            tracing::info!(seed, "using seeded draw");
            play(SeededEnv::with_seed(seed), setup).await?
        },
        None => play(SystemEnv::new(), setup).await?,
    };

    Ok(match outcome {
        DriverOutcome::Completed { participants } => {
            tracing::info!(participants, "game complete");
            ExitCode::SUCCESS
        },
        DriverOutcome::Aborted => ExitCode::SUCCESS,
        DriverOutcome::Stopped(notice) => {
            tracing::warn!(%notice, "game stopped");
            ExitCode::FAILURE
        },
    })
}

async fn play<E: Environment>(env: E, setup: GameSetup) -> Result<DriverOutcome, CliError> {
    let mut driver = Driver::new(env, setup, BufReader::new(io::stdin()), io::stdout());
    driver.run().await
}
