//! End-to-end tests for the terminal driver.
//!
//! Input is scripted with a `Cursor`; output is captured in a `Vec<u8>`.

use std::io::Cursor;

use proptest::prelude::*;
use santa_cli::{Driver, DriverOutcome, GameSetup, RestrictionArg, engine_config};
use santa_core::SeededEnv;
use santa_session::{Notice, PhaseKind, SessionConfig};

fn setup(names: &[&str], restrictions: &[&str]) -> GameSetup {
    GameSetup {
        participants: names.iter().map(|n| (*n).to_string()).collect(),
        restrictions: restrictions
            .iter()
            .map(|r| r.parse::<RestrictionArg>().expect("valid restriction"))
            .collect(),
        ..GameSetup::default()
    }
}

fn enters(count: usize) -> Cursor<Vec<u8>> {
    Cursor::new(b"\n".repeat(count))
}

async fn play(
    seed: u64,
    setup: GameSetup,
    input: Cursor<Vec<u8>>,
) -> (DriverOutcome, PhaseKind, String) {
    let mut driver = Driver::new(SeededEnv::with_seed(seed), setup, input, Vec::new());
    let outcome = driver.run().await.expect("driver runs");
    let phase = driver.session().phase();
    let output = String::from_utf8(driver.into_output()).expect("utf-8 output");
    (outcome, phase, output)
}

/// Parse "X, you will be buying a gift for Y" lines.
fn reveals(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| {
            let (giver, recipient) = line.split_once(", you will be buying a gift for ")?;
            Some((giver.to_string(), recipient.to_string()))
        })
        .collect()
}

#[tokio::test]
async fn test_full_game_transcript() {
    let game = setup(&["Alice", "Bob", "Carol", "Dave"], &["Alice:Bob"]);
    // reveal + pass for three people, then the last reveal
    let (outcome, phase, output) = play(11, game, enters(7)).await;

    assert_eq!(outcome, DriverOutcome::Completed { participants: 4 });
    assert_eq!(phase, PhaseKind::Editing, "game resets after the last reveal");

    for (round, name) in ["Alice", "Bob", "Carol", "Dave"].iter().enumerate() {
        assert!(output.contains(&format!("Round {} of 4", round + 1)));
        assert!(output.contains(&format!("It's {name}'s turn")));
    }

    let pairs = reveals(&output);
    assert_eq!(pairs.len(), 4);
    assert!(!pairs.contains(&("Alice".to_string(), "Bob".to_string())));
    assert!(output.contains("Everyone has their match"));
}

#[tokio::test]
async fn test_single_participant_is_stopped() {
    let (outcome, phase, output) = play(1, setup(&["Alice"], &[]), enters(0)).await;

    assert_eq!(outcome, DriverOutcome::Stopped(Notice::InsufficientParticipants { found: 1 }));
    assert_eq!(phase, PhaseKind::Editing);
    assert!(output.contains("Please add at least 2 participants"));
}

#[tokio::test]
async fn test_infeasible_prints_notice() {
    let game = setup(&["Alice", "Bob"], &["Alice:Bob"]);
    let (outcome, phase, output) = play(1, game, enters(0)).await;

    assert!(matches!(outcome, DriverOutcome::Stopped(Notice::Infeasible { proven: false, .. })));
    assert_eq!(phase, PhaseKind::Ready);
    assert!(output.contains(
        "Could not find valid assignments. Please try again or adjust restrictions."
    ));
}

#[tokio::test]
async fn test_exact_fallback_proves_infeasible() {
    let mut game = setup(&["Alice", "Bob", "Carol"], &["Bob:Alice", "Carol:Alice"]);
    game.session = SessionConfig { engine: engine_config(5, true) };

    let (outcome, _, _) = play(2, game, enters(0)).await;

    assert_eq!(outcome, DriverOutcome::Stopped(Notice::Infeasible { attempts: 5, proven: true }));
}

#[tokio::test]
async fn test_duplicate_restriction_applied_once() {
    // Toggling twice would clear it; the driver must not.
    let game = setup(&["Alice", "Bob"], &["Alice:Bob", "Alice:Bob"]);
    let (outcome, _, _) = play(1, game, enters(0)).await;

    assert!(matches!(outcome, DriverOutcome::Stopped(Notice::Infeasible { .. })));
}

#[tokio::test]
async fn test_input_ending_early_aborts() {
    let game = setup(&["Alice", "Bob", "Carol"], &[]);
    let (outcome, phase, output) = play(3, game, enters(2)).await;

    assert_eq!(outcome, DriverOutcome::Aborted);
    assert_eq!(phase, PhaseKind::Revealing);
    assert_eq!(reveals(&output).len(), 1);
}

#[tokio::test]
async fn test_duplicate_participant_is_error() {
    let mut driver = Driver::new(
        SeededEnv::with_seed(1),
        setup(&["Alice", "alice ", "Alice "], &[]),
        enters(0),
        Vec::new(),
    );

    assert!(driver.run().await.is_err());
}

proptest! {
    /// Every completed transcript reveals a derangement of the group.
    #[test]
    fn prop_transcript_is_derangement(n in 2usize..7, seed in any::<u64>()) {
        let names: Vec<String> = (0..n).map(|i| format!("P{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let game = setup(&refs, &[]);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let (outcome, _, output) = runtime.block_on(play(seed, game, enters(2 * n)));

        prop_assert_eq!(outcome, DriverOutcome::Completed { participants: n });
        let pairs = reveals(&output);
        prop_assert_eq!(pairs.len(), n);

        let mut recipients: Vec<&String> = pairs.iter().map(|(_, r)| r).collect();
        recipients.sort();
        recipients.dedup();
        prop_assert_eq!(recipients.len(), n);
        for (giver, recipient) in &pairs {
            prop_assert_ne!(giver, recipient);
        }
    }
}
