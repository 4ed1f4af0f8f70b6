//! Fuzz target for [`RevealSequencer`] and the assignment engine
//!
//! # Strategy
//!
//! - Arbitrary group sizes (2..=12) and restriction bitmaps
//! - Engine runs with a fuzzed seed, retry budget and fallback
//! - Arbitrary interleavings of reveal, advance and probe calls
//!
//! # Invariants
//!
//! - Any assigned map passes `verify` against the lineup
//! - Cursor index never leaves `0..len`
//! - Recipient stays hidden until revealed
//! - Advance only moves from a revealed, non-terminal position
//! - Terminal means last index and revealed; nothing moves afterwards
//! - NEVER panic on any call sequence

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use santa_core::{
    AssignmentOutcome, EngineConfig, Fallback, Lineup, Participant, Restriction, RestrictionSet,
    RevealCursor, RevealSequencer, SeededEnv, assign,
};

#[derive(Debug, Clone, Copy, Arbitrary)]
enum SequencerCall {
    Reveal,
    Advance,
    Probe,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    size: u8,
    restrictions: Vec<(u8, u8)>,
    seed: u64,
    max_attempts: u8,
    exact: bool,
    calls: Vec<SequencerCall>,
}

fuzz_target!(|input: FuzzInput| {
    let size = 2 + usize::from(input.size % 11);
    let participants: Vec<Participant> = (0..size)
        .map(|i| Participant::new(format!("P{i}")).expect("generated names are valid"))
        .collect();

    let rules: RestrictionSet = input
        .restrictions
        .iter()
        .take(64)
        .filter_map(|(g, r)| {
            let giver = &participants[usize::from(*g) % size];
            let restricted = &participants[usize::from(*r) % size];
            Restriction::new(giver.as_str(), restricted.as_str()).ok()
        })
        .collect();

    let lineup = Lineup::new(participants, &rules).expect("distinct participants");
    let fallback = if input.exact { Fallback::ExactMatching } else { Fallback::None };
    let config = EngineConfig::default()
        .with_max_attempts(u32::from(input.max_attempts % 16))
        .with_fallback(fallback);

    let AssignmentOutcome::Assigned(assignment) =
        assign(&lineup, &config, &SeededEnv::with_seed(input.seed))
    else {
        return;
    };

    assert_eq!(assignment.map.verify(lineup.participants(), lineup.restrictions()), Ok(()));

    let mut sequencer =
        RevealSequencer::new(lineup.clone(), assignment.map.clone()).expect("verified map");
    assert_eq!(sequencer.cursor(), RevealCursor { index: 0, revealed: false });

    for call in input.calls.iter().take(256) {
        let before = sequencer.cursor();
        let was_terminal = sequencer.is_terminal();

        match call {
            SequencerCall::Reveal => {
                let changed = sequencer.reveal();
                assert_eq!(changed, !before.revealed);
                assert_eq!(
                    sequencer.cursor(),
                    RevealCursor { index: before.index, revealed: true }
                );
            },
            SequencerCall::Advance => {
                let changed = sequencer.advance();
                let may_move = before.revealed && before.index + 1 < size;
                assert_eq!(changed, may_move);
                if may_move {
                    assert_eq!(
                        sequencer.cursor(),
                        RevealCursor { index: before.index + 1, revealed: false }
                    );
                } else {
                    assert_eq!(sequencer.cursor(), before);
                }
            },
            SequencerCall::Probe => {
                let giver = sequencer.current_participant();
                assert_eq!(giver, &lineup.participants()[before.index]);
                match sequencer.current_assignment() {
                    Some(recipient) => {
                        assert!(before.revealed);
                        assert_eq!(Some(recipient), assignment.map.recipient_for(giver.as_str()));
                    },
                    None => assert!(!before.revealed),
                }
                assert_eq!(sequencer.round(), (before.index + 1, size));
            },
        }

        let after = sequencer.cursor();
        assert!(after.index < size);
        assert_eq!(sequencer.is_terminal(), after.index == size - 1 && after.revealed);
        if was_terminal {
            assert_eq!(after, before, "terminal cursor must not move");
        }
    }

    assert!(sequencer.reset().participants().is_empty());
});
