//! Assignment engine.
//!
//! Builds a bijection from givers to recipients with no self-gifts and no
//! restricted pairs, using randomized greedy construction with restart:
//!
//! 1. Copy the participants into a pool of remaining recipients
//! 2. Walk givers in reveal order; each draws uniformly from the pool minus
//!    themselves and their restrictions
//! 3. A giver with nothing to draw abandons the attempt; start over
//! 4. The first attempt that places every giver wins
//!
//! Greedy-with-restart is probabilistically complete only. A feasible group
//! can exhaust the retry budget and be reported infeasible. With
//! [`Fallback::ExactMatching`] the engine settles that case with a bipartite
//! perfect matching before giving up, and reports which strategy produced
//! the result.
//!
//! The engine is a pure function of its inputs and the environment's draws.

mod matching;

use std::{collections::HashSet, fmt};

use rand::seq::SliceRandom;
use tracing::{debug, trace, warn};

use crate::{
    env::Environment,
    error::{AssignmentViolation, PreconditionViolation},
    model::{Lineup, Participant, RestrictionSet, check_participants},
};

/// Greedy attempts made before declaring a group infeasible.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// What to do once the greedy retry budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// Report `Infeasible` straight away.
    #[default]
    None,

    /// Search for a perfect matching first; only report `Infeasible` when
    /// none exists.
    ExactMatching,
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Greedy attempts before falling back or giving up. Zero skips the
    /// greedy phase entirely.
    pub max_attempts: u32,
    /// Behaviour after the budget runs out.
    pub fallback: Fallback,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, fallback: Fallback::None }
    }
}

impl EngineConfig {
    /// Replace the retry budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Replace the fallback behaviour.
    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Which algorithm produced an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Randomized greedy construction with restart.
    GreedyRestart,
    /// Augmenting-path perfect matching after the greedy budget ran out.
    ExactMatching,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GreedyRestart => f.write_str("greedy-restart"),
            Self::ExactMatching => f.write_str("exact-matching"),
        }
    }
}

/// Total giver → recipient mapping.
///
/// Entries are kept in giver reveal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentMap {
    pairs: Vec<(Participant, Participant)>,
}

impl AssignmentMap {
    /// Build a map from `(giver, recipient)` pairs. No invariants are
    /// checked; see [`AssignmentMap::verify`].
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Participant, Participant)>) -> Self {
        Self { pairs: pairs.into_iter().collect() }
    }

    /// The recipient `giver` was assigned.
    pub fn recipient_for(&self, giver: &str) -> Option<&Participant> {
        self.pairs.iter().find(|(g, _)| g == giver).map(|(_, recipient)| recipient)
    }

    /// `(giver, recipient)` pairs in giver order.
    pub fn iter(&self) -> impl Iterator<Item = (&Participant, &Participant)> {
        self.pairs.iter().map(|(giver, recipient)| (giver, recipient))
    }

    /// Number of givers.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Check the map against `participants` and `restrictions`.
    ///
    /// # Invariants
    ///
    /// - Every participant gives exactly once and receives exactly once
    /// - Nobody draws themselves
    /// - No giver draws someone they are restricted from
    pub fn verify(
        &self,
        participants: &[Participant],
        restrictions: &RestrictionSet,
    ) -> Result<(), AssignmentViolation> {
        if self.pairs.len() != participants.len() {
            return Err(AssignmentViolation::SizeMismatch {
                expected: participants.len(),
                actual: self.pairs.len(),
            });
        }

        let members: HashSet<&str> = participants.iter().map(Participant::as_str).collect();
        let mut received = HashSet::with_capacity(participants.len());

        for giver in participants {
            let recipient = self
                .recipient_for(giver.as_str())
                .ok_or_else(|| AssignmentViolation::MissingGiver { giver: giver.clone() })?;

            if !members.contains(recipient.as_str()) {
                return Err(AssignmentViolation::UnknownRecipient { recipient: recipient.clone() });
            }
            if recipient == giver {
                return Err(AssignmentViolation::SelfAssignment { giver: giver.clone() });
            }
            if restrictions.contains(giver.as_str(), recipient.as_str()) {
                return Err(AssignmentViolation::RestrictedPair {
                    giver: giver.clone(),
                    recipient: recipient.clone(),
                });
            }
            if !received.insert(recipient.as_str()) {
                return Err(AssignmentViolation::DuplicateRecipient {
                    recipient: recipient.clone(),
                });
            }
        }

        Ok(())
    }
}

/// A complete, valid assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// The giver → recipient map.
    pub map: AssignmentMap,
    /// Greedy attempts consumed (the full budget when matching was used).
    pub attempts: u32,
    /// Algorithm that produced the map.
    pub strategy: Strategy,
}

/// No valid assignment was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Infeasible {
    /// Greedy attempts consumed.
    pub attempts: u32,
    /// `true` only when exact matching showed no perfect matching exists.
    /// Otherwise the group may simply have been unlucky.
    pub proven: bool,
}

/// Result of one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// Every giver has a recipient.
    Assigned(Assignment),
    /// No assignment within the budget.
    Infeasible(Infeasible),
}

impl AssignmentOutcome {
    /// Whether an assignment was produced.
    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    /// The assignment, if any.
    pub fn into_assignment(self) -> Option<Assignment> {
        match self {
            Self::Assigned(assignment) => Some(assignment),
            Self::Infeasible(_) => None,
        }
    }
}

/// Generate an assignment for raw engine input.
///
/// Restrictions that mention names outside `participants` are ignored.
///
/// # Errors
///
/// Returns `PreconditionViolation` if fewer than two participants are given
/// or a participant is listed twice. `Infeasible` is not an error.
pub fn generate_assignment<E: Environment>(
    participants: &[Participant],
    restrictions: &RestrictionSet,
    config: &EngineConfig,
    env: &E,
) -> Result<AssignmentOutcome, PreconditionViolation> {
    check_participants(participants)?;
    Ok(run(participants, restrictions, config, env))
}

/// Generate an assignment for a validated lineup.
pub fn assign<E: Environment>(
    lineup: &Lineup,
    config: &EngineConfig,
    env: &E,
) -> AssignmentOutcome {
    run(lineup.participants(), lineup.restrictions(), config, env)
}

fn run<E: Environment>(
    participants: &[Participant],
    restrictions: &RestrictionSet,
    config: &EngineConfig,
    env: &E,
) -> AssignmentOutcome {
    for attempt in 1..=config.max_attempts {
        if let Some(pairs) = greedy_attempt(participants, restrictions, env) {
            debug!(
                participants = participants.len(),
                attempts = attempt,
                strategy = %Strategy::GreedyRestart,
                "assignment found"
            );
            return accept(pairs, participants, restrictions, attempt, Strategy::GreedyRestart);
        }
        trace!(attempt, "greedy attempt dead-ended, restarting");
    }

    let attempts = config.max_attempts;
    match config.fallback {
        Fallback::None => {
            warn!(participants = participants.len(), attempts, "no assignment within retry budget");
            AssignmentOutcome::Infeasible(Infeasible { attempts, proven: false })
        },
        Fallback::ExactMatching => {
            match matching::perfect_matching(participants, restrictions, env) {
                Some(pairs) => {
                    debug!(
                        participants = participants.len(),
                        attempts,
                        strategy = %Strategy::ExactMatching,
                        "assignment found"
                    );
                    accept(pairs, participants, restrictions, attempts, Strategy::ExactMatching)
                },
                None => {
                    warn!(
                        participants = participants.len(),
                        attempts,
                        "no perfect matching exists"
                    );
                    AssignmentOutcome::Infeasible(Infeasible { attempts, proven: true })
                },
            }
        },
    }
}

fn accept(
    pairs: Vec<(Participant, Participant)>,
    participants: &[Participant],
    restrictions: &RestrictionSet,
    attempts: u32,
    strategy: Strategy,
) -> AssignmentOutcome {
    let map = AssignmentMap::from_pairs(pairs);
    debug_assert_eq!(map.verify(participants, restrictions), Ok(()));
    for (giver, recipient) in map.iter() {
        trace!(%giver, %recipient, "assigned");
    }
    AssignmentOutcome::Assigned(Assignment { map, attempts, strategy })
}

/// One greedy pass. `None` when some giver is left with nobody to draw.
fn greedy_attempt<E: Environment>(
    participants: &[Participant],
    restrictions: &RestrictionSet,
    env: &E,
) -> Option<Vec<(Participant, Participant)>> {
    let mut rng = env.rng();
    let mut remaining: Vec<&Participant> = participants.iter().collect();
    let mut pairs = Vec::with_capacity(participants.len());

    for giver in participants {
        let valid: Vec<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, recipient)| {
                **recipient != giver && !restrictions.contains(giver.as_str(), recipient.as_str())
            })
            .map(|(index, _)| index)
            .collect();

        let &pick = valid.choose(&mut rng)?;
        let recipient = remaining.remove(pick);
        pairs.push((giver.clone(), recipient.clone()));
    }

    Some(pairs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{
        collections::VecDeque,
        future::Future,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use super::*;
    use crate::{env::SeededEnv, model::Restriction};

    /// Environment that serves a fixed byte script, then zeros.
    ///
    /// Zero bytes make every `gen_range` land on the low end of its range.
    #[derive(Clone, Default)]
    struct ScriptedEnv {
        bytes: Arc<Mutex<VecDeque<u8>>>,
    }

    impl ScriptedEnv {
        /// One entry per draw: `(k, n)` makes a range draw over `0..n` land
        /// on `k`.
        fn new(picks: &[(u32, u32)]) -> Self {
            let bytes = picks.iter().flat_map(|&(k, n)| word_for(k, n).to_be_bytes()).collect();
            Self { bytes: Arc::new(Mutex::new(bytes)) }
        }
    }

    /// The `u32` that `rand`'s widening-multiply range sampler maps to `k`
    /// within `0..n`.
    fn word_for(k: u32, n: u32) -> u32 {
        u32::try_from((u64::from(k) << 32).div_ceil(u64::from(n))).unwrap()
    }

    impl Environment for ScriptedEnv {
        fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
            std::future::ready(())
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            let mut script = self.bytes.lock().unwrap();
            for byte in buffer {
                *byte = script.pop_front().unwrap_or(0);
            }
        }
    }

    fn names(list: &[&str]) -> Vec<Participant> {
        list.iter().map(|n| Participant::new(n).unwrap()).collect()
    }

    fn restrictions(pairs: &[(&str, &str)]) -> RestrictionSet {
        pairs.iter().map(|(g, r)| Restriction::new(g, r).unwrap()).collect()
    }

    #[test]
    fn two_people_swap() {
        let people = names(&["A", "B"]);
        let outcome = generate_assignment(
            &people,
            &RestrictionSet::new(),
            &EngineConfig::default(),
            &SeededEnv::with_seed(1),
        )
        .unwrap();

        let assignment = outcome.into_assignment().unwrap();
        assert_eq!(assignment.map.recipient_for("A").unwrap(), "B");
        assert_eq!(assignment.map.recipient_for("B").unwrap(), "A");
        assert_eq!(assignment.attempts, 1);
        assert_eq!(assignment.strategy, Strategy::GreedyRestart);
    }

    #[test]
    fn mutual_exclusion_is_infeasible() {
        let people = names(&["A", "B"]);
        let rules = restrictions(&[("A", "B"), ("B", "A")]);

        let outcome = generate_assignment(
            &people,
            &rules,
            &EngineConfig::default(),
            &SeededEnv::with_seed(1),
        )
        .unwrap();

        assert_eq!(
            outcome,
            AssignmentOutcome::Infeasible(Infeasible {
                attempts: DEFAULT_MAX_ATTEMPTS,
                proven: false
            })
        );
    }

    #[test]
    fn exact_fallback_proves_infeasibility() {
        let people = names(&["A", "B"]);
        let rules = restrictions(&[("A", "B"), ("B", "A")]);
        let config = EngineConfig::default().with_fallback(Fallback::ExactMatching);

        let outcome = generate_assignment(&people, &rules, &config, &SeededEnv::with_seed(1));

        assert_eq!(
            outcome.unwrap(),
            AssignmentOutcome::Infeasible(Infeasible {
                attempts: DEFAULT_MAX_ATTEMPTS,
                proven: true
            })
        );
    }

    #[test]
    fn dead_end_restarts_from_scratch() {
        // Attempt 1: A->B, B->A, C has nobody left.
        // Attempt 2: A->C, B->A, C->B.
        let env = ScriptedEnv::new(&[(0, 2), (0, 2), (1, 2), (0, 1), (0, 1)]);
        let people = names(&["A", "B", "C"]);

        let outcome =
            generate_assignment(&people, &RestrictionSet::new(), &EngineConfig::default(), &env)
                .unwrap();

        let assignment = outcome.into_assignment().unwrap();
        assert_eq!(assignment.attempts, 2);
        assert_eq!(assignment.map.recipient_for("A").unwrap(), "C");
        assert_eq!(assignment.map.recipient_for("B").unwrap(), "A");
        assert_eq!(assignment.map.recipient_for("C").unwrap(), "B");
    }

    #[test]
    fn tiny_budget_forces_infeasible() {
        let env = ScriptedEnv::new(&[(0, 2), (0, 2)]);
        let people = names(&["A", "B", "C"]);
        let config = EngineConfig::default().with_max_attempts(1);

        let outcome = generate_assignment(&people, &RestrictionSet::new(), &config, &env).unwrap();

        assert_eq!(
            outcome,
            AssignmentOutcome::Infeasible(Infeasible { attempts: 1, proven: false })
        );
    }

    #[test]
    fn low_draws_dead_end_on_every_attempt() {
        let people = names(&["A", "B", "C"]);
        let config = EngineConfig::default().with_max_attempts(5);

        let outcome =
            generate_assignment(&people, &RestrictionSet::new(), &config, &ScriptedEnv::default())
                .unwrap();

        assert_eq!(
            outcome,
            AssignmentOutcome::Infeasible(Infeasible { attempts: 5, proven: false })
        );
    }

    #[test]
    fn exact_fallback_rescues_unlucky_budget() {
        let env = ScriptedEnv::new(&[(0, 2), (0, 2)]);
        let people = names(&["A", "B", "C"]);
        let config =
            EngineConfig::default().with_max_attempts(1).with_fallback(Fallback::ExactMatching);

        let outcome = generate_assignment(&people, &RestrictionSet::new(), &config, &env).unwrap();

        let assignment = outcome.into_assignment().unwrap();
        assert_eq!(assignment.strategy, Strategy::ExactMatching);
        assert_eq!(assignment.attempts, 1);
        assert_eq!(assignment.map.verify(&people, &RestrictionSet::new()), Ok(()));
    }

    #[test]
    fn zero_budget_without_fallback_is_infeasible() {
        let people = names(&["A", "B"]);
        let config = EngineConfig::default().with_max_attempts(0);

        let outcome =
            generate_assignment(&people, &RestrictionSet::new(), &config, &SeededEnv::with_seed(0))
                .unwrap();

        assert!(!outcome.is_assigned());
    }

    #[test]
    fn rejects_too_few_participants() {
        let result = generate_assignment(
            &names(&["A"]),
            &RestrictionSet::new(),
            &EngineConfig::default(),
            &SeededEnv::with_seed(0),
        );
        assert_eq!(result, Err(PreconditionViolation::TooFewParticipants { found: 1 }));
    }

    #[test]
    fn rejects_duplicate_participants() {
        let result = generate_assignment(
            &names(&["A", "B", "A"]),
            &RestrictionSet::new(),
            &EngineConfig::default(),
            &SeededEnv::with_seed(0),
        );
        assert!(matches!(result, Err(PreconditionViolation::DuplicateParticipant { .. })));
    }

    #[test]
    fn same_seed_same_assignment() {
        let people = names(&["A", "B", "C", "D", "E", "F"]);
        let rules = restrictions(&[("A", "B"), ("C", "D")]);
        let config = EngineConfig::default();

        let first = generate_assignment(&people, &rules, &config, &SeededEnv::with_seed(77));
        let second = generate_assignment(&people, &rules, &config, &SeededEnv::with_seed(77));

        assert_eq!(first, second);
    }

    #[test]
    fn restrictions_outside_group_are_ignored() {
        let people = names(&["A", "B"]);
        let rules = restrictions(&[("A", "Zed"), ("Zed", "B")]);

        let outcome =
            generate_assignment(&people, &rules, &EngineConfig::default(), &SeededEnv::with_seed(4))
                .unwrap();

        assert!(outcome.is_assigned());
    }

    #[test]
    fn verify_catches_each_violation() {
        let people = names(&["A", "B", "C"]);
        let rules = restrictions(&[("A", "B")]);
        let p = |n: &str| Participant::new(n).unwrap();

        let short = AssignmentMap::from_pairs([(p("A"), p("B"))]);
        assert!(matches!(
            short.verify(&people, &rules),
            Err(AssignmentViolation::SizeMismatch { expected: 3, actual: 1 })
        ));

        let selfish =
            AssignmentMap::from_pairs([(p("A"), p("C")), (p("B"), p("B")), (p("C"), p("A"))]);
        assert!(matches!(
            selfish.verify(&people, &rules),
            Err(AssignmentViolation::SelfAssignment { .. })
        ));

        let restricted =
            AssignmentMap::from_pairs([(p("A"), p("B")), (p("B"), p("C")), (p("C"), p("A"))]);
        assert!(matches!(
            restricted.verify(&people, &rules),
            Err(AssignmentViolation::RestrictedPair { .. })
        ));

        let doubled =
            AssignmentMap::from_pairs([(p("A"), p("C")), (p("B"), p("C")), (p("C"), p("A"))]);
        assert!(matches!(
            doubled.verify(&people, &rules),
            Err(AssignmentViolation::DuplicateRecipient { .. })
        ));

        let stranger =
            AssignmentMap::from_pairs([(p("A"), p("C")), (p("B"), p("Zed")), (p("C"), p("A"))]);
        assert!(matches!(
            stranger.verify(&people, &rules),
            Err(AssignmentViolation::UnknownRecipient { .. })
        ));

        let missing =
            AssignmentMap::from_pairs([(p("A"), p("C")), (p("A"), p("B")), (p("C"), p("A"))]);
        assert!(matches!(
            missing.verify(&people, &rules),
            Err(AssignmentViolation::MissingGiver { .. })
        ));
    }
}
