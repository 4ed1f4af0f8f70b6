//! Exact fallback: bipartite perfect matching.
//!
//! Givers sit on the left, recipients on the right, with an edge wherever a
//! giver may draw a recipient (not themselves, not restricted). A perfect
//! matching on that graph is exactly a valid assignment, so its absence
//! proves the group infeasible.
//!
//! Uses augmenting paths (Kuhn). Candidate lists and giver order are
//! shuffled from the environment so repeated runs vary, but the result is
//! not uniformly distributed over all valid assignments.

use rand::seq::SliceRandom;

use crate::{
    env::Environment,
    model::{Participant, RestrictionSet},
};

/// Find a perfect matching, or `None` if the compatibility graph has none.
pub(super) fn perfect_matching<E: Environment>(
    participants: &[Participant],
    restrictions: &RestrictionSet,
    env: &E,
) -> Option<Vec<(Participant, Participant)>> {
    let n = participants.len();
    let mut rng = env.rng();

    let candidates: Vec<Vec<usize>> = participants
        .iter()
        .enumerate()
        .map(|(g, giver)| {
            let mut options: Vec<usize> = (0..n)
                .filter(|&r| {
                    r != g && !restrictions.contains(giver.as_str(), participants[r].as_str())
                })
                .collect();
            options.shuffle(&mut rng);
            options
        })
        .collect();

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut rng);

    // owner[r] = giver currently matched to recipient r
    let mut owner: Vec<Option<usize>> = vec![None; n];
    for giver in order {
        let mut visited = vec![false; n];
        if !augment(giver, &candidates, &mut owner, &mut visited) {
            return None;
        }
    }

    let mut recipient_of = vec![0usize; n];
    for (recipient, giver) in owner.iter().enumerate() {
        recipient_of[(*giver)?] = recipient;
    }

    Some(
        participants
            .iter()
            .zip(recipient_of)
            .map(|(giver, r)| (giver.clone(), participants[r].clone()))
            .collect(),
    )
}

/// Try to match `giver`, re-routing earlier matches along an alternating
/// path when its candidates are taken.
fn augment(
    giver: usize,
    candidates: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &recipient in &candidates[giver] {
        if visited[recipient] {
            continue;
        }
        visited[recipient] = true;

        let free = match owner[recipient] {
            None => true,
            Some(current) => augment(current, candidates, owner, visited),
        };
        if free {
            owner[recipient] = Some(giver);
            return true;
        }
    }
    false
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{env::SeededEnv, model::Restriction};

    fn names(list: &[&str]) -> Vec<Participant> {
        list.iter().map(|n| Participant::new(n).unwrap()).collect()
    }

    #[test]
    fn finds_derangement_without_restrictions() {
        let people = names(&["A", "B", "C", "D"]);
        let rules = RestrictionSet::new();

        let pairs = perfect_matching(&people, &rules, &SeededEnv::with_seed(9)).unwrap();

        assert_eq!(pairs.len(), 4);
        for (giver, recipient) in &pairs {
            assert_ne!(giver, recipient);
        }
    }

    #[test]
    fn forced_cycle_is_found() {
        // Only A->B->C->A survives.
        let people = names(&["A", "B", "C"]);
        let rules: RestrictionSet = [("A", "C"), ("B", "A"), ("C", "B")]
            .iter()
            .map(|(g, r)| Restriction::new(g, r).unwrap())
            .collect();

        let pairs = perfect_matching(&people, &rules, &SeededEnv::with_seed(3)).unwrap();

        let expected = names(&["B", "C", "A"]);
        let recipients: Vec<_> = pairs.into_iter().map(|(_, r)| r).collect();
        assert_eq!(recipients, expected);
    }

    #[test]
    fn recipient_excluded_by_everyone_has_no_matching() {
        let people = names(&["A", "B", "C"]);
        let rules: RestrictionSet = [("B", "A"), ("C", "A")]
            .iter()
            .map(|(g, r)| Restriction::new(g, r).unwrap())
            .collect();

        assert!(perfect_matching(&people, &rules, &SeededEnv::with_seed(3)).is_none());
    }
}
