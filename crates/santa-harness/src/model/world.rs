//! Model session - the reference implementation.
//!
//! Tracks the roster as plain strings and decides feasibility by trying
//! every permutation. Lineups are capped by the name pool, so enumeration
//! stays small.

use std::collections::BTreeSet;

use santa_session::PhaseKind;

use super::operation::{
    NameId, Operation, OperationError, OperationNotice, OperationResult, pool_name,
};

/// Giver → restricted pairs.
type Pairs = BTreeSet<(String, String)>;

/// Observable state for oracle comparison.
///
/// This is the subset of session state that can be compared against the
/// real implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Current phase.
    pub phase: PhaseKind,
    /// Roster participants, or the lineup once revealing.
    pub participants: Vec<String>,
    /// Roster restrictions, or the active lineup restrictions once
    /// revealing. Sorted.
    pub restrictions: Vec<(String, String)>,
    /// Reveal cursor `(index, revealed)` while revealing.
    pub cursor: Option<(usize, bool)>,
}

#[derive(Debug, Clone)]
enum ModelPhase {
    Editing,
    Ready,
    Revealing { lineup: Vec<String>, active: Pairs, index: usize, revealed: bool },
}

/// Model session.
#[derive(Debug, Clone)]
pub struct ModelSession {
    phase: ModelPhase,
    participants: Vec<String>,
    restrictions: Pairs,
}

impl Default for ModelSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSession {
    /// Create an empty session in the editing phase.
    pub fn new() -> Self {
        Self { phase: ModelPhase::Editing, participants: Vec::new(), restrictions: Pairs::new() }
    }

    /// Apply an operation and return the result.
    ///
    /// The result should match the real session's result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Add { name } => self.editing(|m| m.apply_add(*name)),
            Operation::Remove { name } => self.editing(|m| m.apply_remove(*name)),
            Operation::Rename { from, to } => self.editing(|m| m.apply_rename(*from, *to)),
            Operation::Move { from, to } => {
                self.editing(|m| m.apply_move(usize::from(*from), usize::from(*to)))
            },
            Operation::Toggle { giver, restricted } => {
                self.editing(|m| m.apply_toggle(*giver, *restricted))
            },
            Operation::StartGame => self.editing(Self::apply_start_game),
            Operation::BackToEditing => match self.phase {
                ModelPhase::Ready => {
                    self.phase = ModelPhase::Editing;
                    OperationResult::Ok
                },
                _ => OperationResult::Error(OperationError::InvalidPhase),
            },
            Operation::Generate => self.apply_generate(),
            Operation::Reveal => match &mut self.phase {
                ModelPhase::Revealing { revealed, .. } => {
                    *revealed = true;
                    OperationResult::Ok
                },
                _ => OperationResult::Error(OperationError::InvalidPhase),
            },
            Operation::Advance => match &mut self.phase {
                ModelPhase::Revealing { lineup, index, revealed, .. } => {
                    if *revealed && *index + 1 < lineup.len() {
                        *index += 1;
                        *revealed = false;
                    }
                    OperationResult::Ok
                },
                _ => OperationResult::Error(OperationError::InvalidPhase),
            },
            Operation::Reset => {
                *self = Self::new();
                OperationResult::Ok
            },
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        match &self.phase {
            ModelPhase::Editing | ModelPhase::Ready => ObservableState {
                phase: if matches!(self.phase, ModelPhase::Editing) {
                    PhaseKind::Editing
                } else {
                    PhaseKind::Ready
                },
                participants: self.participants.clone(),
                restrictions: self.restrictions.iter().cloned().collect(),
                cursor: None,
            },
            ModelPhase::Revealing { lineup, active, index, revealed } => ObservableState {
                phase: PhaseKind::Revealing,
                participants: lineup.clone(),
                restrictions: active.iter().cloned().collect(),
                cursor: Some((*index, *revealed)),
            },
        }
    }

    /// Participants and active restrictions of the game in progress.
    pub fn lineup(&self) -> Option<(&[String], &Pairs)> {
        match &self.phase {
            ModelPhase::Revealing { lineup, active, .. } => Some((lineup, active)),
            _ => None,
        }
    }

    fn editing(&mut self, f: impl FnOnce(&mut Self) -> OperationResult) -> OperationResult {
        match self.phase {
            ModelPhase::Editing => f(self),
            _ => OperationResult::Error(OperationError::InvalidPhase),
        }
    }

    fn apply_add(&mut self, name: NameId) -> OperationResult {
        let name = pool_name(name);
        if self.participants.iter().any(|p| p == name) {
            return OperationResult::Error(OperationError::DuplicateName);
        }
        self.participants.push(name.to_string());
        OperationResult::Ok
    }

    fn apply_remove(&mut self, name: NameId) -> OperationResult {
        let name = pool_name(name);
        let Some(index) = self.participants.iter().position(|p| p == name) else {
            return OperationResult::Error(OperationError::UnknownName);
        };
        self.participants.remove(index);
        self.restrictions.retain(|(g, r)| g != name && r != name);
        OperationResult::Ok
    }

    fn apply_rename(&mut self, from: NameId, to: NameId) -> OperationResult {
        let (from, to) = (pool_name(from), pool_name(to));
        let Some(index) = self.participants.iter().position(|p| p == from) else {
            return OperationResult::Error(OperationError::UnknownName);
        };
        if from == to {
            return OperationResult::Ok;
        }
        if self.participants.iter().any(|p| p == to) {
            return OperationResult::Error(OperationError::DuplicateName);
        }

        self.participants[index] = to.to_string();
        let swap = |name: &String| if name == from { to.to_string() } else { name.clone() };
        self.restrictions = self
            .restrictions
            .iter()
            .map(|(g, r)| (swap(g), swap(r)))
            .filter(|(g, r)| g != r)
            .collect();
        OperationResult::Ok
    }

    fn apply_move(&mut self, from: usize, to: usize) -> OperationResult {
        let len = self.participants.len();
        if from >= len || to >= len {
            return OperationResult::Error(OperationError::IndexOutOfRange);
        }
        let participant = self.participants.remove(from);
        self.participants.insert(to, participant);
        OperationResult::Ok
    }

    fn apply_toggle(&mut self, giver: NameId, restricted: NameId) -> OperationResult {
        let pair = (pool_name(giver).to_string(), pool_name(restricted).to_string());
        if pair.0 != pair.1 && !self.restrictions.remove(&pair) {
            self.restrictions.insert(pair);
        }
        OperationResult::Ok
    }

    fn apply_start_game(&mut self) -> OperationResult {
        if self.participants.len() < 2 {
            return OperationResult::Notice(OperationNotice::TooFewParticipants);
        }
        self.phase = ModelPhase::Ready;
        OperationResult::Ok
    }

    fn apply_generate(&mut self) -> OperationResult {
        if !matches!(self.phase, ModelPhase::Ready) {
            return OperationResult::Error(OperationError::InvalidPhase);
        }

        let lineup = self.participants.clone();
        let active: Pairs = self
            .restrictions
            .iter()
            .filter(|(g, r)| lineup.contains(g) && lineup.contains(r))
            .cloned()
            .collect();

        if !has_valid_assignment(&lineup, &active) {
            return OperationResult::Notice(OperationNotice::Infeasible);
        }

        self.phase = ModelPhase::Revealing { lineup, active, index: 0, revealed: false };
        OperationResult::Ok
    }
}

/// Whether any permutation of `participants` is a valid assignment.
pub fn has_valid_assignment(participants: &[String], restrictions: &Pairs) -> bool {
    fn search(
        giver: usize,
        participants: &[String],
        restrictions: &Pairs,
        taken: &mut Vec<bool>,
    ) -> bool {
        let Some(from) = participants.get(giver) else {
            return true;
        };
        for (slot, to) in participants.iter().enumerate() {
            if taken[slot] || from == to || restrictions.contains(&(from.clone(), to.clone())) {
                continue;
            }
            taken[slot] = true;
            if search(giver + 1, participants, restrictions, taken) {
                return true;
            }
            taken[slot] = false;
        }
        false
    }

    let mut taken = vec![false; participants.len()];
    search(0, participants, restrictions, &mut taken)
}
