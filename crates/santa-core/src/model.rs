//! Participant and restriction model.
//!
//! The editing phase owns a [`Roster`], a draft-friendly value that every
//! edit replaces rather than mutates. Once a game starts, the roster is
//! frozen into a [`Lineup`]: at least two distinct participants and only the
//! restrictions whose endpoints are both present.
//!
//! Restrictions that mention a name missing from the roster are kept but
//! inert. They never reach the engine.

use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet, HashSet},
    fmt,
};

use crate::error::{InsufficientParticipants, ModelError, PreconditionViolation};

/// Smallest group that admits an assignment.
pub const MIN_PARTICIPANTS: usize = 2;

/// A participant's display name.
///
/// Always trimmed and never blank. Equality is by value, which is what makes
/// names unique within a roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Participant(String);

impl Participant {
    /// Create a participant from a raw name, trimming surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ModelError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ModelError::BlankName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Participant {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Participant {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Participant {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Participant {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A directed exclusion: `giver` must not be assigned to gift `restricted`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Restriction {
    /// Participant doing the giving.
    pub giver: Participant,
    /// Participant the giver may not draw.
    pub restricted: Participant,
}

impl Restriction {
    /// Build a restriction from raw names.
    pub fn new(giver: impl AsRef<str>, restricted: impl AsRef<str>) -> Result<Self, ModelError> {
        Ok(Self { giver: Participant::new(giver)?, restricted: Participant::new(restricted)? })
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cannot gift to: {}", self.giver, self.restricted)
    }
}

/// Set of restrictions, indexed by giver.
///
/// Duplicates collapse and self-pairs are never stored: self-gifting is
/// already excluded by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestrictionSet {
    by_giver: BTreeMap<Participant, BTreeSet<Participant>>,
}

impl RestrictionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a restriction. Returns `false` if it was already present or is a
    /// self-pair.
    pub fn insert(&mut self, restriction: Restriction) -> bool {
        let Restriction { giver, restricted } = restriction;
        if giver == restricted {
            return false;
        }
        self.by_giver.entry(giver).or_default().insert(restricted)
    }

    /// Remove a restriction. Returns `false` if it was not present.
    pub fn remove(&mut self, giver: &str, restricted: &str) -> bool {
        let Some(targets) = self.by_giver.get_mut(giver) else {
            return false;
        };
        let removed = targets.remove(restricted);
        if targets.is_empty() {
            self.by_giver.remove(giver);
        }
        removed
    }

    /// Whether `giver` is forbidden from gifting `restricted`.
    pub fn contains(&self, giver: &str, restricted: &str) -> bool {
        self.by_giver.get(giver).is_some_and(|targets| targets.contains(restricted))
    }

    /// Everyone `giver` may not draw, in name order.
    pub fn restricted_for(&self, giver: &str) -> impl Iterator<Item = &Participant> {
        self.by_giver.get(giver).into_iter().flatten()
    }

    /// All `(giver, restricted)` pairs, ordered by giver then restricted.
    pub fn iter(&self) -> impl Iterator<Item = (&Participant, &Participant)> {
        self.by_giver
            .iter()
            .flat_map(|(giver, targets)| targets.iter().map(move |target| (giver, target)))
    }

    /// Number of stored restrictions.
    pub fn len(&self) -> usize {
        self.by_giver.values().map(BTreeSet::len).sum()
    }

    /// Whether the set holds no restrictions.
    pub fn is_empty(&self) -> bool {
        self.by_giver.is_empty()
    }

    /// The subset whose giver and restricted are both in `participants`.
    pub fn restricted_to(&self, participants: &[Participant]) -> Self {
        let present: HashSet<&str> = participants.iter().map(Participant::as_str).collect();
        self.iter()
            .filter(|(giver, target)| {
                present.contains(giver.as_str()) && present.contains(target.as_str())
            })
            .map(|(giver, target)| Restriction { giver: giver.clone(), restricted: target.clone() })
            .collect()
    }

    /// Drop every restriction that mentions `name` on either side.
    fn remove_mentions(&mut self, name: &str) {
        self.by_giver.remove(name);
        for targets in self.by_giver.values_mut() {
            targets.remove(name);
        }
        self.by_giver.retain(|_, targets| !targets.is_empty());
    }

    /// Rewrite every mention of `old` to `new`.
    fn rename(&mut self, old: &str, new: &Participant) {
        let swap = |p: &Participant| if p == old { new.clone() } else { p.clone() };
        *self = self
            .iter()
            .map(|(giver, target)| Restriction { giver: swap(giver), restricted: swap(target) })
            .collect();
    }
}

impl FromIterator<Restriction> for RestrictionSet {
    fn from_iter<I: IntoIterator<Item = Restriction>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Restriction> for RestrictionSet {
    fn extend<I: IntoIterator<Item = Restriction>>(&mut self, iter: I) {
        for restriction in iter {
            self.insert(restriction);
        }
    }
}

/// Editable group model.
///
/// Every edit produces a new roster. Participant order is the reveal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    participants: Vec<Participant>,
    restrictions: RestrictionSet,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Participants in reveal order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// All restrictions, including inert ones.
    pub fn restrictions(&self) -> &RestrictionSet {
        &self.restrictions
    }

    /// Restrictions whose endpoints are both on the roster.
    pub fn active_restrictions(&self) -> RestrictionSet {
        self.restrictions.restricted_to(&self.participants)
    }

    /// Whether `giver` is forbidden from gifting `restricted`.
    pub fn is_restricted(&self, giver: &str, restricted: &str) -> bool {
        self.restrictions.contains(giver, restricted)
    }

    /// Everyone `giver` may not draw.
    pub fn restricted_for(&self, giver: &str) -> impl Iterator<Item = &Participant> {
        self.restrictions.restricted_for(giver)
    }

    /// Whether `name` is on the roster.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.participants.iter().position(|p| p == name)
    }

    /// Append a participant to the end of the reveal order.
    pub fn with_participant(&self, name: impl AsRef<str>) -> Result<Self, ModelError> {
        let participant = Participant::new(name)?;
        if self.contains(participant.as_str()) {
            return Err(ModelError::DuplicateParticipant { name: participant });
        }

        let mut next = self.clone();
        next.participants.push(participant);
        Ok(next)
    }

    /// Remove a participant and every restriction that mentions them.
    pub fn without_participant(&self, name: &str) -> Result<Self, ModelError> {
        let name = name.trim();
        let index = self
            .position(name)
            .ok_or_else(|| ModelError::UnknownParticipant { name: name.to_owned() })?;

        let mut next = self.clone();
        next.participants.remove(index);
        next.restrictions.remove_mentions(name);
        Ok(next)
    }

    /// Rename a participant in place, carrying their restrictions along.
    pub fn with_participant_renamed(
        &self,
        old: &str,
        new: impl AsRef<str>,
    ) -> Result<Self, ModelError> {
        let old = old.trim();
        let index = self
            .position(old)
            .ok_or_else(|| ModelError::UnknownParticipant { name: old.to_owned() })?;
        let renamed = Participant::new(new)?;
        if renamed == old {
            return Ok(self.clone());
        }
        if self.contains(renamed.as_str()) {
            return Err(ModelError::DuplicateParticipant { name: renamed });
        }

        let mut next = self.clone();
        next.restrictions.rename(old, &renamed);
        next.participants[index] = renamed;
        Ok(next)
    }

    /// Move the participant at `from` so they end up at `to`.
    pub fn with_participant_moved(&self, from: usize, to: usize) -> Result<Self, ModelError> {
        let len = self.participants.len();
        for index in [from, to] {
            if index >= len {
                return Err(ModelError::IndexOutOfRange { index, len });
            }
        }

        let mut next = self.clone();
        let participant = next.participants.remove(from);
        next.participants.insert(to, participant);
        Ok(next)
    }

    /// Add the restriction if absent, remove it if present.
    ///
    /// Blank names and self-pairs leave the roster unchanged.
    pub fn with_restriction_toggled(&self, giver: &str, restricted: &str) -> Self {
        if self.is_restricted(giver.trim(), restricted.trim()) {
            self.without_restriction(giver, restricted)
        } else {
            self.with_restriction(giver, restricted)
        }
    }

    /// Ensure the restriction is present.
    pub fn with_restriction(&self, giver: &str, restricted: &str) -> Self {
        let mut next = self.clone();
        if let Ok(restriction) = Restriction::new(giver, restricted) {
            next.restrictions.insert(restriction);
        }
        next
    }

    /// Ensure the restriction is absent.
    pub fn without_restriction(&self, giver: &str, restricted: &str) -> Self {
        let mut next = self.clone();
        next.restrictions.remove(giver.trim(), restricted.trim());
        next
    }

    /// Freeze the roster for a game.
    pub fn lineup(&self) -> Result<Lineup, InsufficientParticipants> {
        if self.participants.len() < MIN_PARTICIPANTS {
            return Err(InsufficientParticipants { found: self.participants.len() });
        }

        Ok(Lineup {
            participants: self.participants.clone(),
            restrictions: self.active_restrictions(),
        })
    }
}

/// Validated, immutable participant list for one game.
///
/// Holds at least [`MIN_PARTICIPANTS`] distinct participants in reveal order
/// and only restrictions between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineup {
    participants: Vec<Participant>,
    restrictions: RestrictionSet,
}

impl Lineup {
    /// Build a lineup directly, re-validating the engine preconditions.
    pub fn new(
        participants: Vec<Participant>,
        restrictions: &RestrictionSet,
    ) -> Result<Self, PreconditionViolation> {
        check_participants(&participants)?;
        let restrictions = restrictions.restricted_to(&participants);
        Ok(Self { participants, restrictions })
    }

    /// Participants in reveal order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Restrictions between lineup members.
    pub fn restrictions(&self) -> &RestrictionSet {
        &self.restrictions
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Always `false`; a lineup has at least two participants.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Rebuild an editable roster holding the same participants and
    /// restrictions.
    pub fn to_roster(&self) -> Roster {
        Roster { participants: self.participants.clone(), restrictions: self.restrictions.clone() }
    }
}

/// Check the count and uniqueness the engine relies on.
pub(crate) fn check_participants(
    participants: &[Participant],
) -> Result<(), PreconditionViolation> {
    if participants.len() < MIN_PARTICIPANTS {
        return Err(PreconditionViolation::TooFewParticipants { found: participants.len() });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        if !seen.insert(participant.as_str()) {
            return Err(PreconditionViolation::DuplicateParticipant { name: participant.clone() });
        }
    }

    Ok(())
}
