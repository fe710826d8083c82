//! The creature roster.
//!
//! Non-guardian creatures live in an ordered vector; the guardian lives in a
//! dedicated slot. Iteration, indexing and rendering always visit the vector
//! first and the guardian last, so "the guardian is the last element" holds
//! structurally and never has to be restored after a merge or absorption.

use saltitantes_types::{Creature, CreatureId};

/// Ordered collection of creatures with at most one guardian.
#[derive(Debug, Clone)]
pub struct Roster {
    creatures: Vec<Creature>,
    guardian: Option<Creature>,
    next_id: u64,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self {
            creatures: Vec::new(),
            guardian: None,
            next_id: 1,
        }
    }

    /// Total number of creatures, guardian included.
    pub fn len(&self) -> usize {
        self.creatures
            .len()
            .saturating_add(usize::from(self.guardian.is_some()))
    }

    /// Whether the roster holds no creature at all.
    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty() && self.guardian.is_none()
    }

    /// Number of non-guardian creatures.
    pub fn non_guardian_count(&self) -> usize {
        self.creatures.len()
    }

    /// Reserve the next creature id. Ids are never reused.
    pub fn allocate_id(&mut self) -> CreatureId {
        let id = CreatureId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Append a creature.
    ///
    /// A guardian goes to the guardian slot and is refused if one already
    /// exists. Returns `false` when the creature was not inserted.
    pub fn push(&mut self, creature: Creature) -> bool {
        if creature.is_guardian() {
            if self.guardian.is_some() {
                return false;
            }
            self.guardian = Some(creature);
        } else {
            self.creatures.push(creature);
        }
        true
    }

    /// Remove a non-guardian creature by id.
    ///
    /// The guardian is never removable and yields `None`.
    pub fn remove(&mut self, id: CreatureId) -> Option<Creature> {
        let pos = self.creatures.iter().position(|c| c.id == id)?;
        Some(self.creatures.remove(pos))
    }

    /// Remove every creature, guardian included. Id allocation continues.
    pub fn clear(&mut self) {
        self.creatures.clear();
        self.guardian = None;
    }

    /// Creature at a roster index (guardian at `len() - 1` when present).
    pub fn get(&self, index: usize) -> Option<&Creature> {
        match self.creatures.get(index) {
            Some(c) => Some(c),
            None if index == self.creatures.len() => self.guardian.as_ref(),
            None => None,
        }
    }

    /// Mutable creature at a roster index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Creature> {
        let active = self.creatures.len();
        if index == active {
            return self.guardian.as_mut();
        }
        self.creatures.get_mut(index)
    }

    /// Look up a creature by id.
    pub fn find(&self, id: CreatureId) -> Option<&Creature> {
        self.iter().find(|c| c.id == id)
    }

    /// Look up a creature by id for mutation.
    pub fn find_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.iter_mut().find(|c| c.id == id)
    }

    /// The last creature in roster order.
    pub fn last(&self) -> Option<&Creature> {
        self.guardian.as_ref().or_else(|| self.creatures.last())
    }

    /// The guardian, if one was created.
    pub const fn guardian(&self) -> Option<&Creature> {
        self.guardian.as_ref()
    }

    /// The guardian, mutably.
    pub const fn guardian_mut(&mut self) -> Option<&mut Creature> {
        self.guardian.as_mut()
    }

    /// Whether a guardian exists.
    pub const fn has_guardian(&self) -> bool {
        self.guardian.is_some()
    }

    /// Non-guardian creatures in roster order.
    pub fn active(&self) -> &[Creature] {
        &self.creatures
    }

    /// Non-guardian creatures, mutably.
    pub fn active_mut(&mut self) -> &mut [Creature] {
        &mut self.creatures
    }

    /// All creatures, guardian last.
    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.iter().chain(self.guardian.iter())
    }

    /// All creatures mutably, guardian last.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Creature> {
        self.creatures.iter_mut().chain(self.guardian.iter_mut())
    }

    /// Owned copy of the non-guardian creatures for long sweeps.
    pub fn snapshot(&self) -> Vec<Creature> {
        self.creatures.clone()
    }

    /// Whether any non-guardian creature is travelling toward its target.
    pub fn any_moving(&self) -> bool {
        self.creatures.iter().any(|c| c.can_move)
    }
}
