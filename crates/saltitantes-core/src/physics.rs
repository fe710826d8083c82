//! Vertical bounce integration and the round-robin horizontal mover.
//!
//! Every physics tick applies gravity to every creature, then lets exactly
//! one creature (the one under the cursor) take a horizontal step. The
//! cursor only advances past a creature once it has settled, so a cursor
//! wrap back to index 0 means every creature reached its target: a sweep.

use saltitantes_types::{Creature, CreatureId};

use crate::config::PhysicsConfig;
use crate::roster::Roster;

/// Outcome of one round-robin movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStep {
    /// The roster is empty; nothing to update.
    Empty,
    /// The creature under the cursor stepped toward its target.
    Moved(CreatureId),
    /// The creature under the cursor reached its target this tick.
    Settled(CreatureId),
    /// The cursor moved on to the next creature.
    Advanced,
    /// The cursor wrapped to index 0: every creature is settled.
    SweepCompleted,
}

impl MoveStep {
    /// Whether this step closed a sweep.
    pub const fn completes_sweep(self) -> bool {
        matches!(self, Self::SweepCompleted)
    }
}

/// Integrate gravity for one creature and bounce it off the ground.
pub const fn apply_gravity(creature: &mut Creature, physics: &PhysicsConfig, ground_y: i32) {
    creature.spd_y = creature.spd_y.saturating_add(physics.gravity);
    creature.y = creature.y.saturating_add(creature.spd_y);
    if creature.y >= ground_y {
        creature.y = ground_y;
        creature.spd_y = physics.jump_force;
    }
}

/// Apply gravity to every creature in the roster, guardian included.
pub fn apply_gravity_all(roster: &mut Roster, physics: &PhysicsConfig, ground_y: i32) {
    for creature in roster.iter_mut() {
        apply_gravity(creature, physics, ground_y);
    }
}

/// Move a creature by at most `|spd_x|` pixels toward its target.
///
/// The step never overshoots, so the creature lands exactly on target.
pub fn step_toward_target(creature: &mut Creature) {
    let remaining = creature.x.abs_diff(creature.target);
    let stride = creature.spd_x.unsigned_abs().max(1).min(remaining);
    let stride = i32::try_from(stride).unwrap_or(i32::MAX);
    if creature.target > creature.x {
        creature.x = creature.x.saturating_add(stride);
    } else if creature.target < creature.x {
        creature.x = creature.x.saturating_sub(stride);
    }
}

/// Round-robin cursor selecting the single creature that moves each tick.
///
/// Owned by the session so cursors never leak between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementScheduler {
    cursor: usize,
}

impl MovementScheduler {
    /// Create a scheduler starting at index 0.
    pub const fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Current cursor index.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rewind to the start of the roster.
    pub const fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Pull the cursor back into range after the roster shrank.
    pub const fn clamp(&mut self, len: usize) {
        if self.cursor >= len {
            self.cursor = 0;
        }
    }

    /// Run one movement step against the roster.
    pub fn step(&mut self, roster: &mut Roster) -> MoveStep {
        let len = roster.len();
        self.clamp(len);
        let Some(creature) = roster.get_mut(self.cursor) else {
            self.cursor = 0;
            return MoveStep::Empty;
        };

        if creature.can_move {
            let id = creature.id;
            if creature.x != creature.target {
                if !creature.is_guardian() {
                    creature.can_theft = false;
                }
                step_toward_target(creature);
                if creature.x != creature.target {
                    return MoveStep::Moved(id);
                }
            }
            creature.can_move = false;
            return MoveStep::Settled(id);
        }

        self.cursor = self.cursor.saturating_add(1);
        if self.cursor >= len {
            self.cursor = 0;
            return MoveStep::SweepCompleted;
        }
        MoveStep::Advanced
    }
}

#[cfg(test)]
mod tests {
    use saltitantes_types::CreatureRole;

    use super::*;

    const GROUND: i32 = 390;

    fn roster_with(xs: &[(i32, i32)]) -> Roster {
        let mut roster = Roster::new();
        for &(x, target) in xs {
            let id = roster.allocate_id();
            let mut c = Creature::new(id, CreatureRole::Normal, x, GROUND);
            c.target = target;
            c.can_move = x != target;
            roster.push(c);
        }
        roster
    }

    #[test]
    fn gravity_accumulates_then_bounces() {
        let physics = PhysicsConfig::default();
        let mut c = Creature::new(CreatureId(1), CreatureRole::Normal, 0, 380);
        apply_gravity(&mut c, &physics, GROUND);
        assert_eq!((c.y, c.spd_y), (381, 1));
        apply_gravity(&mut c, &physics, GROUND);
        assert_eq!((c.y, c.spd_y), (383, 2));

        c.y = 389;
        apply_gravity(&mut c, &physics, GROUND);
        assert_eq!(c.y, GROUND);
        assert_eq!(c.spd_y, physics.jump_force);
    }

    #[test]
    fn creatures_keep_bouncing_while_settled() {
        let physics = PhysicsConfig::default();
        let mut c = Creature::new(CreatureId(1), CreatureRole::Normal, 0, GROUND);
        let bounces = (0..200)
            .filter(|_| {
                apply_gravity(&mut c, &physics, GROUND);
                assert!(c.y <= GROUND);
                c.y == GROUND
            })
            .count();
        assert!(bounces > 1);
    }

    #[test]
    fn empty_roster_reports_nothing() {
        let mut scheduler = MovementScheduler::new();
        assert_eq!(scheduler.step(&mut Roster::new()), MoveStep::Empty);
        assert_eq!(scheduler.cursor(), 0);
    }

    #[test]
    fn only_cursor_creature_moves() {
        let mut roster = roster_with(&[(10, 20), (50, 40)]);
        let mut scheduler = MovementScheduler::new();

        let step = scheduler.step(&mut roster);
        assert!(matches!(step, MoveStep::Moved(_)));
        assert_eq!(roster.get(0).map(|c| c.x), Some(11));
        assert_eq!(roster.get(1).map(|c| c.x), Some(50));
    }

    #[test]
    fn travelling_creature_loses_theft_eligibility() {
        let mut roster = roster_with(&[(10, 20)]);
        let mut scheduler = MovementScheduler::new();
        scheduler.step(&mut roster);
        assert_eq!(roster.get(0).map(|c| c.can_theft), Some(false));
    }

    #[test]
    fn full_sweep_settles_everyone_then_wraps() {
        let mut roster = roster_with(&[(10, 13), (50, 48)]);
        let mut scheduler = MovementScheduler::new();

        let mut steps = Vec::new();
        loop {
            let step = scheduler.step(&mut roster);
            steps.push(step);
            if step.completes_sweep() {
                break;
            }
            assert!(steps.len() < 50, "sweep never completed");
        }

        assert!(roster.iter().all(|c| c.x == c.target && !c.can_move));
        // 3 steps + 1 advance for the first, 2 steps + 1 wrap for the second.
        assert_eq!(steps.len(), 7);
    }

    #[test]
    fn fast_creature_does_not_overshoot() {
        let mut c = Creature::new(CreatureId(1), CreatureRole::Normal, 10, 0).with_velocity(7, 0);
        c.target = 12;
        step_toward_target(&mut c);
        assert_eq!(c.x, 12);
    }

    #[test]
    fn cursor_is_clamped_after_shrink() {
        let mut roster = roster_with(&[(0, 0), (10, 10), (20, 20)]);
        let mut scheduler = MovementScheduler::new();
        scheduler.step(&mut roster);
        scheduler.step(&mut roster);
        assert_eq!(scheduler.cursor(), 2);

        let last = roster.get(2).map(|c| c.id).unwrap_or(CreatureId(0));
        roster.remove(last);
        scheduler.clamp(roster.len());
        assert_eq!(scheduler.cursor(), 0);
    }
}
