//! Theft: a creature takes half the gold of its nearest neighbor.

use saltitantes_types::CreatureId;
use tracing::debug;

use crate::planner::TargetPlanner;
use crate::roster::Roster;

/// Why a theft attempt did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TheftRejection {
    /// The thief is not in the roster.
    UnknownThief,
    /// The guardian never steals.
    GuardianThief,
    /// The roster holds one creature or fewer.
    TooFewCreatures,
    /// Some non-guardian creature is still travelling.
    CreatureInMotion,
    /// No other non-guardian creature exists.
    NoVictim,
}

/// Result of a theft attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TheftOutcome {
    /// Gold changed hands.
    Stolen {
        /// The creature that stole.
        thief: CreatureId,
        /// The nearest neighbor that lost half its gold.
        victim: CreatureId,
        /// Gold transferred.
        amount: f64,
    },
    /// Nothing happened.
    Rejected(TheftRejection),
}

impl TheftOutcome {
    /// Whether gold changed hands.
    pub const fn is_stolen(&self) -> bool {
        matches!(self, Self::Stolen { .. })
    }
}

/// Nearest other non-guardian creature by horizontal distance.
///
/// Ties go to the creature earliest in roster order.
pub fn nearest_victim(roster: &Roster, thief: CreatureId) -> Option<CreatureId> {
    let thief = roster.find(thief)?;
    roster
        .active()
        .iter()
        .filter(|c| c.id != thief.id)
        .min_by_key(|c| thief.distance_to(c))
        .map(|c| c.id)
}

/// Let `thief` steal half of its nearest neighbor's gold.
///
/// On success both creatures get a fresh target and the thief starts
/// travelling. Eligibility (`can_theft`) is the caller's concern.
pub fn attempt_theft(
    roster: &mut Roster,
    planner: &mut TargetPlanner,
    thief: CreatureId,
) -> TheftOutcome {
    let Some(thief_creature) = roster.find(thief) else {
        return TheftOutcome::Rejected(TheftRejection::UnknownThief);
    };
    if thief_creature.is_guardian() {
        return TheftOutcome::Rejected(TheftRejection::GuardianThief);
    }
    if roster.len() <= 1 {
        return TheftOutcome::Rejected(TheftRejection::TooFewCreatures);
    }
    if roster.any_moving() {
        return TheftOutcome::Rejected(TheftRejection::CreatureInMotion);
    }
    let Some(victim) = nearest_victim(roster, thief) else {
        return TheftOutcome::Rejected(TheftRejection::NoVictim);
    };

    let mut amount = 0.0;
    if let Some(v) = roster.find_mut(victim) {
        amount = v.gold / 2.0;
        v.gold = amount;
        v.target = planner.calc_next_position(v);
    }
    if let Some(t) = roster.find_mut(thief) {
        t.gold += amount;
        t.target = planner.calc_next_position(t);
        t.can_move = true;
    }

    debug!(%thief, %victim, amount, "Theft");
    TheftOutcome::Stolen {
        thief,
        victim,
        amount,
    }
}
