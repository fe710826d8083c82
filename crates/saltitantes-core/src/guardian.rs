//! Guardian spawn and cluster absorption.

use saltitantes_types::{Creature, CreatureId, CreatureRole};
use tracing::info;

use crate::config::SimulationConfig;
use crate::planner::TargetPlanner;
use crate::roster::Roster;

/// Clusters swallowed by one absorption pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Absorption {
    /// Ids of the absorbed clusters.
    pub absorbed: Vec<CreatureId>,
    /// Gold the guardian gained.
    pub gold: f64,
}

impl Absorption {
    /// Number of clusters absorbed.
    pub fn count(&self) -> usize {
        self.absorbed.len()
    }

    /// Whether the pass absorbed nothing.
    pub fn is_empty(&self) -> bool {
        self.absorbed.is_empty()
    }
}

/// Spawn the guardian at `x` (clamped onto the panel) on the ground line.
///
/// Returns `None` when the roster already has one.
pub fn spawn_guardian(
    roster: &mut Roster,
    planner: &mut TargetPlanner,
    config: &SimulationConfig,
    x: i32,
) -> Option<CreatureId> {
    if roster.has_guardian() {
        return None;
    }
    let x = x.clamp(0, planner.max_x());
    let id = roster.allocate_id();
    let guardian = Creature::new(id, CreatureRole::Guardian, x, config.panel.ground_y())
        .with_velocity(config.physics.horizontal_speed, planner.guardian_bounce());
    roster.push(guardian).then_some(id)
}

/// Absorb every cluster within `fuse_distance` of the guardian.
///
/// Absorbed clusters are removed and their gold moves to the guardian,
/// which then gets a fresh target. No guardian or no cluster in range is a
/// no-op and yields an empty [`Absorption`].
pub fn absorb_clusters(
    roster: &mut Roster,
    planner: &mut TargetPlanner,
    fuse_distance: u32,
) -> Absorption {
    let Some(guardian) = roster.guardian() else {
        return Absorption::default();
    };
    let in_range: Vec<(CreatureId, f64)> = roster
        .active()
        .iter()
        .filter(|c| c.is_cluster() && c.distance_to(guardian) <= fuse_distance)
        .map(|c| (c.id, c.gold))
        .collect();
    if in_range.is_empty() {
        return Absorption::default();
    }

    let mut absorption = Absorption::default();
    for (id, gold) in in_range {
        if roster.remove(id).is_some() {
            absorption.absorbed.push(id);
            absorption.gold += gold;
        }
    }

    if let Some(guardian) = roster.guardian_mut() {
        guardian.gold += absorption.gold;
        guardian.target = planner.calc_next_position(guardian);
        guardian.can_move = true;
        guardian.can_theft = false;
        info!(
            guardian = %guardian.id,
            clusters = absorption.count(),
            gold = absorption.gold,
            "Guardian absorbed clusters"
        );
    }
    absorption
}
