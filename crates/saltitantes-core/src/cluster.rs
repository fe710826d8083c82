//! Clustering: merging co-located creatures into one.
//!
//! Grouping is single-pass and seed-relative: a creature joins the group of
//! the first unprocessed seed within `fuse_distance` of it, even if it would
//! also be close to a later seed. Chains are therefore not merged
//! transitively in one pass.

use std::collections::VecDeque;

use saltitantes_types::{Creature, CreatureId, CreatureRole};
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::planner::TargetPlanner;
use crate::roster::Roster;

/// Partition non-guardian creatures into groups of co-located members.
///
/// Only groups with two or more members are returned. Member order follows
/// roster order, so the first id is the group's anchor.
pub fn find_groups(creatures: &[Creature], fuse_distance: u32) -> Vec<Vec<CreatureId>> {
    let mut pending: VecDeque<&Creature> = creatures.iter().filter(|c| !c.is_guardian()).collect();
    let mut groups = Vec::new();

    while let Some(seed) = pending.pop_front() {
        let mut group = vec![seed.id];
        pending.retain(|c| {
            if seed.distance_to(c) <= fuse_distance {
                group.push(c.id);
                false
            } else {
                true
            }
        });
        if group.len() > 1 {
            groups.push(group);
        }
    }

    groups
}

/// Merge the given creatures into a single cluster.
///
/// The cluster appears at the first member's position with the summed gold
/// of every member, a fresh target and `can_move` set. Members are removed.
/// Fails without touching the roster when no guardian exists or fewer than
/// two of the ids are present.
pub fn create_cluster(
    roster: &mut Roster,
    planner: &mut TargetPlanner,
    config: &SimulationConfig,
    members: &[CreatureId],
) -> Option<CreatureId> {
    if !roster.has_guardian() {
        warn!(members = members.len(), "Cluster rejected: no guardian");
        return None;
    }
    let present: Vec<&Creature> = members
        .iter()
        .filter_map(|id| roster.find(*id))
        .filter(|c| !c.is_guardian())
        .collect();
    if present.len() < 2 {
        return None;
    }

    let x = present.first()?.x;
    let gold: f64 = present.iter().map(|c| c.gold).sum();
    let member_ids: Vec<CreatureId> = present.iter().map(|c| c.id).collect();

    for id in &member_ids {
        roster.remove(*id);
    }

    let id = roster.allocate_id();
    let mut cluster = Creature::new(id, CreatureRole::Cluster, x, config.panel.ground_y())
        .with_gold(gold)
        .with_velocity(config.physics.horizontal_speed, 0);
    cluster.target = planner.calc_next_position(&cluster);
    cluster.can_move = true;
    roster.push(cluster);

    info!(cluster = %id, members = member_ids.len(), gold, "Cluster formed");
    Some(id)
}

/// Find every co-located group and merge each into a cluster.
///
/// Groups are computed on a snapshot taken before any merge. Returns the
/// merged clusters paired with their member counts.
pub fn check_clusters(
    roster: &mut Roster,
    planner: &mut TargetPlanner,
    config: &SimulationConfig,
) -> Vec<(CreatureId, usize)> {
    let snapshot = roster.snapshot();
    find_groups(&snapshot, config.physics.fuse_distance)
        .into_iter()
        .filter_map(|group| {
            create_cluster(roster, planner, config, &group).map(|id| (id, group.len()))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn creature(id: u64, x: i32) -> Creature {
        Creature::new(CreatureId(id), CreatureRole::Normal, x, 0)
    }

    fn spawn(roster: &mut Roster, role: CreatureRole, x: i32, gold: f64) -> CreatureId {
        let id = roster.allocate_id();
        roster.push(Creature::new(id, role, x, 0).with_gold(gold));
        id
    }

    #[test]
    fn groups_by_seed_distance() {
        let creatures = [creature(1, 0), creature(2, 40), creature(3, 200), creature(4, 250)];
        let groups = find_groups(&creatures, 50);
        assert_eq!(
            groups,
            vec![
                vec![CreatureId(1), CreatureId(2)],
                vec![CreatureId(3), CreatureId(4)]
            ]
        );
    }

    #[test]
    fn grouping_is_not_transitive() {
        // 2 is close to 1 and 3, but 3 is too far from seed 1.
        let creatures = [creature(1, 0), creature(2, 50), creature(3, 100)];
        let groups = find_groups(&creatures, 50);
        assert_eq!(groups, vec![vec![CreatureId(1), CreatureId(2)]]);
    }

    #[test]
    fn lone_creatures_form_no_group() {
        let creatures = [creature(1, 0), creature(2, 300)];
        assert!(find_groups(&creatures, 50).is_empty());
    }

    #[test]
    fn cluster_sums_member_gold() {
        let config = SimulationConfig::default();
        let mut planner = TargetPlanner::from_config(&config);
        let mut roster = Roster::new();
        let a = spawn(&mut roster, CreatureRole::Normal, 100, 300.0);
        let b = spawn(&mut roster, CreatureRole::Normal, 110, 200.0);
        spawn(&mut roster, CreatureRole::Guardian, 600, 0.0);

        let id = create_cluster(&mut roster, &mut planner, &config, &[a, b]);

        let cluster = id.and_then(|id| roster.find(id));
        assert_eq!(cluster.map(|c| c.gold), Some(500.0));
        assert_eq!(cluster.map(|c| c.x), Some(100));
        assert_eq!(cluster.map(Creature::is_cluster), Some(true));
        assert_eq!(roster.len(), 2);
        assert!(roster.last().is_some_and(Creature::is_guardian));
    }

    #[test]
    fn cluster_requires_guardian() {
        let config = SimulationConfig::default();
        let mut planner = TargetPlanner::from_config(&config);
        let mut roster = Roster::new();
        let a = spawn(&mut roster, CreatureRole::Normal, 100, 1.0);
        let b = spawn(&mut roster, CreatureRole::Normal, 100, 1.0);

        assert!(create_cluster(&mut roster, &mut planner, &config, &[a, b]).is_none());
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn cluster_needs_two_members() {
        let config = SimulationConfig::default();
        let mut planner = TargetPlanner::from_config(&config);
        let mut roster = Roster::new();
        let a = spawn(&mut roster, CreatureRole::Normal, 100, 1.0);
        spawn(&mut roster, CreatureRole::Guardian, 100, 0.0);

        assert!(create_cluster(&mut roster, &mut planner, &config, &[]).is_none());
        assert!(create_cluster(&mut roster, &mut planner, &config, &[a]).is_none());
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn check_merges_every_group() {
        let config = SimulationConfig::default();
        let mut planner = TargetPlanner::from_config(&config);
        let mut roster = Roster::new();
        spawn(&mut roster, CreatureRole::Normal, 0, 1.0);
        spawn(&mut roster, CreatureRole::Normal, 10, 2.0);
        spawn(&mut roster, CreatureRole::Normal, 400, 3.0);
        spawn(&mut roster, CreatureRole::Normal, 420, 4.0);
        spawn(&mut roster, CreatureRole::Guardian, 670, 0.0);

        let merged = check_clusters(&mut roster, &mut planner, &config);

        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|&(_, members)| members == 2));
        assert_eq!(roster.len(), 3);
        let total: f64 = roster.active().iter().map(|c| c.gold).sum();
        assert_eq!(total, 10.0);
    }
}
