//! End-to-end session scenarios: starting, clustering and deciding a game.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use saltitantes_core::collaborators::{MemoryStatsStore, ScoreKeeper, Scoreboard};
use saltitantes_core::config::SimulationConfig;
use saltitantes_core::session::Session;
use saltitantes_types::{CreatureId, SessionPhase, ShapeKind, SimulationOutcome};

fn seeded_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.simulation.seed = Some(8);
    config
}

fn move_to(session: &mut Session, id: CreatureId, x: i32) {
    let creature = session.creature_mut(id).unwrap();
    creature.x = x;
    creature.target = x;
}

fn started_session() -> Session {
    let mut session = Session::in_memory(seeded_config(), "player");
    session.add_creature(100).unwrap();
    session.add_creature(400).unwrap();
    assert!(session.init_simulation(600));
    session
}

#[test]
fn add_creature_then_start_simulation() {
    let mut session = Session::in_memory(seeded_config(), "player");

    session.add_creature(100).unwrap();
    assert_eq!(session.roster().len(), 1);
    assert!(!session.roster().last().unwrap().is_guardian());

    assert!(session.init_simulation(200));
    assert_eq!(session.roster().len(), 2);
    assert!(session.roster().last().unwrap().is_guardian());
    assert!(session.is_running());
}

#[test]
fn co_located_pair_merges_into_one_cluster() {
    let mut session = Session::in_memory(seeded_config(), "player");
    let a = session.add_creature(0).unwrap();
    let b = session.add_creature(0).unwrap();
    move_to(&mut session, a, 150);
    move_to(&mut session, b, 150);
    let expected = session.roster().find(a).unwrap().gold + session.roster().find(b).unwrap().gold;
    assert!(session.init_simulation(600));

    let merged = session.check_clusters();

    assert_eq!(merged.len(), 1);
    assert_eq!(session.roster().len(), 2);
    let cluster = session.roster().active().first().unwrap();
    assert!(cluster.is_cluster());
    assert_eq!(cluster.gold, expected);
    assert!(session.roster().last().unwrap().is_guardian());
}

#[test]
fn score_at_threshold_wins() {
    let mut session = started_session();
    session.score_mut().set_points(600.0);

    assert_eq!(session.stop_simulation(), Some(SimulationOutcome::Win));
    assert_eq!(session.points(), 0.0);
}

#[test]
fn score_below_threshold_loses() {
    let mut session = started_session();
    session.score_mut().set_points(400.0);

    assert_eq!(session.stop_simulation(), Some(SimulationOutcome::Loss));
    assert_eq!(session.points(), 0.0);
}

#[test]
fn stop_persists_counters() {
    let store = MemoryStatsStore::new();
    let mut session = Session::new(
        seeded_config(),
        Box::new(Scoreboard::new("ana")),
        Box::new(store.clone()),
    );
    session.add_creature(10).unwrap();
    session.add_creature(500).unwrap();
    assert!(session.init_simulation(300));
    session.score_mut().add_points(500.0);
    session.stop_simulation();

    let saved = store.saved();
    assert_eq!(saved.len(), 2, "one save at start, one at stop");
    let last = saved.last().unwrap();
    assert_eq!(last.player, "ana");
    assert_eq!(last.simulations, 1);
    assert_eq!(last.successful_simulations, 1);
    assert_eq!(last.points, 0.0);
    assert_eq!(last.points_history, vec![500.0]);
    assert_eq!(last.last_session, Some(session.id()));
}

#[test]
fn sweep_merges_and_guardian_absorbs() {
    let mut session = Session::in_memory(seeded_config(), "player");
    let a = session.add_creature(0).unwrap();
    let b = session.add_creature(0).unwrap();
    let c = session.add_creature(0).unwrap();
    move_to(&mut session, a, 300);
    move_to(&mut session, b, 310);
    move_to(&mut session, c, 650);
    assert!(session.init_simulation(0));

    // Four roster slots, all settled: the fourth tick wraps the cursor.
    let mut sweep = None;
    for _ in 0..4 {
        sweep = session.physics_tick().unwrap().sweep;
    }
    let sweep = sweep.unwrap();
    assert_eq!(sweep.clusters.len(), 1);
    assert_eq!(session.points(), 40.0);

    // Walk the guardian onto the cluster and absorb it directly.
    let cluster_x = session
        .roster()
        .active()
        .iter()
        .find(|c| c.is_cluster())
        .unwrap()
        .x;
    let guardian = session.roster().guardian().unwrap().id;
    session.creature_mut(guardian).unwrap().x = cluster_x;
    let absorption = session.absorb_clusters();

    assert_eq!(absorption.count(), 1);
    assert_eq!(absorption.gold, 2_000_000.0);
    assert_eq!(session.points(), 90.0);
    assert_eq!(session.roster().len(), 2);
    assert_eq!(
        session.check_end_condition(),
        Some(SimulationOutcome::Loss)
    );
    assert_eq!(session.phase(), SessionPhase::Stopped);
}

#[test]
fn theft_reenabled_after_sweep() {
    let mut session = started_session();
    let ids: Vec<CreatureId> = session.roster().active().iter().map(|c| c.id).collect();
    for id in ids {
        session.creature_mut(id).unwrap().can_theft = false;
    }
    let len = session.roster().len();
    for _ in 0..len {
        session.physics_tick();
    }
    assert!(session.roster().active().iter().all(|c| c.can_theft));
    assert!(!session.roster().guardian().unwrap().can_theft);
}

#[test]
fn guardian_is_a_triangle_in_frames() {
    let session = started_session();
    let frame = session.frame();
    let shapes: Vec<_> = frame.items.iter().map(|i| i.shape).collect();
    assert_eq!(
        shapes,
        vec![
            ShapeKind::Circle,
            ShapeKind::Circle,
            ShapeKind::Triangle
        ]
    );
    assert!(frame.items.iter().all(|i| i.label.starts_with("R$ ")));
}
