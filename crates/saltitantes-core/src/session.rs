//! A simulation session: roster, lifecycle and end-condition evaluation.
//!
//! The session is the single owner of every piece of mutable simulation
//! state. It is not synchronized itself; the runner wraps it in one mutex so
//! the physics tick, the logic tick and external commands never interleave
//! inside an operation.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --init_simulation--> Running --stop_simulation--> Stopped --reset--> Idle
//! ```
//!
//! Every operation that would break an invariant (removing the guardian,
//! starting twice, stopping before starting) reports failure through its
//! return value and leaves the session untouched.

use saltitantes_types::{
    Creature, CreatureId, CreatureRole, Frame, SessionId, SessionPhase, SessionStats,
    SimulationOutcome,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cluster;
use crate::collaborators::{MemoryStatsStore, ScoreKeeper, Scoreboard, StatsStore};
use crate::config::SimulationConfig;
use crate::guardian::{self, Absorption};
use crate::physics::{self, MoveStep, MovementScheduler};
use crate::planner::TargetPlanner;
use crate::roster::Roster;
use crate::theft::{self, TheftOutcome};

/// What a completed sweep changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepSummary {
    /// Clusters formed, with their member counts.
    pub clusters: Vec<(CreatureId, usize)>,
    /// Clusters the guardian absorbed.
    pub absorption: Absorption,
}

/// Result of one physics tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsSummary {
    /// Session tick after this physics tick.
    pub tick: u64,
    /// The round-robin step taken, if the session is running.
    pub step: Option<MoveStep>,
    /// Present when this tick completed a sweep.
    pub sweep: Option<SweepSummary>,
}

/// Result of one logic tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogicSummary {
    /// Creatures that were theft-eligible at the start of the tick.
    pub eligible: usize,
    /// Thefts that moved gold.
    pub thefts: Vec<TheftOutcome>,
}

/// Serializable view of a session for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Session identifier.
    pub session: SessionId,
    /// Lifecycle phase.
    pub phase: SessionPhase,
    /// Physics ticks run since the simulation started.
    pub tick: u64,
    /// Creatures in the roster, guardian included.
    pub creatures: usize,
    /// Whether the guardian exists.
    pub has_guardian: bool,
    /// Current running score.
    pub points: f64,
    /// Outcome of the last stop, once stopped.
    pub outcome: Option<SimulationOutcome>,
    /// Simulations started by this player.
    pub simulations: u32,
    /// Fraction of simulations won.
    pub success_rate: f64,
}

/// One simulation session.
pub struct Session {
    id: SessionId,
    config: SimulationConfig,
    phase: SessionPhase,
    roster: Roster,
    scheduler: MovementScheduler,
    planner: TargetPlanner,
    tick: u64,
    outcome: Option<SimulationOutcome>,
    score: Box<dyn ScoreKeeper>,
    store: Box<dyn StatsStore>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("roster", &self.roster)
            .field("tick", &self.tick)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an idle session with an empty roster.
    pub fn new(
        config: SimulationConfig,
        score: Box<dyn ScoreKeeper>,
        store: Box<dyn StatsStore>,
    ) -> Self {
        let planner = TargetPlanner::from_config(&config);
        Self {
            id: SessionId::new(),
            config,
            phase: SessionPhase::Idle,
            roster: Roster::new(),
            scheduler: MovementScheduler::new(),
            planner,
            tick: 0,
            outcome: None,
            score,
            store,
        }
    }

    /// Idle session with a fresh [`Scoreboard`] and a [`MemoryStatsStore`].
    pub fn in_memory(config: SimulationConfig, player: &str) -> Self {
        Self::new(
            config,
            Box::new(Scoreboard::new(player)),
            Box::new(MemoryStatsStore::new()),
        )
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Session identifier. Changes on [`reset`](Self::reset).
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether the periodic ticks should be doing work.
    pub const fn is_running(&self) -> bool {
        matches!(self.phase, SessionPhase::Running)
    }

    /// The roster.
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// One creature, mutably, for repositioning or adjusting its state.
    ///
    /// The roster's shape (membership, order, the guardian slot) cannot be
    /// changed through it; roles are fixed at construction.
    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.roster.find_mut(id)
    }

    /// Physics ticks run since the simulation started.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Outcome of the stop, once stopped.
    pub const fn outcome(&self) -> Option<SimulationOutcome> {
        self.outcome
    }

    /// Current running score.
    pub fn points(&self) -> f64 {
        self.score.points()
    }

    /// The score collaborator.
    pub fn score(&self) -> &dyn ScoreKeeper {
        self.score.as_ref()
    }

    /// The score collaborator, mutably.
    pub fn score_mut(&mut self) -> &mut dyn ScoreKeeper {
        self.score.as_mut()
    }

    /// Snapshot of the player's counters.
    pub fn stats(&self) -> SessionStats {
        self.score.stats()
    }

    /// Configuration the session was built with.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Whether no non-guardian creature is travelling.
    pub fn is_settled(&self) -> bool {
        !self.roster.any_moving()
    }

    /// Serializable status summary.
    pub fn status(&self) -> SessionStatus {
        let stats = self.score.stats();
        SessionStatus {
            session: self.id,
            phase: self.phase,
            tick: self.tick,
            creatures: self.roster.len(),
            has_guardian: self.roster.has_guardian(),
            points: stats.points,
            outcome: self.outcome,
            simulations: stats.simulations,
            success_rate: stats.success_rate(),
        }
    }

    /// Render projection of the roster, guardian last.
    pub fn frame(&self) -> Frame {
        let size = self.config.panel.creature_size;
        Frame {
            tick: self.tick,
            width: self.config.panel.width,
            height: self.config.panel.height,
            items: self.roster.iter().map(|c| c.render_item(size)).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Roster commands
    // -----------------------------------------------------------------------

    /// Add a normal creature requested at `x`.
    ///
    /// The creature is placed at a planned position and starts settled
    /// there. Rejected once the session has stopped.
    pub fn add_creature(&mut self, x: i32) -> Option<CreatureId> {
        if matches!(self.phase, SessionPhase::Stopped) {
            warn!(x, "Add rejected: session stopped");
            return None;
        }
        let id = self.roster.allocate_id();
        let mut creature = Creature::new(id, CreatureRole::Normal, x, self.config.panel.ground_y())
            .with_gold(self.config.economy.starting_gold)
            .with_velocity(self.config.physics.horizontal_speed, 0);
        creature.x = self.planner.calc_next_position(&creature);
        creature.target = creature.x;
        self.roster.push(creature);
        debug!(creature = %id, x, "Creature added");
        Some(id)
    }

    /// Remove a non-guardian creature.
    ///
    /// Fails for the guardian, for an unknown id, and when only one creature
    /// remains.
    pub fn remove_creature(&mut self, id: CreatureId) -> bool {
        if self.roster.len() <= 1 {
            warn!(creature = %id, "Remove rejected: last creature");
            return false;
        }
        if self.roster.guardian().is_some_and(|g| g.id == id) {
            warn!(creature = %id, "Remove rejected: guardian");
            return false;
        }
        if self.roster.remove(id).is_none() {
            warn!(creature = %id, "Remove rejected: unknown creature");
            return false;
        }
        self.scheduler.clamp(self.roster.len());
        debug!(creature = %id, "Creature removed");
        true
    }

    /// Spawn the guardian at `x`. Fails if one already exists.
    pub fn create_guardian(&mut self, x: i32) -> bool {
        match guardian::spawn_guardian(&mut self.roster, &mut self.planner, &self.config, x) {
            Some(id) => {
                info!(guardian = %id, x, "Guardian created");
                true
            }
            None => {
                warn!(x, "Guardian rejected: already present");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start the simulation, spawning the guardian at `x`.
    ///
    /// Only valid from Idle. Records one simulation attempt.
    pub fn init_simulation(&mut self, x: i32) -> bool {
        if !matches!(self.phase, SessionPhase::Idle) {
            warn!(phase = ?self.phase, "Start rejected: not idle");
            return false;
        }
        if !self.roster.has_guardian() && !self.create_guardian(x) {
            return false;
        }

        self.phase = SessionPhase::Running;
        self.scheduler.reset();
        self.tick = 0;
        self.outcome = None;
        self.score.add_simulation_attempt();
        self.persist();

        info!(
            session = %self.id,
            creatures = self.roster.len(),
            max_iterations = self.config.simulation.max_iterations,
            "Simulation started"
        );
        true
    }

    /// Stop the simulation and decide the outcome.
    ///
    /// Only valid while running; returns `None` otherwise. A score at or
    /// above the win threshold is a win. The score is reset to 0 either way.
    pub fn stop_simulation(&mut self) -> Option<SimulationOutcome> {
        if !self.is_running() {
            warn!(phase = ?self.phase, "Stop rejected: not running");
            return None;
        }

        let points = self.score.points();
        let outcome = if points >= self.config.economy.win_threshold {
            SimulationOutcome::Win
        } else {
            SimulationOutcome::Loss
        };
        if outcome.is_win() {
            self.score.add_simulation_success();
        }
        self.score.set_points(0.0);
        self.phase = SessionPhase::Stopped;
        self.outcome = Some(outcome);
        self.persist();

        info!(
            session = %self.id,
            ?outcome,
            points,
            tick = self.tick,
            creatures = self.roster.len(),
            "Simulation stopped"
        );
        Some(outcome)
    }

    /// Stop automatically once the game is decided.
    ///
    /// Fires while running when the guardian has at most one non-guardian
    /// creature left, or when the tick counter reaches `max_iterations`
    /// (0 disables the cap).
    pub fn check_end_condition(&mut self) -> Option<SimulationOutcome> {
        if !self.is_running() {
            return None;
        }
        let decided =
            self.roster.has_guardian() && self.roster.non_guardian_count() <= 1;
        let max = self.config.simulation.max_iterations;
        let exhausted = max > 0 && self.tick >= max;
        if !decided && !exhausted {
            return None;
        }
        debug!(decided, exhausted, tick = self.tick, "End condition met");
        self.stop_simulation()
    }

    /// Return a stopped session to Idle with an empty roster.
    ///
    /// The score and store collaborators are kept; a new session id is
    /// issued.
    pub fn reset(&mut self) -> bool {
        if !matches!(self.phase, SessionPhase::Stopped) {
            return false;
        }
        self.id = SessionId::new();
        self.phase = SessionPhase::Idle;
        self.roster.clear();
        self.scheduler.reset();
        self.tick = 0;
        self.outcome = None;
        info!(session = %self.id, "Session reset");
        true
    }

    // -----------------------------------------------------------------------
    // Ticks
    // -----------------------------------------------------------------------

    /// Run one physics tick.
    ///
    /// Gravity applies to every creature in every phase. While running, the
    /// tick counter advances and one round-robin movement step is taken; a
    /// completed sweep triggers clustering, absorption and re-enables theft.
    /// Returns `None` on an empty roster.
    pub fn physics_tick(&mut self) -> Option<PhysicsSummary> {
        if self.roster.is_empty() {
            return None;
        }
        physics::apply_gravity_all(
            &mut self.roster,
            &self.config.physics,
            self.config.panel.ground_y(),
        );

        if !self.is_running() {
            return Some(PhysicsSummary {
                tick: self.tick,
                step: None,
                sweep: None,
            });
        }

        self.tick = self.tick.saturating_add(1);
        let step = self.scheduler.step(&mut self.roster);
        let sweep = step.completes_sweep().then(|| self.complete_sweep());
        Some(PhysicsSummary {
            tick: self.tick,
            step: Some(step),
            sweep,
        })
    }

    /// Run one logic tick: every theft-eligible creature tries to steal.
    ///
    /// Returns `None` when not running or when the roster is empty.
    pub fn logic_tick(&mut self) -> Option<LogicSummary> {
        if !self.is_running() || self.roster.is_empty() {
            return None;
        }
        let eligible: Vec<CreatureId> = self
            .roster
            .active()
            .iter()
            .filter(|c| c.can_theft)
            .map(|c| c.id)
            .collect();

        let mut summary = LogicSummary {
            eligible: eligible.len(),
            thefts: Vec::new(),
        };
        for thief in eligible {
            let outcome = theft::attempt_theft(&mut self.roster, &mut self.planner, thief);
            if outcome.is_stolen() {
                self.score.add_points(self.config.economy.theft_points);
                summary.thefts.push(outcome);
            }
        }
        Some(summary)
    }

    /// Merge every co-located group into a cluster and credit merge points.
    pub fn check_clusters(&mut self) -> Vec<(CreatureId, usize)> {
        let merged = cluster::check_clusters(&mut self.roster, &mut self.planner, &self.config);
        for &(_, members) in &merged {
            self.credit_merge(members);
        }
        self.scheduler.clamp(self.roster.len());
        merged
    }

    /// Merge the given creatures into one cluster and credit merge points.
    pub fn create_cluster(&mut self, members: &[CreatureId]) -> Option<CreatureId> {
        let before = self.roster.len();
        let id =
            cluster::create_cluster(&mut self.roster, &mut self.planner, &self.config, members)?;
        // Members removed minus the one cluster added.
        let merged = before.saturating_sub(self.roster.len()).saturating_add(1);
        self.credit_merge(merged);
        self.scheduler.clamp(self.roster.len());
        Some(id)
    }

    /// Let the guardian absorb nearby clusters and credit absorption points.
    pub fn absorb_clusters(&mut self) -> Absorption {
        let absorption = guardian::absorb_clusters(
            &mut self.roster,
            &mut self.planner,
            self.config.physics.fuse_distance,
        );
        for _ in &absorption.absorbed {
            self.score.add_points(self.config.economy.absorption_points);
        }
        self.scheduler.clamp(self.roster.len());
        absorption
    }

    fn complete_sweep(&mut self) -> SweepSummary {
        let clusters = self.check_clusters();
        let absorption = self.absorb_clusters();
        for creature in self.roster.active_mut() {
            creature.can_theft = true;
        }
        debug!(
            tick = self.tick,
            clusters = clusters.len(),
            absorbed = absorption.count(),
            "Sweep completed"
        );
        SweepSummary {
            clusters,
            absorption,
        }
    }

    fn credit_merge(&mut self, members: usize) {
        let members = u32::try_from(members).unwrap_or(u32::MAX);
        let points = self.config.economy.merge_points_per_member * f64::from(members);
        self.score.add_points(points);
    }

    fn persist(&mut self) {
        let mut stats = self.score.stats();
        stats.last_session = Some(self.id);
        if let Err(e) = self.store.save(&stats) {
            warn!(error = %e, "Failed to persist session stats");
        }
    }
}
