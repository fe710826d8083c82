//! Drives a [`Session`] with two periodic tasks.
//!
//! [`SessionController`] owns the session behind a single
//! [`tokio::sync::Mutex`]. Starting a simulation spawns:
//!
//! - a **physics task** ticking every `physics.tick_interval_ms`: gravity,
//!   one round-robin step, sweep handling, then the end-condition check and
//!   a frame for the [`RenderSurface`];
//! - a **logic task** ticking every `economy.logic_tick_interval_ms`: the
//!   theft pass followed by the same end-condition check.
//!
//! Each tick holds the session lock for the whole operation, and so does
//! every command, so no actor ever observes a half-applied mutation.

use std::sync::Arc;

use saltitantes_types::{CreatureId, SimulationOutcome};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::collaborators::RenderSurface;
use crate::operator::{RunControl, RunSummary, StopReason};
use crate::session::{Session, SessionStatus};

/// Session handle shared by the tick tasks and the command surface.
pub type SharedSession = Arc<Mutex<Session>>;

/// Render surface shared with the physics task.
pub type SharedSurface = Arc<Mutex<Box<dyn RenderSurface>>>;

/// Owns a session and the tasks that tick it.
pub struct SessionController {
    session: SharedSession,
    control: Arc<RunControl>,
    surface: SharedSurface,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionController {
    /// Wrap an idle session. Tick intervals come from its configuration.
    pub fn new(session: Session, surface: Box<dyn RenderSurface>) -> Self {
        let control = Arc::new(RunControl::new(session.config()));
        Self {
            session: Arc::new(Mutex::new(session)),
            control,
            surface: Arc::new(Mutex::new(surface)),
            tasks: Vec::new(),
        }
    }

    /// Shared handle to the session.
    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// Shared run control.
    pub fn control(&self) -> Arc<RunControl> {
        Arc::clone(&self.control)
    }

    /// Add a creature; see [`Session::add_creature`].
    pub async fn add_creature(&self, x: i32) -> Option<CreatureId> {
        self.session.lock().await.add_creature(x)
    }

    /// Remove a creature; see [`Session::remove_creature`].
    pub async fn remove_creature(&self, id: CreatureId) -> bool {
        self.session.lock().await.remove_creature(id)
    }

    /// Current status.
    pub async fn status(&self) -> SessionStatus {
        self.session.lock().await.status()
    }

    /// Start the simulation with the guardian at `x` and spawn the tick
    /// tasks. Fails if the session is not idle.
    pub async fn start(&mut self, x: i32) -> bool {
        if !self.session.lock().await.init_simulation(x) {
            return false;
        }
        self.reap_tasks().await;
        self.control.mark_running().await;

        self.tasks.push(tokio::spawn(physics_loop(
            self.session(),
            self.control(),
            Arc::clone(&self.surface),
        )));
        self.tasks
            .push(tokio::spawn(logic_loop(self.session(), self.control())));

        info!(
            physics_interval_ms = self.control.physics_interval().as_millis(),
            logic_interval_ms = self.control.logic_interval().as_millis(),
            "Tick tasks started"
        );
        true
    }

    /// Stop the simulation and halt both tasks.
    ///
    /// Returns the outcome, or `None` if the session was not running.
    pub async fn stop(&mut self) -> Option<SimulationOutcome> {
        let (outcome, ticks) = {
            let mut session = self.session.lock().await;
            let outcome = session.stop_simulation();
            (outcome, session.tick())
        };
        let summary = RunSummary {
            reason: StopReason::Command,
            outcome,
            ticks,
        };
        if outcome.is_some() && self.control.finish(summary).await {
            log_run_end(&summary);
        }
        self.reap_tasks().await;
        outcome
    }

    /// Return a stopped session to Idle.
    pub async fn reset(&mut self) -> bool {
        self.reap_tasks().await;
        self.session.lock().await.reset()
    }

    /// Wait until the running simulation ends, by command or by end
    /// condition.
    pub async fn wait_until_stopped(&self) -> Option<RunSummary> {
        self.control.wait_until_stopped().await
    }

    /// Stop if running, then wait for both tasks to exit.
    pub async fn shutdown(&mut self) -> Option<SimulationOutcome> {
        let outcome = self.stop().await;
        info!("Controller shut down");
        outcome
    }

    async fn reap_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Tick task failed");
                }
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Classify an automatic stop.
fn auto_reason(session: &Session) -> StopReason {
    let max = session.config().simulation.max_iterations;
    if max > 0 && session.tick() >= max {
        StopReason::IterationCap
    } else {
        StopReason::Decided
    }
}

/// Check the end condition and, if it fired, finish the run.
///
/// Returns `true` when the run is over.
async fn settle_end(session: &mut Session, control: &RunControl) -> bool {
    if !session.is_running() {
        return true;
    }
    let Some(outcome) = session.check_end_condition() else {
        return false;
    };
    let summary = RunSummary {
        reason: auto_reason(session),
        outcome: Some(outcome),
        ticks: session.tick(),
    };
    if control.finish(summary).await {
        log_run_end(&summary);
    }
    true
}

/// Periodic timer whose first tick is one full period away.
fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.reset();
    interval
}

async fn physics_loop(session: SharedSession, control: Arc<RunControl>, surface: SharedSurface) {
    let mut interval = ticker(control.physics_interval());
    while control.is_running() {
        interval.tick().await;
        let (frame, done) = {
            let mut session = session.lock().await;
            if session.physics_tick().is_none() {
                debug!("Physics tick on empty roster");
            }
            let done = settle_end(&mut session, &control).await;
            (session.frame(), done)
        };
        surface.lock().await.render(&frame);
        if done {
            break;
        }
    }
    debug!("Physics task exiting");
}

async fn logic_loop(session: SharedSession, control: Arc<RunControl>) {
    let mut interval = ticker(control.logic_interval());
    while control.is_running() {
        interval.tick().await;
        let mut session = session.lock().await;
        if let Some(summary) = session.logic_tick() {
            debug!(
                eligible = summary.eligible,
                thefts = summary.thefts.len(),
                points = session.points(),
                "Logic tick"
            );
        }
        if settle_end(&mut session, &control).await {
            break;
        }
    }
    debug!("Logic task exiting");
}

/// Log how a run ended.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        reason = ?summary.reason,
        outcome = ?summary.outcome,
        ticks = summary.ticks,
        "Simulation ended"
    );
    if summary.outcome.is_none() {
        warn!("Simulation ended without an outcome");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use saltitantes_types::{Creature, Frame, SessionPhase};

    use super::*;
    use crate::collaborators::NullSurface;
    use crate::config::SimulationConfig;

    struct CountingSurface(Arc<AtomicUsize>);

    impl RenderSurface for CountingSurface {
        fn render(&mut self, _frame: &Frame) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn config(max_iterations: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.simulation.seed = Some(2024);
        config.simulation.max_iterations = max_iterations;
        config
    }

    /// Creatures spread 200px apart so nothing merges before the first theft.
    async fn spread(controller: &SessionController, creatures: usize) {
        for x in [0, 200, 400, 600].into_iter().take(creatures) {
            let id = controller.add_creature(x).await.unwrap();
            let session = controller.session();
            let mut session = session.lock().await;
            let creature = session.creature_mut(id).unwrap();
            creature.x = x;
            creature.target = x;
        }
    }

    async fn controller_with(creatures: usize, max_iterations: u64) -> SessionController {
        let session = Session::in_memory(config(max_iterations), "tester");
        let controller = SessionController::new(session, Box::new(NullSurface));
        spread(&controller, creatures).await;
        controller
    }

    #[tokio::test(start_paused = true)]
    async fn run_ends_by_itself() {
        let mut controller = controller_with(4, 2_000).await;
        assert!(controller.start(300).await);

        let summary = controller.wait_until_stopped().await.unwrap();
        assert!(matches!(
            summary.reason,
            StopReason::Decided | StopReason::IterationCap
        ));
        assert!(summary.outcome.is_some());
        assert!(summary.ticks <= 2_000);
        assert_eq!(controller.status().await.phase, SessionPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_command_halts_ticks() {
        let mut controller = controller_with(4, 0).await;
        assert!(controller.start(300).await);
        tokio::time::sleep(Duration::from_millis(105)).await;

        let outcome = controller.stop().await;
        assert!(outcome.is_some());
        let status = controller.status().await;
        assert_eq!(status.phase, SessionPhase::Stopped);

        let frozen = status.tick;
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(controller.status().await.tick, frozen);
        assert_eq!(
            controller.control().summary().await.map(|s| s.reason),
            Some(StopReason::Command)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cannot_start_twice() {
        let mut controller = controller_with(3, 0).await;
        assert!(controller.start(300).await);
        assert!(!controller.start(400).await);
        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_start_is_none() {
        let mut controller = controller_with(2, 0).await;
        assert_eq!(controller.stop().await, None);
        assert_eq!(controller.status().await.phase, SessionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn lone_guardian_ends_immediately() {
        let mut controller = controller_with(0, 0).await;
        assert!(controller.start(300).await);
        let summary = controller.wait_until_stopped().await.unwrap();
        assert_eq!(summary.reason, StopReason::Decided);
        assert_eq!(summary.ticks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn frames_reach_the_surface() {
        let frames = Arc::new(AtomicUsize::new(0));
        let session = Session::in_memory(config(0), "tester");
        let mut controller =
            SessionController::new(session, Box::new(CountingSurface(Arc::clone(&frames))));
        spread(&controller, 3).await;

        assert!(controller.start(300).await);
        tokio::time::sleep(Duration::from_millis(55)).await;
        controller.stop().await;

        assert!(frames.load(Ordering::Relaxed) >= 5);
    }

    /// Guardian last, exactly one guardian, and gold equal to what was added
    /// minus what was removed.
    async fn assert_consistent(controller: &SessionController, expected_gold: f64) {
        let session = controller.session();
        let session = session.lock().await;
        let roster = session.roster();
        assert_eq!(roster.iter().filter(|c| c.is_guardian()).count(), 1);
        assert!(roster.last().is_some_and(Creature::is_guardian));
        let total: f64 = roster.iter().map(|c| c.gold).sum();
        assert!(
            (total - expected_gold).abs() <= expected_gold * 1e-9,
            "gold drifted: {total} != {expected_gold}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn commands_interleave_with_running_ticks() {
        let starting_gold = config(0).economy.starting_gold;
        let mut controller = controller_with(4, 0).await;
        let mut expected = 4.0 * starting_gold;
        assert!(controller.start(300).await);

        for round in 0..40_i32 {
            tokio::time::sleep(Duration::from_millis(400)).await;

            let x = round.wrapping_mul(97).checked_rem(670).unwrap_or(0);
            if controller.add_creature(x).await.is_none() {
                assert_eq!(controller.status().await.phase, SessionPhase::Stopped);
                break;
            }
            expected += starting_gold;
            assert_consistent(&controller, expected).await;

            if round.checked_rem(2) == Some(1) {
                let victim = {
                    let session = controller.session();
                    let session = session.lock().await;
                    session.roster().active().first().map(|c| (c.id, c.gold))
                };
                if let Some((id, gold)) = victim {
                    if controller.remove_creature(id).await {
                        expected -= gold;
                    }
                }
                assert_consistent(&controller, expected).await;
            }
        }

        assert!(controller.status().await.tick > 0);
        controller.shutdown().await;
        assert_consistent(&controller, expected).await;
    }

    #[tokio::test(start_paused = true)]
    async fn reset_allows_another_game() {
        let mut controller = controller_with(3, 0).await;
        assert!(controller.start(300).await);
        controller.stop().await;
        assert!(controller.reset().await);
        spread(&controller, 2).await;
        assert!(controller.start(100).await);
        assert_eq!(controller.status().await.simulations, 2);
        controller.shutdown().await;
    }
}
