//! Run control state shared between the tick tasks and the command surface.
//!
//! The physics and logic tasks poll [`RunControl::is_running`] on every
//! tick without taking a lock. Whoever ends the run (an end condition inside
//! a tick, or a `stop` command) calls [`RunControl::finish`], which records
//! the [`RunSummary`] and wakes everyone waiting in
//! [`RunControl::wait_until_stopped`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use saltitantes_types::SimulationOutcome;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::SimulationConfig;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// At most one creature besides the guardian was left.
    Decided,
    /// The tick counter reached `max_iterations`.
    IterationCap,
    /// A `stop` command arrived.
    Command,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Why the run ended.
    pub reason: StopReason,
    /// Win or loss, if the session actually stopped.
    pub outcome: Option<SimulationOutcome>,
    /// Physics ticks executed.
    pub ticks: u64,
}

/// Shared control state for one run.
#[derive(Debug)]
pub struct RunControl {
    /// Whether the tick tasks should keep working.
    running: AtomicBool,

    /// Wakes [`wait_until_stopped`](Self::wait_until_stopped) callers.
    stopped_notify: Notify,

    /// Real-time spacing of physics ticks.
    physics_interval: Duration,

    /// Real-time spacing of logic ticks.
    logic_interval: Duration,

    /// Set once the run has ended.
    summary: Mutex<Option<RunSummary>>,
}

impl RunControl {
    /// Create control state with the tick intervals from configuration.
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_intervals(
            Duration::from_millis(config.physics.tick_interval_ms),
            Duration::from_millis(config.economy.logic_tick_interval_ms),
        )
    }

    /// Create control state with explicit tick intervals.
    pub fn with_intervals(physics_interval: Duration, logic_interval: Duration) -> Self {
        Self {
            running: AtomicBool::new(false),
            stopped_notify: Notify::new(),
            physics_interval,
            logic_interval,
            summary: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Run state
    // -----------------------------------------------------------------------

    /// Whether the tick tasks should keep working.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Begin a run, clearing any previous summary.
    pub async fn mark_running(&self) {
        *self.summary.lock().await = None;
        self.running.store(true, Ordering::Release);
    }

    /// End the run. Only the first call records its summary.
    ///
    /// Returns `true` if this call ended the run.
    pub async fn finish(&self, summary: RunSummary) -> bool {
        let mut guard = self.summary.lock().await;
        if !self.running.swap(false, Ordering::AcqRel) {
            return false;
        }
        *guard = Some(summary);
        drop(guard);
        self.stopped_notify.notify_waiters();
        true
    }

    /// Wait until the current run ends and return how it ended.
    ///
    /// Returns immediately when no run is active.
    pub async fn wait_until_stopped(&self) -> Option<RunSummary> {
        loop {
            let notified = self.stopped_notify.notified();
            if !self.is_running() {
                return *self.summary.lock().await;
            }
            notified.await;
        }
    }

    /// How the last run ended, if it has.
    pub async fn summary(&self) -> Option<RunSummary> {
        *self.summary.lock().await
    }

    // -----------------------------------------------------------------------
    // Timing
    // -----------------------------------------------------------------------

    /// Spacing of physics ticks.
    pub const fn physics_interval(&self) -> Duration {
        self.physics_interval
    }

    /// Spacing of logic ticks.
    pub const fn logic_interval(&self) -> Duration {
        self.logic_interval
    }
}
