//! External collaborators the simulation talks to.
//!
//! The core never renders, stores or keeps score by itself. It reports to
//! three traits instead:
//!
//! - [`ScoreKeeper`] -- accumulates points and simulation counters for the
//!   current player. [`Scoreboard`] is the in-process implementation.
//! - [`StatsStore`] -- persists [`SessionStats`] when a simulation starts
//!   and stops. [`MemoryStatsStore`] keeps them in memory for tests.
//! - [`RenderSurface`] -- receives a [`Frame`] after every physics tick.
//!   [`NullSurface`] discards it.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use saltitantes_types::{Frame, SessionStats};

/// Errors raised by a [`StatsStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("stats store I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The stored statistics could not be (de)serialized.
    #[error("stats store JSON error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
}

/// Score and attempt counters for the current player.
pub trait ScoreKeeper: Send {
    /// Credit points to the running score.
    fn add_points(&mut self, amount: f64);

    /// Current running score.
    fn points(&self) -> f64;

    /// Overwrite the running score, archiving the previous value.
    fn set_points(&mut self, value: f64);

    /// Record that a simulation was started.
    fn add_simulation_attempt(&mut self);

    /// Record that a simulation was won.
    fn add_simulation_success(&mut self);

    /// Snapshot of the counters for persistence.
    fn stats(&self) -> SessionStats;
}

/// [`ScoreKeeper`] backed by a [`SessionStats`] value.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    stats: SessionStats,
}

impl Scoreboard {
    /// Fresh counters for `player`.
    pub fn new(player: &str) -> Self {
        Self {
            stats: SessionStats::new(player),
        }
    }

    /// Continue from previously persisted counters.
    pub const fn from_stats(stats: SessionStats) -> Self {
        Self { stats }
    }

    fn touch(&mut self) {
        self.stats.updated_at = Utc::now();
    }
}

impl ScoreKeeper for Scoreboard {
    fn add_points(&mut self, amount: f64) {
        self.stats.points += amount;
        self.touch();
    }

    fn points(&self) -> f64 {
        self.stats.points
    }

    fn set_points(&mut self, value: f64) {
        self.stats.points_history.push(self.stats.points);
        self.stats.points = value;
        self.touch();
    }

    fn add_simulation_attempt(&mut self) {
        self.stats.simulations = self.stats.simulations.saturating_add(1);
        self.touch();
    }

    fn add_simulation_success(&mut self) {
        self.stats.successful_simulations = self.stats.successful_simulations.saturating_add(1);
        self.touch();
    }

    fn stats(&self) -> SessionStats {
        self.stats.clone()
    }
}

/// Persists player statistics.
pub trait StatsStore: Send {
    /// Save the given counters, replacing what was stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the counters could not be written.
    fn save(&mut self, stats: &SessionStats) -> Result<(), StoreError>;
}

/// In-memory [`StatsStore`] recording every save.
///
/// Clones share the same log, so a test can keep one handle and give the
/// other to a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStatsStore {
    saved: Arc<Mutex<Vec<SessionStats>>>,
}

impl MemoryStatsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every save so far, oldest first.
    pub fn saved(&self) -> Vec<SessionStats> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent save.
    pub fn last(&self) -> Option<SessionStats> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl StatsStore for MemoryStatsStore {
    fn save(&mut self, stats: &SessionStats) -> Result<(), StoreError> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stats.clone());
        Ok(())
    }
}

/// Draws frames produced by the physics tick.
pub trait RenderSurface: Send {
    /// Draw one frame.
    fn render(&mut self, frame: &Frame);
}

/// A surface that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn render(&mut self, _frame: &Frame) {}
}
