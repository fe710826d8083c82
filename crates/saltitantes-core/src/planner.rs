//! Target planning: where a creature heads next.
//!
//! A raw target is `x + u * gold` with `u` uniform in `[-1, 1)`. The raw
//! value is mapped linearly from the logical domain `[-1e6, 1e6]` onto
//! `[0, 1]` *without* clamping, then scaled to the panel and clamped. Rich
//! creatures therefore tend to land near the edges.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use saltitantes_types::Creature;

use crate::config::SimulationConfig;

/// Lower edge of the logical target domain.
pub const LOGICAL_MIN: f64 = -1_000_000.0;

/// Upper edge of the logical target domain.
pub const LOGICAL_MAX: f64 = 1_000_000.0;

/// Computes destinations for creatures.
///
/// Owns the session's RNG so a seeded planner makes a whole run
/// reproducible.
#[derive(Debug, Clone)]
pub struct TargetPlanner {
    rng: StdRng,
    max_x: i32,
}

impl TargetPlanner {
    /// Create a planner for a panel whose largest legal x is `max_x`.
    ///
    /// `None` seeds from OS entropy.
    pub fn new(max_x: i32, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            rng,
            max_x: max_x.max(0),
        }
    }

    /// Create a planner from the panel and seed settings of a config.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.panel.max_x(), config.simulation.seed)
    }

    /// Largest x a target can take.
    pub const fn max_x(&self) -> i32 {
        self.max_x
    }

    /// Raw, unbounded target: `x + u * gold`.
    pub fn calc_target(&mut self, creature: &Creature) -> f64 {
        let u: f64 = self.rng.random_range(-1.0..1.0);
        u.mul_add(creature.gold, f64::from(creature.x))
    }

    /// Map the logical domain onto `[0, 1]`. Out-of-domain input maps
    /// outside `[0, 1]`.
    pub const fn normalize(raw: f64) -> f64 {
        (raw - LOGICAL_MIN) / (LOGICAL_MAX - LOGICAL_MIN)
    }

    /// Scale a normalized value onto the panel and clamp it to
    /// `[0, max_x]`.
    // In [0, max_x] after the clamp, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation)]
    pub fn scale(&self, normalized: f64) -> i32 {
        let upper = f64::from(self.max_x);
        let scaled = (normalized * upper).clamp(0.0, upper);
        if scaled.is_nan() {
            return 0;
        }
        scaled as i32
    }

    /// Next horizontal destination for a creature, within `[0, max_x]`.
    pub fn calc_next_position(&mut self, creature: &Creature) -> i32 {
        let raw = self.calc_target(creature);
        self.scale(Self::normalize(raw))
    }

    /// Uniform spawn position in `[0, max_x)`.
    pub fn random_spawn_x(&mut self) -> i32 {
        if self.max_x == 0 {
            return 0;
        }
        self.rng.random_range(0..self.max_x)
    }

    /// Initial vertical speed of a freshly spawned guardian, in `[-3, 3)`.
    pub fn guardian_bounce(&mut self) -> i32 {
        self.rng.random_range(-3..3)
    }
}
