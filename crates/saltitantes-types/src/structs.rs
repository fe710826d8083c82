//! Core entity structs for the Saltitantes simulation.
//!
//! Covers the [`Creature`] entity, the render projection handed to the
//! drawing surface ([`RenderItem`], [`Frame`]), and the per-player
//! [`SessionStats`] persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{CreatureRole, ShapeKind};
use crate::ids::{CreatureId, SessionId};

// ---------------------------------------------------------------------------
// Creature
// ---------------------------------------------------------------------------

/// A creature bouncing on the ground line.
///
/// Positions and velocities are integer pixels; gold is a float so theft
/// halving never truncates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    /// Roster-unique identifier.
    pub id: CreatureId,
    role: CreatureRole,
    /// Horizontal pixel position (left edge).
    pub x: i32,
    /// Vertical pixel position (top edge), bounded by the ground level.
    pub y: i32,
    /// Horizontal step applied per movement turn.
    pub spd_x: i32,
    /// Vertical velocity; gravity accumulates into it every physics tick.
    pub spd_y: i32,
    /// Wealth held by the creature.
    pub gold: f64,
    /// True while travelling toward [`Creature::target`].
    pub can_move: bool,
    /// True when eligible to initiate a theft this logic cycle.
    pub can_theft: bool,
    /// Planned horizontal destination.
    pub target: i32,
}

impl Creature {
    /// Create a settled creature at `(x, y)` with no gold.
    ///
    /// The target starts at `x`. Guardians are never theft-eligible.
    pub const fn new(id: CreatureId, role: CreatureRole, x: i32, y: i32) -> Self {
        Self {
            id,
            role,
            x,
            y,
            spd_x: 1,
            spd_y: 0,
            gold: 0.0,
            can_move: false,
            can_theft: !role.is_guardian(),
            target: x,
        }
    }

    /// Set the starting gold.
    #[must_use]
    pub const fn with_gold(mut self, gold: f64) -> Self {
        self.gold = gold;
        self
    }

    /// Set horizontal and vertical velocity.
    #[must_use]
    pub const fn with_velocity(mut self, spd_x: i32, spd_y: i32) -> Self {
        self.spd_x = spd_x;
        self.spd_y = spd_y;
        self
    }

    /// Normal creature, cluster, or guardian. Fixed at construction.
    pub const fn role(&self) -> CreatureRole {
        self.role
    }

    /// Whether this creature is the guardian.
    pub const fn is_guardian(&self) -> bool {
        self.role.is_guardian()
    }

    /// Whether this creature is a cluster.
    pub const fn is_cluster(&self) -> bool {
        self.role.is_cluster()
    }

    /// Absolute horizontal pixel distance to another creature.
    pub const fn distance_to(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x)
    }

    /// Display text shown above the creature (a projection of gold).
    pub fn label(&self) -> String {
        format!("R$ {:.2}", self.gold / 100.0)
    }

    /// Project the creature into a render tuple.
    pub fn render_item(&self, size: u32) -> RenderItem {
        RenderItem {
            id: self.id,
            shape: self.role.shape(),
            x: self.x,
            y: self.y,
            size,
            label: self.label(),
        }
    }
}

// ---------------------------------------------------------------------------
// Render projection
// ---------------------------------------------------------------------------

/// One shape to draw, derived from a creature after a physics tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderItem {
    /// The creature this item was projected from.
    pub id: CreatureId,
    /// Circle, rect, or triangle depending on role.
    pub shape: ShapeKind,
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
    /// Side length / diameter in pixels.
    pub size: u32,
    /// Gold label text.
    pub label: String,
}

/// Everything the render surface receives after a physics tick.
///
/// Items are ordered roster-then-guardian, so the guardian is always drawn
/// last (on top).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Physics tick that produced this frame.
    pub tick: u64,
    /// Panel width in pixels.
    pub width: u32,
    /// Panel height in pixels.
    pub height: u32,
    /// Shapes in draw order.
    pub items: Vec<RenderItem>,
}

// ---------------------------------------------------------------------------
// Session statistics
// ---------------------------------------------------------------------------

/// Per-player counters owned by the score collaborator and persisted
/// between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Player name the counters belong to.
    pub player: String,
    /// Number of simulations started.
    pub simulations: u32,
    /// Number of simulations that ended in a win.
    pub successful_simulations: u32,
    /// Points accumulated in the current simulation.
    pub points: f64,
    /// Prior point totals, archived each time points are overwritten.
    #[serde(default)]
    pub points_history: Vec<f64>,
    /// Session that last touched these counters.
    #[serde(default)]
    pub last_session: Option<SessionId>,
    /// Wall-clock time of the last update.
    pub updated_at: DateTime<Utc>,
}

impl SessionStats {
    /// Fresh counters for a player.
    pub fn new(player: &str) -> Self {
        Self {
            player: player.to_owned(),
            simulations: 0,
            successful_simulations: 0,
            points: 0.0,
            points_history: Vec::new(),
            last_session: None,
            updated_at: Utc::now(),
        }
    }

    /// Fraction of simulations that were won, in `[0, 1]`.
    ///
    /// Returns 0 when no simulation was played or none was won.
    pub fn success_rate(&self) -> f64 {
        if self.simulations == 0 || self.successful_simulations == 0 {
            return 0.0;
        }
        f64::from(self.successful_simulations) / f64::from(self.simulations)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn new_creature_is_settled() {
        let c = Creature::new(CreatureId(1), CreatureRole::Normal, 120, 390);
        assert_eq!(c.target, 120);
        assert!(!c.can_move);
        assert!(c.can_theft);
    }

    #[test]
    fn guardian_is_never_theft_eligible() {
        let g = Creature::new(CreatureId(1), CreatureRole::Guardian, 10, 390);
        assert!(!g.can_theft);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Creature::new(CreatureId(1), CreatureRole::Normal, 10, 0);
        let b = Creature::new(CreatureId(2), CreatureRole::Normal, 45, 0);
        assert_eq!(a.distance_to(&b), 35);
        assert_eq!(b.distance_to(&a), 35);
    }

    #[test]
    fn label_shows_gold_in_hundredths() {
        let c = Creature::new(CreatureId(1), CreatureRole::Normal, 0, 0).with_gold(1_000_000.0);
        assert_eq!(c.label(), "R$ 10000.00");
    }

    #[test]
    fn render_item_uses_role_shape() {
        let c = Creature::new(CreatureId(3), CreatureRole::Cluster, 5, 6);
        let item = c.render_item(50);
        assert_eq!(item.shape, ShapeKind::Rect);
        assert_eq!((item.x, item.y, item.size), (5, 6, 50));
    }

    #[test]
    fn success_rate_handles_zero() {
        let mut stats = SessionStats::new("bob");
        assert_eq!(stats.success_rate(), 0.0);
        stats.simulations = 4;
        assert_eq!(stats.success_rate(), 0.0);
        stats.successful_simulations = 1;
        assert_eq!(stats.success_rate(), 0.25);
    }
}
